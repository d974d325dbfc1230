use std::env;

pub const DEFAULT_USERS_TABLE_NAME: &str = "Users";
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Storage backend selected through `DATABASE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Dynamo,
}

/// Runtime settings shared by every handler binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub users_table_name: String,
    /// Hex SHA-256 digests of the bearer tokens the authorizer accepts.
    pub authorizer_token_digests: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let backend = match env::var("DATABASE_BACKEND").as_deref() {
            Ok("memory") => Backend::Memory,
            _ => Backend::Dynamo,
        };

        Self {
            backend,
            users_table_name: env_or("USERS_TABLE_NAME", DEFAULT_USERS_TABLE_NAME),
            authorizer_token_digests: env_list("AUTHORIZER_TOKEN_SHA256"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|value| split_list(&value))
        .unwrap_or_default()
}

/// Splits a comma separated value, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" subnet-a, ,subnet-b,"),
            vec!["subnet-a".to_string(), "subnet-b".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
