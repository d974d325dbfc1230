//! Bearer token verification for the API Gateway TOKEN authorizer.
//!
//! Tokens are never stored; the allow-list holds hex SHA-256 digests and an
//! incoming token is hashed before comparison.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{digest::Update, Digest, Sha256};

/// Header carrying the token, matching the authorizer's identity source
/// `method.request.header.authorizationToken`.
pub const AUTHORIZATION_TOKEN_HEADER: &str = "authorizationtoken";

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
const ANONYMOUS_PRINCIPAL: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { principal_id: String },
    Deny { reason: &'static str },
}

impl Decision {
    #[cfg(test)]
    pub(crate) fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenAuthorizer {
    allowed_digests: Vec<String>,
}

impl TokenAuthorizer {
    pub fn new(allowed_digests: Vec<String>) -> Self {
        Self {
            allowed_digests: allowed_digests
                .into_iter()
                .map(|digest| digest.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.allowed_digests.is_empty()
    }

    /// Decide on the raw value of the `authorizationToken` header.
    pub fn authorize(&self, header: Option<&str>) -> Decision {
        let Some(header) = header else {
            return Decision::Deny {
                reason: "missing authorization token",
            };
        };

        let Some(token) = header.strip_prefix("Bearer ") else {
            return Decision::Deny {
                reason: "invalid authorization token format",
            };
        };

        let token = token.trim();
        if token.is_empty() {
            return Decision::Deny {
                reason: "empty bearer token",
            };
        }

        let digest = token_digest(token);
        if self.allowed_digests.iter().any(|allowed| *allowed == digest) {
            Decision::Allow {
                principal_id: format!("token-{}", &digest[..12]),
            }
        } else {
            Decision::Deny {
                reason: "unknown bearer token",
            }
        }
    }
}

pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::new().chain(token.as_bytes()).finalize())
}

/// Event API Gateway sends to a TOKEN authorizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// `TOKEN` for the authorizer this crate deploys.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    pub method_arn: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: String,
    pub resource: String,
}

/// Render a decision as the IAM policy API Gateway expects back.
pub fn policy_for(decision: &Decision, method_arn: &str) -> AuthorizerResponse {
    let (principal_id, effect) = match decision {
        Decision::Allow { principal_id } => (principal_id.clone(), "Allow"),
        Decision::Deny { .. } => (ANONYMOUS_PRINCIPAL.to_string(), "Deny"),
    };

    AuthorizerResponse {
        principal_id,
        policy_document: PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement {
                action: INVOKE_ACTION.to_string(),
                effect: effect.to_string(),
                resource: method_arn.to_string(),
            }],
        },
        context: None,
    }
}

pub fn handle(authorizer: &TokenAuthorizer, request: &AuthorizerRequest) -> AuthorizerResponse {
    let decision = authorizer.authorize(request.authorization_token.as_deref());
    match &decision {
        Decision::Allow { principal_id } => {
            tracing::info!(
                principal_id = %principal_id,
                event_type = ?request.kind,
                method_arn = %request.method_arn,
                "token allowed"
            );
        }
        Decision::Deny { reason } => {
            tracing::info!(
                reason = %reason,
                event_type = ?request.kind,
                method_arn = %request.method_arn,
                "token denied"
            );
        }
    }
    policy_for(&decision, &request.method_arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHOD_ARN: &str =
        "arn:aws:execute-api:ap-northeast-1:123456789012:abcdef/v1/GET/users";

    fn authorizer() -> TokenAuthorizer {
        TokenAuthorizer::new(vec![token_digest("let-me-in")])
    }

    #[test]
    fn test_known_bearer_token_is_allowed() {
        let decision = authorizer().authorize(Some("Bearer let-me-in"));
        let expected = format!("token-{}", &token_digest("let-me-in")[..12]);
        assert_eq!(
            decision,
            Decision::Allow {
                principal_id: expected
            }
        );
    }

    #[test]
    fn test_uppercase_digest_is_accepted() {
        let authorizer = TokenAuthorizer::new(vec![token_digest("abc").to_uppercase()]);
        assert!(authorizer.authorize(Some("Bearer abc")).is_allow());
    }

    #[test]
    fn test_denies_bad_tokens() {
        let authorizer = authorizer();
        assert!(!authorizer.authorize(None).is_allow());
        assert!(!authorizer.authorize(Some("let-me-in")).is_allow());
        assert!(!authorizer.authorize(Some("Bearer ")).is_allow());
        assert!(!authorizer.authorize(Some("Bearer wrong")).is_allow());
    }

    #[test]
    fn test_unconfigured_authorizer_denies_everything() {
        let authorizer = TokenAuthorizer::default();
        assert!(!authorizer.is_configured());
        assert!(!authorizer.authorize(Some("Bearer let-me-in")).is_allow());
    }

    #[test]
    fn test_handle_renders_policy_document() {
        let request: AuthorizerRequest = serde_json::from_value(serde_json::json!({
            "type": "TOKEN",
            "authorizationToken": "Bearer let-me-in",
            "methodArn": METHOD_ARN,
        }))
        .unwrap();

        let response = serde_json::to_value(handle(&authorizer(), &request)).unwrap();
        assert!(response["principalId"]
            .as_str()
            .unwrap()
            .starts_with("token-"));
        assert_eq!(response["policyDocument"]["Version"], "2012-10-17");
        let statement = &response["policyDocument"]["Statement"][0];
        assert_eq!(statement["Action"], "execute-api:Invoke");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Resource"], METHOD_ARN);
        assert!(response.get("context").is_none());
    }

    #[test]
    fn test_handle_denies_missing_token() {
        let request: AuthorizerRequest = serde_json::from_value(serde_json::json!({
            "type": "TOKEN",
            "methodArn": METHOD_ARN,
        }))
        .unwrap();
        assert_eq!(request.kind.as_deref(), Some("TOKEN"));

        let response = handle(&authorizer(), &request);
        assert_eq!(response.principal_id, "anonymous");
        assert_eq!(response.policy_document.statement[0].effect, "Deny");
    }
}
