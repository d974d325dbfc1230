pub mod memory;
pub mod user;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Number;
use aws_config::meta::region::RegionProviderChain;

use crate::{
    config::{Backend, Config, DEFAULT_REGION},
    error::ApiError,
    user::User,
};

/// Storage backend for the `Users` table.
#[async_trait]
pub trait Database: Send + Sync {
    /// Every stored user, across all scan pages. Order is unspecified.
    async fn scan_users(&self) -> Result<Vec<User>, ApiError>;

    /// Sets `UserName` and `Age` on `user_id`, creating the item if it does
    /// not exist, and returns the item as stored afterwards.
    async fn put_user_attributes(
        &self,
        user_id: &str,
        user_name: String,
        age: Number,
    ) -> Result<User, ApiError>;

    /// Removes `user_id`. Deleting a missing id is not an error.
    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError>;
}

/// DynamoDB-backed storage for production use.
#[derive(Clone)]
pub struct DynamoDb {
    pub(crate) client: aws_sdk_dynamodb::Client,
    pub users_table: String,
}

#[async_trait]
impl Database for DynamoDb {
    async fn scan_users(&self) -> Result<Vec<User>, ApiError> {
        DynamoDb::scan_users(self).await
    }

    async fn put_user_attributes(
        &self,
        user_id: &str,
        user_name: String,
        age: Number,
    ) -> Result<User, ApiError> {
        DynamoDb::put_user_attributes(self, user_id, user_name, age).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        DynamoDb::delete_user(self, user_id).await
    }
}

#[async_trait]
impl Database for memory::MemoryDb {
    async fn scan_users(&self) -> Result<Vec<User>, ApiError> {
        memory::MemoryDb::scan_users(self).await
    }

    async fn put_user_attributes(
        &self,
        user_id: &str,
        user_name: String,
        age: Number,
    ) -> Result<User, ApiError> {
        memory::MemoryDb::put_user_attributes(self, user_id, user_name, age).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        memory::MemoryDb::delete_user(self, user_id).await
    }
}

/// Create a DynamoDB database from the ambient AWS configuration, falling
/// back to the default region when none is configured.
pub async fn dynamo(users_table: String) -> Arc<dyn Database> {
    let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
    let config = aws_config::from_env().region(region).load().await;
    let client = aws_sdk_dynamodb::Client::new(&config);
    Arc::new(DynamoDb {
        client,
        users_table,
    })
}

/// Create an in-memory database for local development and testing.
pub fn memory() -> Arc<dyn Database> {
    Arc::new(memory::MemoryDb::new())
}

/// Pick the backend named by the configuration.
pub async fn from_config(config: &Config) -> Arc<dyn Database> {
    match config.backend {
        Backend::Memory => {
            tracing::info!("Using in-memory database backend");
            memory()
        }
        Backend::Dynamo => {
            tracing::info!(table = %config.users_table_name, "Using DynamoDB database backend");
            dynamo(config.users_table_name.clone()).await
        }
    }
}
