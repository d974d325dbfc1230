use std::sync::Arc;

use crate::{authorizer::TokenAuthorizer, config::Config, db::Database};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    /// Token check applied in front of every route when configured.
    pub authorizer: Option<Arc<TokenAuthorizer>>,
}

impl AppState {
    pub async fn new(config: &Config) -> Self {
        let db = crate::db::from_config(config).await;

        let authorizer = TokenAuthorizer::new(config.authorizer_token_digests.clone());
        let authorizer = if authorizer.is_configured() {
            tracing::info!("Bearer token check enabled");
            Some(Arc::new(authorizer))
        } else {
            tracing::info!("AUTHORIZER_TOKEN_SHA256 not set, relying on API Gateway authorizer");
            None
        };

        Self { db, authorizer }
    }

    /// State with no route-level token check, for per-route Lambdas that sit
    /// behind the API Gateway authorizer.
    pub async fn without_authorizer(config: &Config) -> Self {
        Self {
            db: crate::db::from_config(config).await,
            authorizer: None,
        }
    }
}
