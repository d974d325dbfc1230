use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    authorizer::{Decision, AUTHORIZATION_TOKEN_HEADER},
    error::ApiError,
    state::AppState,
};

/// Applies the bearer token check in-process, for deployments that do not
/// run behind the API Gateway TOKEN authorizer.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(authorizer) = state.authorizer.as_ref() else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(AUTHORIZATION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match authorizer.authorize(header) {
        Decision::Allow { principal_id } => {
            tracing::debug!(principal_id = %principal_id, "request authorized");
            next.run(request).await
        }
        Decision::Deny { reason } => ApiError::Unauthorized(reason.to_string()).into_response(),
    }
}
