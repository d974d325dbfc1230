use axum::{extract::State, Json};

use crate::{error::ApiError, state::AppState, user::User};

pub async fn handler(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.db.scan_users().await?;
    tracing::info!(count = users.len(), "listed users");
    Ok(Json(users))
}
