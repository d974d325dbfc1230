use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::ApiError,
    state::AppState,
    user::{create_user, User, UserPayload},
};

pub async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(body) = payload?;
    let user = create_user(state.db.as_ref(), body).await?;
    tracing::info!(user_id = %user.user_id, "created user");
    Ok(Json(user))
}
