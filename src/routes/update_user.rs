use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    error::ApiError,
    state::AppState,
    user::{User, UserPayload},
};

/// Overwrites `UserName` and `Age`. A missing id is created, not rejected.
pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(body) = payload?;
    let user = state
        .db
        .put_user_attributes(&user_id, body.user_name, body.age)
        .await?;
    tracing::info!(user_id = %user.user_id, "updated user");
    Ok(Json(user))
}
