use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize)]
pub struct DeletedUser {
    #[serde(rename = "UserId")]
    pub user_id: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DeletedUser>, ApiError> {
    state.db.delete_user(&user_id).await?;
    tracing::info!(user_id = %user_id, "deleted user");
    Ok(Json(DeletedUser { user_id }))
}
