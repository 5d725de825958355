/// List endpoints
///
/// # Endpoints
///
/// ```text
/// POST   /v1/boards/:id/lists  Create a list at the end of the board
/// DELETE /v1/lists/:id         Delete a list and its tasks
/// ```

use axum::{
    extract::{Path, State},
    Json,
};
use boardcast_shared::models::list::List;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::{Actor, Origin};

/// Create list request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    /// List title
    #[validate(length(min = 1, max = 255))]
    pub title: String,
}

/// Creates a list appended at the end of the board
pub async fn create_list(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<Json<List>> {
    req.validate()?;
    let list = state
        .coordinator()
        .create_list(actor, board_id, req.title, origin)
        .await?;
    Ok(Json(list))
}

/// Deletes a list, cascading to its tasks and their activities
pub async fn delete_list(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.coordinator().delete_list(actor, list_id, origin).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
