/// Task endpoints
///
/// # Endpoints
///
/// ```text
/// POST   /v1/lists/:id/tasks      Create a task at the end of the list
/// PATCH  /v1/tasks/:id/content    Replace a task's content
/// PATCH  /v1/tasks/:id/assignee   Set or clear the assignee
/// DELETE /v1/tasks/:id            Delete a task
/// POST   /v1/boards/:id/reorder   Persist a drag-reorder batch
/// ```
///
/// The reorder endpoint takes the planner's output verbatim: the final
/// placement of every task whose position changed, applied atomically.

use axum::{
    extract::{Path, State},
    Json,
};
use boardcast_shared::models::task::{PositionUpdate, Task};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::{Actor, Origin};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task content
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// Update content request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContentRequest {
    /// New task content
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// Assignment request; `assignee_id: null` clears the assignment
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Member (or owner) to assign, or null to unassign
    pub assignee_id: Option<Uuid>,
}

/// Reorder batch request
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Final placements from the drag planner
    pub updates: Vec<PositionUpdate>,
}

/// Creates a task appended at the end of a list
pub async fn create_task(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(list_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    let task = state
        .coordinator()
        .create_task(actor, list_id, req.content, origin)
        .await?;
    Ok(Json(task))
}

/// Replaces a task's content
pub async fn update_task_content(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateContentRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    let task = state
        .coordinator()
        .update_task_content(actor, task_id, req.content, origin)
        .await?;
    Ok(Json(task))
}

/// Sets or clears a task's assignee
pub async fn assign_task(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .coordinator()
        .assign_task(actor, task_id, req.assignee_id, origin)
        .await?;
    Ok(Json(task))
}

/// Deletes a task and its activity history
pub async fn delete_task(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.coordinator().delete_task(actor, task_id, origin).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Applies a drag-reorder batch atomically
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(board_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .coordinator()
        .reorder_tasks(actor, board_id, req.updates, origin)
        .await?;
    Ok(Json(serde_json::json!({ "reordered": true })))
}
