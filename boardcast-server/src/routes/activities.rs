/// Activity history endpoints
///
/// # Endpoints
///
/// ```text
/// GET /v1/boards/:id/activities?page=1&page_size=20
/// GET /v1/tasks/:id/activities?limit=10
/// ```
///
/// Board pages are 1-based and ordered newest-first. Clients cache them
/// with a TTL and invalidate on `activity-updated`; the notification
/// probe calls this with `page=1&page_size=1`. The per-task view backs
/// the card detail panel.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use boardcast_shared::models::activity::{ActivityPage, ActivityView};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::coordinator::DEFAULT_ACTIVITY_PAGE_SIZE;
use crate::error::{ApiError, ApiResult};
use crate::routes::Actor;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// 1-based page number (default 1)
    pub page: Option<u32>,

    /// Page size (default 20, max 100)
    pub page_size: Option<u32>,
}

/// Fetches one page of a board's activity history
pub async fn board_activities(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(board_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<ActivityPage>> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_ACTIVITY_PAGE_SIZE);

    if page_size == 0 || page_size > 100 {
        return Err(ApiError::BadRequest(
            "page_size must be between 1 and 100".to_string(),
        ));
    }

    let activities = state
        .coordinator()
        .activities(actor, board_id, page, page_size)
        .await?;
    Ok(Json(activities))
}

/// Query parameters for the per-task view
#[derive(Debug, Deserialize)]
pub struct TaskActivityParams {
    /// Maximum entries to return (default 10, max 100)
    pub limit: Option<i64>,
}

/// Fetches the most recent activity entries of one task
pub async fn task_activities(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(task_id): Path<Uuid>,
    Query(params): Query<TaskActivityParams>,
) -> ApiResult<Json<Vec<ActivityView>>> {
    let limit = params.limit.unwrap_or(10);
    if limit < 1 || limit > 100 {
        return Err(ApiError::BadRequest("limit must be between 1 and 100".to_string()));
    }

    let activities = state.coordinator().task_activities(actor, task_id, limit).await?;
    Ok(Json(activities))
}
