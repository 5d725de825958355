/// Board endpoints
///
/// # Endpoints
///
/// ```text
/// POST   /v1/boards           Create a board (actor becomes owner)
/// GET    /v1/boards           List boards the actor owns or belongs to
/// GET    /v1/boards/:id       Full board snapshot (lists + tasks + members)
/// DELETE /v1/boards/:id       Delete a board (owner only)
/// POST   /v1/boards/:id/join  Join a board as a member
/// ```
///
/// The snapshot endpoint is the recovery path: clients call it after
/// connecting and whenever a coarse `board-updated` signal tells them
/// their local state may be stale.

use axum::{
    extract::{Path, State},
    Json,
};
use boardcast_shared::models::board::{Board, BoardSnapshot};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::{Actor, Origin};

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 255))]
    pub title: String,
}

/// Creates a board owned by the actor
pub async fn create_board(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate()?;
    let board = state.coordinator().create_board(actor, req.title).await?;
    Ok(Json(board))
}

/// Lists boards the actor owns or is a member of, newest first
pub async fn list_boards(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<Json<Vec<Board>>> {
    let boards = Board::list_for_user(state.db(), actor).await?;
    Ok(Json(boards))
}

/// Returns the full board tree for the actor
pub async fn get_board(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardSnapshot>> {
    let snapshot = state.coordinator().board_snapshot(actor, board_id).await?;
    Ok(Json(snapshot))
}

/// Deletes a board; owner only
pub async fn delete_board(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Origin(origin): Origin,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.coordinator().delete_board(actor, board_id, origin).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Adds the actor as a member of the board
pub async fn join_board(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Board>> {
    let board = state.coordinator().join_board(actor, board_id).await?;
    Ok(Json(board))
}
