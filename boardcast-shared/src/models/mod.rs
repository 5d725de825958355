/// Database models for Boardcast
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Minimal user records joined into activity queries
/// - `board`: Boards with owner and member set
/// - `list`: Ordered lists within a board
/// - `task`: Ordered tasks within a list, including the atomic
///   position-batch update used by drag reordering
/// - `activity`: Immutable per-task activity log, paginated newest-first
///
/// # Example
///
/// ```no_run
/// use boardcast_shared::models::board::{Board, CreateBoard};
/// use boardcast_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new("postgresql://localhost/boardcast")).await?;
///
/// let board = Board::create(&pool, CreateBoard {
///     title: "Sprint 12".to_string(),
///     owner_id: Uuid::new_v4(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity;
pub mod board;
pub mod list;
pub mod task;
pub mod user;
