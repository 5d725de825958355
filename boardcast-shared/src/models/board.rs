/// Board model and database operations
///
/// Boards are the root of the data tree: a board owns lists, lists own
/// tasks, and tasks own activity entries. All foreign keys cascade, so
/// deleting a board removes everything underneath it, and deleting a
/// task removes its activity history.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, board_id)
/// );
/// ```
///
/// # Authorization
///
/// Every mutation checks `is_owner_or_member` before touching the store.
/// Ownership is not a membership row; the owner is authorized implicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::list::List;
use super::task::Task;

/// Board record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// User who created (and owns) the board
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Owner of the new board
    pub owner_id: Uuid,
}

/// A list with its tasks, ordered by position
///
/// Building block of the full board snapshot clients load on join and
/// on coarse-invalidation refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWithTasks {
    /// The list record
    #[serde(flatten)]
    pub list: List,

    /// Tasks in the list, ascending by position
    pub tasks: Vec<Task>,
}

/// Full board snapshot: the board, its lists with tasks, and member ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// The board record
    pub board: Board,

    /// Lists ascending by position, each with its tasks ascending by position
    pub lists: Vec<ListWithTasks>,

    /// User ids of the board's members (owner not included)
    pub member_ids: Vec<Uuid>,
}

impl Board {
    /// Creates a new board owned by `owner_id`
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            "SELECT id, title, owner_id, created_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether `user_id` is the board's owner or a member
    pub async fn is_owner_or_member(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (authorized,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM boards WHERE id = $1 AND owner_id = $2
                UNION
                SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(authorized)
    }

    /// Adds `user_id` as a member of the board
    ///
    /// A no-op if the user is already a member.
    pub async fn add_member(
        pool: &PgPool,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO board_members (user_id, board_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, board_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(board_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists boards the user owns or is a member of, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT DISTINCT b.id, b.title, b.owner_id, b.created_at
            FROM boards b
            LEFT JOIN board_members m ON m.board_id = b.id
            WHERE b.owner_id = $1 OR m.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Loads the full board tree: lists ascending by position, each with
    /// its tasks ascending by position, plus the member id set
    ///
    /// This is the snapshot clients fetch on join and whenever a coarse
    /// `board-updated` signal tells them to refresh instead of patching.
    pub async fn snapshot(pool: &PgPool, board_id: Uuid) -> Result<Option<BoardSnapshot>, sqlx::Error> {
        let Some(board) = Self::find_by_id(pool, board_id).await? else {
            return Ok(None);
        };

        let lists = List::list_by_board(pool, board_id).await?;
        let tasks = Task::list_by_board(pool, board_id).await?;

        let mut lists_with_tasks: Vec<ListWithTasks> = lists
            .into_iter()
            .map(|list| ListWithTasks { list, tasks: Vec::new() })
            .collect();

        for task in tasks {
            if let Some(entry) = lists_with_tasks.iter_mut().find(|l| l.list.id == task.list_id) {
                entry.tasks.push(task);
            }
        }

        let member_ids: Vec<Uuid> =
            sqlx::query_as::<_, (Uuid,)>("SELECT user_id FROM board_members WHERE board_id = $1")
                .bind(board_id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|(id,)| id)
                .collect();

        Ok(Some(BoardSnapshot { board, lists: lists_with_tasks, member_ids }))
    }

    /// Deletes the board, cascading to lists, tasks, activities, and members
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
