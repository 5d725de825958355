/// List model and database operations
///
/// Lists hold an ordered sequence of tasks. List positions are dense
/// integers within a board; new lists are appended at the end via a
/// last-position lookup.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// List record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    /// Unique list ID
    pub id: Uuid,

    /// Board this list belongs to
    pub board_id: Uuid,

    /// List title
    pub title: String,

    /// Position within the board (dense, zero-based)
    pub position: i32,

    /// When the list was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateList {
    /// Board the list belongs to
    pub board_id: Uuid,

    /// List title
    pub title: String,
}

impl List {
    /// Creates a new list appended at the end of the board
    ///
    /// Position is one past the current maximum, or 0 for the first list.
    pub async fn create(pool: &PgPool, data: CreateList) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (board_id, title, position)
            VALUES (
                $1, $2,
                COALESCE((SELECT MAX(position) + 1 FROM lists WHERE board_id = $1), 0)
            )
            RETURNING id, board_id, title, position, created_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .fetch_one(pool)
        .await
    }

    /// Finds a list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, List>(
            "SELECT id, board_id, title, position, created_at FROM lists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all lists of a board, ascending by position
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, List>(
            r#"
            SELECT id, board_id, title, position, created_at
            FROM lists
            WHERE board_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes the list, cascading to its tasks and their activities
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
