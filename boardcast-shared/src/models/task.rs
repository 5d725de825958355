/// Task model and database operations
///
/// Tasks are the cards on the board. Each task belongs to exactly one
/// list and carries a position; after every mutation that touches a
/// list, the positions of that list's tasks are the dense sequence
/// `0..n-1` (full renumbering, never incremental patching).
///
/// The drag-reorder path persists a whole batch of position updates in
/// one transaction via [`Task::apply_position_batch`]; all rows
/// succeed or none do.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     position DOUBLE PRECISION NOT NULL DEFAULT 0,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// List this task currently belongs to
    pub list_id: Uuid,

    /// Task content (the card text)
    pub content: String,

    /// Position within the list (dense, zero-based after every mutation)
    pub position: f64,

    /// Assigned user, if any; must be a board owner or member
    pub assignee_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// List the task belongs to
    pub list_id: Uuid,

    /// Task content
    pub content: String,

    /// Initial assignee (usually the creating user)
    pub assignee_id: Option<Uuid>,
}

/// One entry of a reorder batch: where a task ends up
///
/// Produced by the drag planner, carried on the wire in `task-moved`
/// events, and persisted by [`Task::apply_position_batch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Task being repositioned
    pub task_id: Uuid,

    /// List the task belongs to after the move
    pub list_id: Uuid,

    /// New position within that list
    pub position: f64,
}

/// Prior placement of a task, captured before a reorder batch commits
///
/// The coordinator compares this against the committed update to decide
/// which activity message (cross-list move vs. in-list reorder) to log.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskPlacement {
    /// Task ID
    pub id: Uuid,

    /// List the task was in
    pub list_id: Uuid,

    /// Position the task held
    pub position: f64,

    /// Content at snapshot time, used in move activity messages
    pub content: String,
}

impl Task {
    /// Creates a new task appended at the end of its list
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (list_id, content, position, assignee_id)
            VALUES (
                $1, $2,
                COALESCE((SELECT MAX(position) + 1 FROM tasks WHERE list_id = $1), 0),
                $3
            )
            RETURNING id, list_id, content, position, assignee_id, created_at, updated_at
            "#,
        )
        .bind(data.list_id)
        .bind(data.content)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, list_id, content, position, assignee_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all tasks of a board, ascending by position within each list
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.list_id, t.content, t.position, t.assignee_id,
                   t.created_at, t.updated_at
            FROM tasks t
            JOIN lists l ON l.id = t.list_id
            WHERE l.board_id = $1
            ORDER BY t.position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    /// Updates the task's content
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, list_id, content, position, assignee_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await
    }

    /// Sets or clears the task's assignee
    pub async fn assign(
        pool: &PgPool,
        id: Uuid,
        assignee_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assignee_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, list_id, content, position, assignee_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a task, cascading to its activity entries
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Snapshots the current placement of the given tasks
    ///
    /// Called before [`apply_position_batch`](Self::apply_position_batch)
    /// so the coordinator can tell cross-list moves from in-list reorders
    /// after the batch commits.
    pub async fn placements(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<TaskPlacement>, sqlx::Error> {
        sqlx::query_as::<_, TaskPlacement>(
            r#"
            SELECT id, list_id, position, content
            FROM tasks
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Applies a reorder batch atomically
    ///
    /// Every update sets the task's list and position in one transaction;
    /// if any row is missing or any update fails, the whole batch rolls
    /// back and no positions change.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::RowNotFound` if any task in the batch does
    /// not exist, or the underlying error if a statement fails.
    pub async fn apply_position_batch(
        pool: &PgPool,
        updates: &[PositionUpdate],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for update in updates {
            let result = sqlx::query(
                r#"
                UPDATE tasks
                SET list_id = $2, position = $3, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(update.task_id)
            .bind(update.list_id)
            .bind(update.position)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(sqlx::Error::RowNotFound);
            }
        }

        tx.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_update_roundtrip() {
        let update = PositionUpdate {
            task_id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            position: 2.0,
        };
        let json = serde_json::to_string(&update).unwrap();
        let back: PositionUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, back);
    }
}
