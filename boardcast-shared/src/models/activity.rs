/// Activity model and database operations
///
/// Activities are the immutable, human-readable audit trail of a board:
/// "created task ...", "moved task ... to another list", and so on.
/// They cascade-delete with their task and are only ever queried
/// newest-first with pagination.
///
/// Writing an activity is always best-effort from the coordinator's
/// point of view; the model itself just inserts.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     action TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Activity record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique activity ID
    pub id: Uuid,

    /// Task the activity describes
    pub task_id: Uuid,

    /// User who performed the action
    pub user_id: Uuid,

    /// Human-readable action description
    pub action: String,

    /// When the activity happened
    pub created_at: DateTime<Utc>,
}

/// Activity joined with actor name and task content for display
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityView {
    /// Unique activity ID
    pub id: Uuid,

    /// Human-readable action description
    pub action: String,

    /// When the activity happened
    pub created_at: DateTime<Utc>,

    /// Actor's display name (nullable)
    pub user_name: Option<String>,

    /// Actor's email
    pub user_email: String,

    /// Content of the task the activity belongs to
    pub task_content: String,
}

/// One page of a board's activity history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPage {
    /// Activities, newest first
    pub items: Vec<ActivityView>,

    /// Page number this page was fetched for (1-based)
    pub page: u32,

    /// Requested page size
    pub page_size: u32,

    /// Total matching activities
    pub total: i64,

    /// Total pages at this page size
    pub total_pages: u32,
}

impl Activity {
    /// Records an activity entry for a task
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
        action: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (task_id, user_id, action)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, action, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(action)
        .fetch_one(pool)
        .await
    }

    /// Lists the most recent activities of one task, newest first
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityView>, sqlx::Error> {
        sqlx::query_as::<_, ActivityView>(
            r#"
            SELECT a.id, a.action, a.created_at,
                   u.name AS user_name, u.email AS user_email,
                   t.content AS task_content
            FROM activities a
            JOIN users u ON u.id = a.user_id
            JOIN tasks t ON t.id = a.task_id
            WHERE a.task_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(task_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Fetches one page of a board's activity history, newest first
    ///
    /// Pages are 1-based. An out-of-range page returns an empty item set
    /// with the correct totals.
    pub async fn page_for_board(
        pool: &PgPool,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<ActivityPage, sqlx::Error> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(page_size);

        let items = sqlx::query_as::<_, ActivityView>(
            r#"
            SELECT a.id, a.action, a.created_at,
                   u.name AS user_name, u.email AS user_email,
                   t.content AS task_content
            FROM activities a
            JOIN users u ON u.id = a.user_id
            JOIN tasks t ON t.id = a.task_id
            JOIN lists l ON l.id = t.list_id
            WHERE l.board_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(board_id)
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM activities a
            JOIN tasks t ON t.id = a.task_id
            JOIN lists l ON l.id = t.list_id
            WHERE l.board_id = $1
            "#,
        )
        .bind(board_id)
        .fetch_one(pool)
        .await?;

        let total_pages = if page_size == 0 {
            0
        } else {
            ((total as u64).div_ceil(u64::from(page_size))) as u32
        };

        Ok(ActivityPage { items, page, page_size, total, total_pages })
    }
}
