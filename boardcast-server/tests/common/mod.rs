/// Common test utilities for integration tests
///
/// These tests require a running PostgreSQL database reachable via the
/// DATABASE_URL environment variable. Each context seeds its own users
/// and board with unique identifiers and deletes them on cleanup, so
/// tests may share a database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use boardcast_server::app::{build_router, AppState};
use boardcast_server::config::Config;
use boardcast_shared::models::board::{Board, CreateBoard};
use boardcast_shared::models::list::{CreateList, List};
use boardcast_shared::models::task::{CreateTask, Task};
use boardcast_shared::models::user::User;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context: seeded users and board plus a ready router
pub struct TestContext {
    pub db: PgPool,
    pub state: AppState,
    pub app: axum::Router,
    pub owner: User,
    pub member: User,
    pub outsider: User,
    pub board: Board,
}

impl TestContext {
    /// Creates a context with a fresh owner, member, outsider, and board
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database_url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let owner = User::create(
            &db,
            Some("Test Owner"),
            &format!("owner-{}@example.com", Uuid::new_v4()),
        )
        .await?;
        let member = User::create(
            &db,
            Some("Test Member"),
            &format!("member-{}@example.com", Uuid::new_v4()),
        )
        .await?;
        let outsider = User::create(
            &db,
            Some("Test Outsider"),
            &format!("outsider-{}@example.com", Uuid::new_v4()),
        )
        .await?;

        let board = Board::create(
            &db,
            CreateBoard {
                title: format!("Test Board {}", Uuid::new_v4()),
                owner_id: owner.id,
            },
        )
        .await?;
        Board::add_member(&db, board.id, member.id).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state.clone());

        Ok(TestContext {
            db,
            state,
            app,
            owner,
            member,
            outsider,
            board,
        })
    }

    /// Sends a request as the given user and returns status and JSON body
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        actor: Option<Uuid>,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header("x-user-id", actor.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.app.call(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    /// Seeds a list directly in the store
    pub async fn seed_list(&self, title: &str) -> anyhow::Result<List> {
        Ok(List::create(
            &self.db,
            CreateList {
                board_id: self.board.id,
                title: title.to_string(),
            },
        )
        .await?)
    }

    /// Seeds a task at the end of a list, assigned to the owner
    pub async fn seed_task(&self, list_id: Uuid, content: &str) -> anyhow::Result<Task> {
        Ok(Task::create(
            &self.db,
            CreateTask {
                list_id,
                content: content.to_string(),
                assignee_id: Some(self.owner.id),
            },
        )
        .await?)
    }

    /// Deletes the seeded users; the board and everything under it
    /// cascade away with the owner
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for user in [&self.owner, &self.member, &self.outsider] {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user.id)
                .execute(&self.db)
                .await?;
        }
        Ok(())
    }
}
