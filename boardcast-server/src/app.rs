/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// The relay hub is constructed exactly once here and handed to the
/// coordinator; every handler reaches both through [`AppState`]. No
/// code path reads global process state.
///
/// # Example
///
/// ```no_run
/// use boardcast_server::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database_url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::hub::RelayHub;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; all
/// clones share the pool, the hub, and the coordinator.
#[derive(Clone)]
pub struct AppState {
    db: PgPool,
    config: Arc<Config>,
    hub: RelayHub,
    coordinator: Coordinator,
}

impl AppState {
    /// Creates application state with a fresh relay hub
    pub fn new(db: PgPool, config: Config) -> Self {
        let hub = RelayHub::new();
        let coordinator = Coordinator::new(db.clone(), hub.clone());
        Self {
            db,
            config: Arc::new(config),
            hub,
            coordinator,
        }
    }

    /// Database connection pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Application configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The process-wide relay hub
    pub fn hub(&self) -> &RelayHub {
        &self.hub
    }

    /// The mutation coordinator
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check
/// ├── /ws                           # Board event channel (websocket)
/// └── /v1/
///     ├── /boards                   # POST create, GET list
///     ├── /boards/:id               # GET snapshot, DELETE
///     ├── /boards/:id/join          # POST join as member
///     ├── /boards/:id/lists         # POST create list
///     ├── /boards/:id/reorder       # POST drag-reorder batch
///     ├── /boards/:id/activities    # GET paginated history
///     ├── /lists/:id                # DELETE
///     ├── /lists/:id/tasks          # POST create task
///     ├── /tasks/:id                # DELETE
///     ├── /tasks/:id/activities     # GET recent task history
///     ├── /tasks/:id/content        # PATCH
///     └── /tasks/:id/assignee       # PATCH
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route("/boards", post(routes::boards::create_board))
        .route("/boards", get(routes::boards::list_boards))
        .route("/boards/:id", get(routes::boards::get_board))
        .route("/boards/:id", delete(routes::boards::delete_board))
        .route("/boards/:id/join", post(routes::boards::join_board))
        .route("/boards/:id/lists", post(routes::lists::create_list))
        .route("/boards/:id/reorder", post(routes::tasks::reorder_tasks))
        .route("/boards/:id/activities", get(routes::activities::board_activities))
        .route("/lists/:id", delete(routes::lists::delete_list))
        .route("/lists/:id/tasks", post(routes::tasks::create_task))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route("/tasks/:id/activities", get(routes::activities::task_activities))
        .route("/tasks/:id/content", patch(routes::tasks::update_task_content))
        .route("/tasks/:id/assignee", patch(routes::tasks::assign_task));

    Router::new()
        .merge(health_routes)
        .route("/ws", get(crate::ws::ws_handler))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
