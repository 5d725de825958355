//! # Boardcast Server
//!
//! The serving process for the shared task board: it owns the single
//! relay hub instance, serves the websocket event channel, and applies
//! board mutations through the coordinator.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/boardcast cargo run -p boardcast-server
//! ```

use boardcast_server::{
    app::{build_router, AppState},
    config::Config,
};
use boardcast_shared::db::{self, pool::{create_pool, DatabaseConfig}};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardcast_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Boardcast server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        max_connections: config.db_max_connections,
        ..DatabaseConfig::new(config.database_url.clone())
    })
    .await?;

    db::run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
