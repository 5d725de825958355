/// Health check endpoint
///
/// `GET /health` reports database reachability and how many websocket
/// connections the relay hub currently holds:
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected", "connections": 3 }
/// ```

use axum::{extract::State, Json};
use boardcast_shared::db::pool::ping;
use serde::Serialize;

use crate::app::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// "connected" or "disconnected"
    pub database: &'static str,

    /// Websocket connections currently in board rooms
    pub connections: usize,
}

/// Reports service health; never fails the request itself
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = ping(state.db()).await.is_ok();

    Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "connected" } else { "disconnected" },
        connections: state.hub().connection_count(),
    })
}
