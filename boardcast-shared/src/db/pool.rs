/// PostgreSQL connection pool
///
/// Every model operation takes a `&PgPool` (or a transaction started
/// from one), so this is the single place pool behavior is tuned. The
/// pool is pinged once at startup; a misconfigured URL fails the
/// process immediately instead of surfacing on the first mutation.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Pool tuning knobs
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Idle connections kept warm for mutation bursts
    pub min_connections: u32,

    /// How long to wait for a free connection before erroring
    pub acquire_timeout: Duration,

    /// Close connections idle longer than this
    pub idle_timeout: Option<Duration>,
}

impl DatabaseConfig {
    /// Sensible defaults around the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Opens the pool and pings it once
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout);
    if let Some(idle) = config.idle_timeout {
        options = options.idle_timeout(idle);
    }

    let pool = options.connect(&config.url).await?;
    ping(&pool).await?;

    info!(
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Round-trips a trivial query; the liveness probe for health checks
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Drains and closes the pool during shutdown
pub async fn close_pool(pool: PgPool) {
    pool.close().await;
    info!("database pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DatabaseConfig::new("postgresql://localhost/boardcast");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    }
}
