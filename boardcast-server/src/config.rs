/// Server configuration
///
/// Loaded once from the environment at startup (a `.env` file is read
/// first if present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: bind host (default 0.0.0.0)
/// - `API_PORT`: bind port (default 4000)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
/// - `RUST_LOG`: log filter

use anyhow::Context;
use std::env;
use std::str::FromStr;

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host the server binds to
    pub host: String,

    /// Port the server binds to
    pub port: u16,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Database pool size
    pub db_max_connections: u32,
}

impl Config {
    /// Reads configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("API_PORT", 4000)?,
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable is required")?,
            db_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
        })
    }

    /// host:port string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses an environment variable, falling back to a default when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database_url: "postgresql://localhost/test".to_string(),
            db_max_connections: 10,
        };

        assert_eq!(config.bind_address(), "127.0.0.1:4000");
    }

    #[test]
    fn test_env_or_falls_back() {
        let port: u16 = env_or("BOARDCAST_TEST_UNSET_PORT", 4000).unwrap();
        assert_eq!(port, 4000);
    }
}
