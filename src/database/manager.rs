use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors raised by product storage backends
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the PostgreSQL pool from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let raw = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = Self::parse_url(raw)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        info!(
            "Created database pool for {}{} (max {} connections)",
            url.host_str().unwrap_or("localhost"),
            url.path(),
            config.max_connections
        );
        Ok(pool)
    }

    fn parse_url(raw: &str) -> Result<url::Url, DatabaseError> {
        let url = url::Url::parse(raw)
            .map_err(|e| DatabaseError::Connection(format!("invalid DATABASE_URL: {e}")))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url),
            other => Err(DatabaseError::Connection(format!(
                "unsupported database scheme '{other}'"
            ))),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
