use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

impl DatabaseError {
    /// Translate constraint violations into domain errors, keep everything else as-is.
    pub fn from_write(err: sqlx::Error, conflict: &str, missing_reference: &str) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => DatabaseError::Conflict(conflict.to_string()),
            Some(FOREIGN_KEY_VIOLATION) => DatabaseError::NotFound(missing_reference.to_string()),
            Some(CHECK_VIOLATION) => DatabaseError::InvalidInput(format!("constraint violated: {}", err)),
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Builds the connection pool without opening a connection, so the server
/// can come up and report a degraded health while the database is down.
pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let url = config
        .connection_url()
        .map_err(|e| DatabaseError::InvalidInput(e.to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_lazy(&url)?;

    info!(
        "Created database pool (max_connections={}, timeout={}s)",
        config.max_connections, config.connection_timeout
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
