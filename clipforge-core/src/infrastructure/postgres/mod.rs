//! PostgreSQL-backed implementations of the storage ports.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{CoreError, Result};

pub mod catalog;
pub mod directory;

pub use catalog::PostgresContentCatalog;
pub use directory::PostgresUserDirectory;

/// Open a connection pool and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let max_connections = std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(8);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await
        .map_err(|e| {
            CoreError::internal(format!("Failed to connect to database: {e}"))
        })?;

    crate::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| CoreError::internal(format!("Migration failed: {e}")))?;

    info!(max_connections, "database pool ready");
    Ok(pool)
}
