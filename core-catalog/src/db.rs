//! # Catalog Database Pool
//!
//! Opens the SQLite pool behind [`crate::adapters::sqlite_native::SqliteAdapter`].
//!
//! - **WAL mode** so catalog readers never block on the writer
//! - **Foreign keys** enforced
//! - **Embedded migrations** applied on open
//! - **Health check** before the pool is handed out
//!
//! In-memory databases live only as long as their connection, so a
//! `:memory:` URL keeps its connection open for the life of the pool.

use crate::error::{CatalogError, Result};
use bridge_traits::database::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Open a pool, apply migrations and verify it answers.
///
/// # Errors
///
/// - [`CatalogError::CatalogUnavailable`] if the URL is invalid or the
///   database cannot be opened or queried
/// - [`CatalogError::Migration`] if a migration fails to apply
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    info!(
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "Opening catalog database"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .pragma("cache_size", "-64000")
        .statement_cache_capacity(config.cache_capacity);

    let in_memory = config.database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to open catalog database");
            CatalogError::from(e)
        })?;

    run_migrations(&pool).await?;
    health_check(&pool).await?;

    info!(connections = pool.size(), "Catalog database ready");
    Ok(pool)
}

/// In-memory pool with the schema applied.
pub async fn create_test_pool() -> Result<SqlitePool> {
    create_pool(&DatabaseConfig::in_memory()).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    debug!("Applying catalog migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        CatalogError::Migration(e.to_string())
    })?;

    debug!("Catalog migrations applied");
    Ok(())
}

pub async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Catalog database health check failed");
        CatalogError::from(e)
    })?;
    Ok(())
}
