//! SQLite connection pool with WAL mode.
//!
//! Provides a thread-safe connection pool for SQLite with Write-Ahead Logging (WAL)
//! enabled so readers proceed while a transaction holds the write lock.

use crate::config::StoreConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Create a new connection pool with WAL mode enabled.
///
/// # Arguments
/// * `config` - Store settings (path, pool bounds, timeouts)
///
/// # Returns
/// A connection pool ready for use
pub async fn create_pool(config: &StoreConfig) -> Result<DbPool, sqlx::Error> {
    let db_url = format!("sqlite:{}", config.db_path.display());

    let connect_options = SqliteConnectOptions::from_str(&db_url)?
        // Create the database file if it doesn't exist
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // Reviewer links and authors reference users
        .foreign_keys(true)
        // Competing BEGIN IMMEDIATE transactions wait this long for the write lock
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .pragma("wal_autocheckpoint", "1000");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect_options)
        .await?;

    let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;

    debug_assert!(
        mode.0.to_lowercase() == "wal",
        "WAL mode should be enabled, got: {}",
        mode.0
    );

    log::debug!(
        "[db] Pool ready at {} (max {} connections)",
        config.db_path.display(),
        config.max_connections
    );

    Ok(pool)
}
