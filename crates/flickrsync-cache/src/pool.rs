//! SQLite handle for the record store
//!
//! [`DatabasePool`] is opened once per CLI invocation and handed to
//! [`crate::SqliteRecordStore`]. Opening creates the file and its directory,
//! switches to WAL so `flickrsync status` can read while a sync writes, and
//! applies the schema (every statement is `IF NOT EXISTS`, so reopening an
//! existing store is a no-op). The CLI calls [`DatabasePool::close`] on every
//! exit path, including failed and interrupted runs.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::CacheError;

const SCHEMA: &str = include_str!("migrations/20261019_initial.sql");

/// How long a writer waits for a competing `status` reader to release the lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A sync run issues one statement at a time, a concurrent `status` adds a reader
const FILE_CONNECTIONS: u32 = 2;

/// Record store connection pool
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens (creating if needed) the record store at `db_path`
    ///
    /// # Errors
    ///
    /// `CacheError::ConnectionFailed` if the directory or file cannot be
    /// created or opened, `CacheError::MigrationFailed` if the schema cannot
    /// be applied.
    pub async fn new(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                CacheError::ConnectionFailed(format!(
                    "cannot create record store directory {}: {e}",
                    dir.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!(
                    "cannot open record store {}: {e}",
                    db_path.display()
                ))
            })?;

        apply_schema(&pool).await?;
        tracing::info!(path = %db_path.display(), "Opened record store");

        Ok(Self { pool })
    }

    /// Opens a throwaway record store in memory
    ///
    /// Limited to one connection: every SQLite in-memory connection is its
    /// own database.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!("cannot open in-memory record store: {e}"))
            })?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every connection in the pool
    ///
    /// Waits for checked-out connections to be returned. Queries issued after
    /// this call fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Record store closed");
    }
}

/// Creates the `photos` and `albums` tables when missing
async fn apply_schema(pool: &SqlitePool) -> Result<(), CacheError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| CacheError::MigrationFailed(format!("cannot create record store tables: {e}")))?;
    Ok(())
}
