//! flickrsync Cache - Local record persistence
//!
//! SQLite-based record of:
//! - Photos already uploaded to Flickr (path → photo id, album)
//! - Albums created by flickrsync (name → album id)
//!
//! ## Architecture
//!
//! This crate implements the `IRecordStore` port from `flickrsync-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteRecordStore`] - `IRecordStore` implementation
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use flickrsync_cache::{DatabasePool, SqliteRecordStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/flickrsync/flickrsync.db")).await?;
//! let store = SqliteRecordStore::new(pool.pool().clone());
//! // Use store as IRecordStore...
//! pool.close().await;
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteRecordStore;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The targeted record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored row could not be converted back into a domain type
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
