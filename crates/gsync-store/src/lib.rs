//! GSync Store - SQLite-backed metadata persistence
//!
//! Durable local store for:
//! - Signed-in accounts and their credential references
//! - The mirrored remote file/folder tree
//! - Per-account incremental-sync cursors
//! - The pending-operation queue
//! - The shared-drive catalog
//!
//! ## Architecture
//!
//! This crate implements the `MetadataStore` port from `gsync-core` using
//! SQLite as the storage backend. It is a driven (secondary) adapter in
//! the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Single-writer connection pool with embedded
//!   versioned migrations
//! - [`SqliteMetadataStore`] - Full `MetadataStore` implementation
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use gsync_store::{DatabasePool, SqliteMetadataStore};
//!
//! # async fn example() -> Result<(), gsync_store::StoreError> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/gsync/gsync.db")).await?;
//! let store = SqliteMetadataStore::new(pool.pool().clone());
//! // Use store as MetadataStore...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use gsync_core::ports::{MetadataStore, StoreError, StoreResult};
pub use pool::DatabasePool;
pub use repository::SqliteMetadataStore;

/// Maps a driver error onto the store's error taxonomy
///
/// Pool-acquire timeouts become the retryable `Busy`; unique-constraint
/// violations become `Conflict`; everything else is a storage failure.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut => {
            StoreError::Busy("timed out waiting for the store connection".to_string())
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        other => StoreError::Storage(other.to_string()),
    }
}
