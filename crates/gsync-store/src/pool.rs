//! Database connection pool management
//!
//! Provides a wrapper around SQLx's SqlitePool with:
//! - Automatic directory creation for database files
//! - Foreign-key enforcement and WAL journal mode
//! - A single-connection pool (single logical writer)
//! - Versioned schema migration on startup
//! - In-memory mode for testing

use std::path::Path;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use gsync_core::ports::StoreError;

use crate::map_sqlx_error;

/// Embedded migrations, applied in ascending version order. The ledger
/// table sqlx maintains makes each version run at most once, so restarts
/// against an already-migrated database are no-ops.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// How long a caller waits on a held database lock or busy pool before
/// the call fails with a retryable error
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Manages the SQLite connection for GSync metadata persistence
///
/// The pool is capped at one connection, so every operation - reads
/// included - serializes through a single logical session. This removes
/// any need for application-level locking, at the cost that a
/// long-running transaction blocks all other callers; transactions must
/// stay short. A second caller blocks up to [`BUSY_TIMEOUT`] and then
/// receives [`StoreError::Busy`].
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a pool connected to the database file at `db_path`
    ///
    /// This will:
    /// 1. Create parent directories if they don't exist
    /// 2. Create the database file if it doesn't exist
    /// 3. Enable foreign-key enforcement and WAL journal mode
    /// 4. Run any pending schema migrations
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the directory or file cannot
    /// be created or opened, or `StoreError::Migration` if a migration
    /// fails. Both are fatal to startup: the store must not run against
    /// a partial schema.
    pub async fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!(
                    "failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(BUSY_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::Connection(format!(
                    "failed to connect to database at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::info!(path = %db_path.display(), "metadata store initialized");

        Ok(Self { pool })
    }

    /// Creates an in-memory pool for testing
    ///
    /// Uses a single connection so the database persists across queries
    /// (SQLite in-memory databases are per-connection).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the connection cannot be
    /// established, or `StoreError::Migration` if migrations fail.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StoreError::Connection(format!("failed to create in-memory database: {e}"))
            })?;

        // The URL form skips the connect options, so enable FKs directly
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Connection(format!("failed to enable foreign keys: {e}")))?;

        Self::run_migrations(&pool).await?;

        tracing::debug!("in-memory metadata store initialized");

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begins an explicit multi-statement transaction
    ///
    /// The transaction rolls back on drop unless committed, so a caller
    /// cancelled mid-flight can never leave a partial write.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        self.pool.begin().await.map_err(map_sqlx_error)
    }

    /// Closes the pool, waiting for the connection to be released
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("metadata store closed");
    }

    /// Applies pending migrations in ascending version order
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        MIGRATOR
            .run(pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::debug!("database migrations completed");
        Ok(())
    }
}
