//! Metadata store port (driven/secondary port)
//!
//! The persistence interface for everything this client durably records:
//! signed-in accounts, credential references, the mirrored remote tree,
//! per-account sync cursors, pending operations, and shared drives.
//!
//! ## Design Notes
//!
//! - The error taxonomy is part of the contract - callers distinguish a
//!   uniqueness conflict from an I/O failure to decide between showing a
//!   message and retrying - so methods return the typed [`StoreError`]
//!   rather than an opaque error.
//! - "Not found" is `Ok(None)`, never an error.
//! - All write operations take references to domain records; the caller
//!   retains ownership.
//! - Implementations never retry and never panic; every failure is
//!   returned to the caller. The one place retries are expected is the
//!   pending-operation consumer, see [`crate::retry::RetryPolicy`].
//! - Cancellation is the caller's future being dropped (e.g. under
//!   `tokio::time::timeout`). Implementations must guarantee that a call
//!   dropped before commit leaves no partial write.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{
    Account, AccountId, FileRecord, Folder, OpState, PendingOp, RemoteId, SharedDrive, SyncState,
    TokenRef,
};

// ============================================================================
// Error taxonomy
// ============================================================================

/// Errors that can occur during store operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate account email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The contention budget (busy/acquire timeout) elapsed; retryable
    #[error("Store busy: {0}")]
    Busy(String),

    /// Failed to open or create the database
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Schema migration failed; fatal at startup
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Any other database/driver failure, including corrupt rows
    #[error("Storage failure: {0}")]
    Storage(String),

    /// A caller-imposed deadline fired before the operation committed
    ///
    /// Never constructed by the store itself: a cancelled call's future is
    /// simply dropped and its transaction rolled back. Callers enforcing
    /// deadlines fold their timeout into this variant.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// True for failures a caller may reasonably retry after backing off
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy(_))
    }
}

/// Convenience alias used by all port methods
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// MetadataStore trait
// ============================================================================

/// Port trait for the durable metadata store
///
/// The store records state and exposes primitives; it does not decide
/// what to sync or resolve conflicts - the reconciliation engine composes
/// these operations into policy.
///
/// ## Implementation Notes
///
/// - Every multi-table mutation (sign-in, account deletion with its
///   cascade) must execute as one atomic transaction.
/// - Upserts on [`Account`], [`FileRecord`], [`Folder`], and
///   [`SharedDrive`] must preserve the stored `created_at` regardless of
///   the value supplied on later calls; every other field reflects the
///   latest call.
/// - Deletes of absent rows are no-ops, not errors.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    // --- Account registry ---

    /// Inserts or updates an account by id
    ///
    /// Fails with [`StoreError::Conflict`] if the email already belongs to
    /// a different account id.
    async fn upsert_account(&self, account: &Account) -> StoreResult<()>;

    /// Writes an account and its credential reference in one transaction
    ///
    /// The sign-in mutation: either both rows land or neither does.
    async fn upsert_account_with_token(
        &self,
        account: &Account,
        token: &TokenRef,
    ) -> StoreResult<()>;

    /// Retrieves an account by id
    async fn get_account(&self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Lists all accounts in insertion order
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// Deletes an account and, atomically, every dependent row
    /// (credential reference, sync cursor, files, folders, pending ops)
    async fn delete_account(&self, id: &AccountId) -> StoreResult<()>;

    // --- Credential references ---

    /// Inserts or updates the credential reference for an account
    async fn upsert_token_ref(&self, token: &TokenRef) -> StoreResult<()>;

    /// Retrieves the credential reference for an account
    async fn get_token_ref(&self, account_id: &AccountId) -> StoreResult<Option<TokenRef>>;

    /// Deletes the credential reference for an account
    async fn delete_token_ref(&self, account_id: &AccountId) -> StoreResult<()>;

    // --- Sync cursor ---

    /// Inserts or updates the sync cursor for an account
    async fn upsert_sync_state(&self, state: &SyncState) -> StoreResult<()>;

    /// Retrieves the sync cursor for an account
    async fn get_sync_state(&self, account_id: &AccountId) -> StoreResult<Option<SyncState>>;

    // --- File index ---

    /// Inserts or updates a file record, keyed by (account id, path)
    async fn upsert_file(&self, file: &FileRecord) -> StoreResult<()>;

    /// Retrieves a file record by path
    async fn get_file_by_path(
        &self,
        account_id: &AccountId,
        path: &str,
    ) -> StoreResult<Option<FileRecord>>;

    /// Retrieves a file record by its remote id
    async fn get_file_by_remote_id(
        &self,
        account_id: &AccountId,
        remote_id: &RemoteId,
    ) -> StoreResult<Option<FileRecord>>;

    /// Deletes a file record by path
    async fn delete_file(&self, account_id: &AccountId, path: &str) -> StoreResult<()>;

    /// Lists file records whose path starts with `prefix`, ordered by path
    ///
    /// `limit` of 0 means unbounded. `%` and `_` in the prefix match
    /// literally. This is the primitive a tree walker uses to enumerate a
    /// subtree without loading the whole index.
    async fn list_files_by_prefix(
        &self,
        account_id: &AccountId,
        prefix: &str,
        limit: u32,
    ) -> StoreResult<Vec<FileRecord>>;

    // --- Folder index ---

    /// Inserts or updates a folder record, keyed by (account id, path)
    async fn upsert_folder(&self, folder: &Folder) -> StoreResult<()>;

    /// Retrieves a folder record by path
    async fn get_folder_by_path(
        &self,
        account_id: &AccountId,
        path: &str,
    ) -> StoreResult<Option<Folder>>;

    /// Retrieves a folder record by its remote id
    async fn get_folder_by_remote_id(
        &self,
        account_id: &AccountId,
        remote_id: &RemoteId,
    ) -> StoreResult<Option<Folder>>;

    /// Deletes a folder record by path
    async fn delete_folder(&self, account_id: &AccountId, path: &str) -> StoreResult<()>;

    /// Lists folder records whose path starts with `prefix`, ordered by
    /// path; `limit` of 0 means unbounded
    async fn list_folders_by_prefix(
        &self,
        account_id: &AccountId,
        prefix: &str,
        limit: u32,
    ) -> StoreResult<Vec<Folder>>;

    // --- Pending operation queue ---

    /// Inserts a new queue entry
    ///
    /// The entry always starts in state `queued` with zero attempts and no
    /// error text, whatever the passed record carries. Fails with
    /// [`StoreError::Conflict`] on a duplicate id.
    async fn add_pending_op(&self, op: &PendingOp) -> StoreResult<()>;

    /// Lists queue entries for an account, FIFO by creation time
    ///
    /// `state` of `None` matches any state; `limit` of 0 means unbounded.
    async fn list_pending_ops(
        &self,
        account_id: &AccountId,
        state: Option<OpState>,
        limit: u32,
    ) -> StoreResult<Vec<PendingOp>>;

    /// Updates the state, attempt count, and last error of an entry
    ///
    /// Never deletes the row; a no-op for an unknown id.
    async fn update_pending_op(
        &self,
        id: &str,
        state: OpState,
        attempts: u32,
        last_error: &str,
    ) -> StoreResult<()>;

    /// Deletes a queue entry - the only way an entry leaves the table
    ///
    /// Call strictly after the underlying mutation is confirmed end-to-end.
    async fn delete_pending_op(&self, id: &str) -> StoreResult<()>;

    /// Counts an account's queue entries grouped by state
    ///
    /// Backs control-plane status queries ("M pending operations").
    async fn count_pending_ops_by_state(
        &self,
        account_id: &AccountId,
    ) -> StoreResult<HashMap<OpState, u64>>;

    // --- Shared drive catalog ---

    /// Inserts or updates a shared drive by id
    async fn upsert_shared_drive(&self, drive: &SharedDrive) -> StoreResult<()>;

    /// Retrieves a shared drive by id
    async fn get_shared_drive(&self, id: &RemoteId) -> StoreResult<Option<SharedDrive>>;

    /// Lists all shared drives ordered by name
    async fn list_shared_drives(&self) -> StoreResult<Vec<SharedDrive>>;

    /// Deletes a shared drive by id
    async fn delete_shared_drive(&self, id: &RemoteId) -> StoreResult<()>;
}
