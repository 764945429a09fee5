//! SQLite implementation of the MetadataStore port
//!
//! This module provides the concrete SQLite-based implementation of the
//! metadata store port defined in gsync-core. It handles row mapping and
//! SQL construction for all seven tables.
//!
//! ## Type Mapping
//!
//! | Domain Type        | SQL Type | Strategy                                   |
//! |--------------------|----------|--------------------------------------------|
//! | AccountId          | TEXT     | String via `as_str()` / `AccountId::new()` |
//! | RemoteId           | TEXT     | String via `as_str()` / `RemoteId::new()`  |
//! | PageToken          | TEXT     | Nullable TEXT, `None` when NULL            |
//! | Email              | TEXT     | Lowercased string, UNIQUE column           |
//! | OpState, OpKind    | TEXT     | Closed-enum string form via `as_str()` / `FromStr` |
//! | DateTime<Utc>      | TEXT     | RFC 3339 via `to_rfc3339()` / `parse_from_rfc3339()` |
//! | bool               | INTEGER  | Native sqlx encoding                       |
//! | u64 / u32          | INTEGER  | Cast through i64                           |
//!
//! ## Upsert discipline
//!
//! Every upsert is an `INSERT .. ON CONFLICT .. DO UPDATE SET` that lists
//! the mutable columns and omits `created_at`, so the first-insert value
//! survives any later call no matter what the caller passes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{Row, SqlitePool};

use gsync_core::domain::{
    Account, AccountId, DomainError, Email, FileRecord, Folder, OpKind, OpState, PageToken,
    PendingOp, RemoteId, SharedDrive, SyncState, TokenRef,
};
use gsync_core::ports::{MetadataStore, StoreError, StoreResult};

use crate::map_sqlx_error;

/// SQLite-based implementation of the metadata store port
///
/// All operations go through the shared single-connection pool, which
/// serializes them; the struct is cheap to clone and safe to share
/// across tasks.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Creates a new store backed by the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// A stored value failed domain validation on the way back out
fn corrupt_row(e: DomainError) -> StoreError {
    StoreError::Storage(format!("corrupt row: {e}"))
}

/// Parse a DateTime<Utc> from its stored RFC 3339 form
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Storage(format!("failed to parse datetime '{s}': {e}")))
}

/// Parse an optional DateTime<Utc> from an optional stored string
fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}

/// Build a LIKE pattern matching paths that start with `prefix`
///
/// `%`, `_`, and the escape character itself are escaped so they match
/// literally; queries using the result must carry `ESCAPE '\'`.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Translate the port's `0 = unbounded` limit into SQLite's `LIMIT -1`
fn limit_value(limit: u32) -> i64 {
    if limit == 0 {
        -1
    } else {
        i64::from(limit)
    }
}

// ============================================================================
// Row mapping functions
// ============================================================================

/// Reconstruct an Account from a database row
fn account_from_row(row: &SqliteRow) -> Result<Account, StoreError> {
    let id: String = row.get("id");
    let email: String = row.get("email");
    let display_name: String = row.get("display_name");
    let is_primary: bool = row.get("is_primary");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Account {
        id: AccountId::new(id).map_err(corrupt_row)?,
        email: Email::new(email).map_err(corrupt_row)?,
        display_name,
        is_primary,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Reconstruct a TokenRef from a database row
fn token_ref_from_row(row: &SqliteRow) -> Result<TokenRef, StoreError> {
    let account_id: String = row.get("account_id");
    let key_id: String = row.get("key_id");
    let token_type: String = row.get("token_type");
    let scope: String = row.get("scope");
    let expiry: Option<String> = row.get("expiry");
    let updated_at: String = row.get("updated_at");

    Ok(TokenRef {
        account_id: AccountId::new(account_id).map_err(corrupt_row)?,
        key_id,
        token_type,
        scope,
        expiry: parse_optional_datetime(expiry)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Reconstruct a SyncState from a database row
fn sync_state_from_row(row: &SqliteRow) -> Result<SyncState, StoreError> {
    let account_id: String = row.get("account_id");
    let start_page_token: Option<String> = row.get("start_page_token");
    let last_sync_at: Option<String> = row.get("last_sync_at");
    let last_error: String = row.get("last_error");
    let paused: bool = row.get("paused");
    let updated_at: String = row.get("updated_at");

    let start_page_token = match start_page_token {
        Some(ref token) if !token.is_empty() => {
            Some(PageToken::new(token.clone()).map_err(corrupt_row)?)
        }
        _ => None,
    };

    Ok(SyncState {
        account_id: AccountId::new(account_id).map_err(corrupt_row)?,
        start_page_token,
        last_sync_at: parse_optional_datetime(last_sync_at)?,
        last_error,
        paused,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Reconstruct a FileRecord from a database row
fn file_from_row(row: &SqliteRow) -> Result<FileRecord, StoreError> {
    let account_id: String = row.get("account_id");
    let path: String = row.get("path");
    let remote_id: String = row.get("remote_id");
    let etag: String = row.get("etag");
    let checksum: String = row.get("checksum");
    let size: i64 = row.get("size");
    let modified_at: String = row.get("modified_at");
    let created_at: String = row.get("created_at");

    Ok(FileRecord {
        account_id: AccountId::new(account_id).map_err(corrupt_row)?,
        path,
        remote_id: RemoteId::new(remote_id).map_err(corrupt_row)?,
        etag,
        checksum,
        size: size as u64,
        modified_at: parse_datetime(&modified_at)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Reconstruct a Folder from a database row
fn folder_from_row(row: &SqliteRow) -> Result<Folder, StoreError> {
    let account_id: String = row.get("account_id");
    let path: String = row.get("path");
    let remote_id: String = row.get("remote_id");
    let parent_id: Option<String> = row.get("parent_id");
    let created_at: String = row.get("created_at");
    let modified_at: String = row.get("modified_at");

    let parent_id = match parent_id {
        Some(ref id) if !id.is_empty() => Some(RemoteId::new(id.clone()).map_err(corrupt_row)?),
        _ => None,
    };

    Ok(Folder {
        account_id: AccountId::new(account_id).map_err(corrupt_row)?,
        path,
        remote_id: RemoteId::new(remote_id).map_err(corrupt_row)?,
        parent_id,
        created_at: parse_datetime(&created_at)?,
        modified_at: parse_datetime(&modified_at)?,
    })
}

/// Reconstruct a PendingOp from a database row
fn pending_op_from_row(row: &SqliteRow) -> Result<PendingOp, StoreError> {
    let id: String = row.get("id");
    let account_id: String = row.get("account_id");
    let path: String = row.get("path");
    let remote_id: Option<String> = row.get("remote_id");
    let op_type: String = row.get("op_type");
    let state: String = row.get("state");
    let attempts: i64 = row.get("attempts");
    let last_error: String = row.get("last_error");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let remote_id = match remote_id {
        Some(ref rid) if !rid.is_empty() => Some(RemoteId::new(rid.clone()).map_err(corrupt_row)?),
        _ => None,
    };

    Ok(PendingOp {
        id,
        account_id: AccountId::new(account_id).map_err(corrupt_row)?,
        path,
        remote_id,
        kind: op_type.parse::<OpKind>().map_err(corrupt_row)?,
        state: state.parse::<OpState>().map_err(corrupt_row)?,
        attempts: attempts as u32,
        last_error,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Reconstruct a SharedDrive from a database row
fn shared_drive_from_row(row: &SqliteRow) -> Result<SharedDrive, StoreError> {
    let id: String = row.get("id");
    let name: String = row.get("name");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(SharedDrive {
        id: RemoteId::new(id).map_err(corrupt_row)?,
        name,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

// ============================================================================
// Write helpers shared by single-row upserts and transactions
// ============================================================================

impl SqliteMetadataStore {
    async fn write_account<'e, E>(executor: E, account: &Account) -> StoreResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO accounts (id, email, display_name, is_primary, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 email = excluded.email, \
                 display_name = excluded.display_name, \
                 is_primary = excluded.is_primary, \
                 updated_at = excluded.updated_at",
        )
        .bind(account.id.as_str())
        .bind(account.email.as_str())
        .bind(&account.display_name)
        .bind(account.is_primary)
        .bind(account.created_at.to_rfc3339())
        .bind(account.updated_at.to_rfc3339())
        .execute(executor)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn write_token_ref<'e, E>(executor: E, token: &TokenRef) -> StoreResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO token_refs (account_id, key_id, token_type, scope, expiry, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(account_id) DO UPDATE SET \
                 key_id = excluded.key_id, \
                 token_type = excluded.token_type, \
                 scope = excluded.scope, \
                 expiry = excluded.expiry, \
                 updated_at = excluded.updated_at",
        )
        .bind(token.account_id.as_str())
        .bind(&token.key_id)
        .bind(&token.token_type)
        .bind(&token.scope)
        .bind(token.expiry.map(|dt| dt.to_rfc3339()))
        .bind(token.updated_at.to_rfc3339())
        .execute(executor)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

// ============================================================================
// MetadataStore implementation
// ============================================================================

#[async_trait::async_trait]
impl MetadataStore for SqliteMetadataStore {
    // --- Account registry ---

    async fn upsert_account(&self, account: &Account) -> StoreResult<()> {
        Self::write_account(&self.pool, account).await?;

        tracing::trace!(account_id = %account.id, "upserted account");
        Ok(())
    }

    async fn upsert_account_with_token(
        &self,
        account: &Account,
        token: &TokenRef,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        Self::write_account(&mut *tx, account).await?;
        Self::write_token_ref(&mut *tx, token).await?;

        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::debug!(account_id = %account.id, "registered account with credential reference");
        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(account_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        // rowid reflects true insertion order even when callers supply
        // out-of-order created_at values
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(account_from_row).collect()
    }

    async fn delete_account(&self, id: &AccountId) -> StoreResult<()> {
        // The ON DELETE CASCADE foreign keys remove the account's token
        // reference, sync cursor, files, folders, and pending ops in the
        // same implicit transaction as this statement.
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            tracing::debug!(account_id = %id, "deleted account and dependent rows");
        }
        Ok(())
    }

    // --- Credential references ---

    async fn upsert_token_ref(&self, token: &TokenRef) -> StoreResult<()> {
        Self::write_token_ref(&self.pool, token).await?;

        tracing::trace!(account_id = %token.account_id, "upserted token reference");
        Ok(())
    }

    async fn get_token_ref(&self, account_id: &AccountId) -> StoreResult<Option<TokenRef>> {
        let row = sqlx::query("SELECT * FROM token_refs WHERE account_id = ?")
            .bind(account_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(token_ref_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_token_ref(&self, account_id: &AccountId) -> StoreResult<()> {
        sqlx::query("DELETE FROM token_refs WHERE account_id = ?")
            .bind(account_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %account_id, "deleted token reference");
        Ok(())
    }

    // --- Sync cursor ---

    async fn upsert_sync_state(&self, state: &SyncState) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO sync_state \
                 (account_id, start_page_token, last_sync_at, last_error, paused, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(account_id) DO UPDATE SET \
                 start_page_token = excluded.start_page_token, \
                 last_sync_at = excluded.last_sync_at, \
                 last_error = excluded.last_error, \
                 paused = excluded.paused, \
                 updated_at = excluded.updated_at",
        )
        .bind(state.account_id.as_str())
        .bind(state.start_page_token.as_ref().map(|t| t.as_str()))
        .bind(state.last_sync_at.map(|dt| dt.to_rfc3339()))
        .bind(&state.last_error)
        .bind(state.paused)
        .bind(state.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %state.account_id, "upserted sync state");
        Ok(())
    }

    async fn get_sync_state(&self, account_id: &AccountId) -> StoreResult<Option<SyncState>> {
        let row = sqlx::query("SELECT * FROM sync_state WHERE account_id = ?")
            .bind(account_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(sync_state_from_row(r)?)),
            None => Ok(None),
        }
    }

    // --- File index ---

    async fn upsert_file(&self, file: &FileRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO files \
                 (account_id, path, remote_id, etag, checksum, size, modified_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(account_id, path) DO UPDATE SET \
                 remote_id = excluded.remote_id, \
                 etag = excluded.etag, \
                 checksum = excluded.checksum, \
                 size = excluded.size, \
                 modified_at = excluded.modified_at",
        )
        .bind(file.account_id.as_str())
        .bind(&file.path)
        .bind(file.remote_id.as_str())
        .bind(&file.etag)
        .bind(&file.checksum)
        .bind(file.size as i64)
        .bind(file.modified_at.to_rfc3339())
        .bind(file.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %file.account_id, path = %file.path, "upserted file record");
        Ok(())
    }

    async fn get_file_by_path(
        &self,
        account_id: &AccountId,
        path: &str,
    ) -> StoreResult<Option<FileRecord>> {
        let row = sqlx::query("SELECT * FROM files WHERE account_id = ? AND path = ?")
            .bind(account_id.as_str())
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(file_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn get_file_by_remote_id(
        &self,
        account_id: &AccountId,
        remote_id: &RemoteId,
    ) -> StoreResult<Option<FileRecord>> {
        let row = sqlx::query("SELECT * FROM files WHERE account_id = ? AND remote_id = ?")
            .bind(account_id.as_str())
            .bind(remote_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(file_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_file(&self, account_id: &AccountId, path: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM files WHERE account_id = ? AND path = ?")
            .bind(account_id.as_str())
            .bind(path)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %account_id, path = %path, "deleted file record");
        Ok(())
    }

    async fn list_files_by_prefix(
        &self,
        account_id: &AccountId,
        prefix: &str,
        limit: u32,
    ) -> StoreResult<Vec<FileRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM files \
             WHERE account_id = ? AND path LIKE ? ESCAPE '\\' \
             ORDER BY path ASC LIMIT ?",
        )
        .bind(account_id.as_str())
        .bind(like_prefix(prefix))
        .bind(limit_value(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(file_from_row).collect()
    }

    // --- Folder index ---

    async fn upsert_folder(&self, folder: &Folder) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO folders \
                 (account_id, path, remote_id, parent_id, created_at, modified_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(account_id, path) DO UPDATE SET \
                 remote_id = excluded.remote_id, \
                 parent_id = excluded.parent_id, \
                 modified_at = excluded.modified_at",
        )
        .bind(folder.account_id.as_str())
        .bind(&folder.path)
        .bind(folder.remote_id.as_str())
        .bind(folder.parent_id.as_ref().map(|id| id.as_str()))
        .bind(folder.created_at.to_rfc3339())
        .bind(folder.modified_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %folder.account_id, path = %folder.path, "upserted folder");
        Ok(())
    }

    async fn get_folder_by_path(
        &self,
        account_id: &AccountId,
        path: &str,
    ) -> StoreResult<Option<Folder>> {
        let row = sqlx::query("SELECT * FROM folders WHERE account_id = ? AND path = ?")
            .bind(account_id.as_str())
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(folder_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn get_folder_by_remote_id(
        &self,
        account_id: &AccountId,
        remote_id: &RemoteId,
    ) -> StoreResult<Option<Folder>> {
        let row = sqlx::query("SELECT * FROM folders WHERE account_id = ? AND remote_id = ?")
            .bind(account_id.as_str())
            .bind(remote_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(folder_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_folder(&self, account_id: &AccountId, path: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM folders WHERE account_id = ? AND path = ?")
            .bind(account_id.as_str())
            .bind(path)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        tracing::trace!(account_id = %account_id, path = %path, "deleted folder");
        Ok(())
    }

    async fn list_folders_by_prefix(
        &self,
        account_id: &AccountId,
        prefix: &str,
        limit: u32,
    ) -> StoreResult<Vec<Folder>> {
        let rows = sqlx::query(
            "SELECT * FROM folders \
             WHERE account_id = ? AND path LIKE ? ESCAPE '\\' \
             ORDER BY path ASC LIMIT ?",
        )
        .bind(account_id.as_str())
        .bind(like_prefix(prefix))
        .bind(limit_value(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(folder_from_row).collect()
    }

    // --- Pending operation queue ---

    async fn add_pending_op(&self, op: &PendingOp) -> StoreResult<()> {
        // Entries always enter the queue fresh: state queued, zero
        // attempts, no error text, whatever the passed record carries.
        sqlx::query(
            "INSERT INTO pending_ops \
                 (id, account_id, path, remote_id, op_type, state, attempts, last_error, \
                  created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'queued', 0, '', ?, ?)",
        )
        .bind(&op.id)
        .bind(op.account_id.as_str())
        .bind(&op.path)
        .bind(op.remote_id.as_ref().map(|id| id.as_str()))
        .bind(op.kind.as_str())
        .bind(op.created_at.to_rfc3339())
        .bind(op.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(op_id = %op.id, kind = %op.kind, "queued pending operation");
        Ok(())
    }

    async fn list_pending_ops(
        &self,
        account_id: &AccountId,
        state: Option<OpState>,
        limit: u32,
    ) -> StoreResult<Vec<PendingOp>> {
        let mut sql = String::from("SELECT * FROM pending_ops WHERE account_id = ?");
        if state.is_some() {
            sql.push_str(" AND state = ?");
        }
        // rowid breaks ties between entries queued in the same instant
        sql.push_str(" ORDER BY created_at ASC, rowid ASC LIMIT ?");

        let mut query = sqlx::query(&sql).bind(account_id.as_str());
        if let Some(state) = state {
            query = query.bind(state.as_str());
        }

        let rows = query
            .bind(limit_value(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(pending_op_from_row).collect()
    }

    async fn update_pending_op(
        &self,
        id: &str,
        state: OpState,
        attempts: u32,
        last_error: &str,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE pending_ops \
             SET state = ?, attempts = ?, last_error = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(state.as_str())
        .bind(i64::from(attempts))
        .bind(last_error)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(op_id = %id, state = %state, attempts, "updated pending operation");
        Ok(())
    }

    async fn delete_pending_op(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM pending_ops WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        tracing::trace!(op_id = %id, "deleted pending operation");
        Ok(())
    }

    async fn count_pending_ops_by_state(
        &self,
        account_id: &AccountId,
    ) -> StoreResult<HashMap<OpState, u64>> {
        let rows = sqlx::query(
            "SELECT state, COUNT(*) AS count FROM pending_ops \
             WHERE account_id = ? GROUP BY state",
        )
        .bind(account_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut counts = HashMap::new();
        for row in &rows {
            let state: String = row.get("state");
            let count: i64 = row.get("count");
            counts.insert(state.parse::<OpState>().map_err(corrupt_row)?, count as u64);
        }

        Ok(counts)
    }

    // --- Shared drive catalog ---

    async fn upsert_shared_drive(&self, drive: &SharedDrive) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO shared_drives (id, name, created_at, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                 name = excluded.name, \
                 updated_at = excluded.updated_at",
        )
        .bind(drive.id.as_str())
        .bind(&drive.name)
        .bind(drive.created_at.to_rfc3339())
        .bind(drive.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::trace!(drive_id = %drive.id, "upserted shared drive");
        Ok(())
    }

    async fn get_shared_drive(&self, id: &RemoteId) -> StoreResult<Option<SharedDrive>> {
        let row = sqlx::query("SELECT * FROM shared_drives WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(ref r) => Ok(Some(shared_drive_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn list_shared_drives(&self) -> StoreResult<Vec<SharedDrive>> {
        let rows = sqlx::query("SELECT * FROM shared_drives ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(shared_drive_from_row).collect()
    }

    async fn delete_shared_drive(&self, id: &RemoteId) -> StoreResult<()> {
        sqlx::query("DELETE FROM shared_drives WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        tracing::trace!(drive_id = %id, "deleted shared drive");
        Ok(())
    }
}
