//! File/folder index records
//!
//! The locally known mirror of the remote tree: one row per known file and
//! one per known folder, keyed by (account, path). Paths are relative to
//! the account's sync root and use forward slashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{AccountId, RemoteId};

/// Local mirror of one remote file
///
/// Uniquely identified by (account id, path); re-upserting the same pair
/// updates the row in place, preserving `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Owning account; the row is removed with the account
    pub account_id: AccountId,
    /// Path relative to the sync root, e.g. `docs/report.txt`
    pub path: String,
    /// The file's id on the remote service
    pub remote_id: RemoteId,
    /// Remote entity tag, used to detect remote-side changes
    pub etag: String,
    /// Content checksum as reported by the remote service
    pub checksum: String,
    /// Size in bytes
    pub size: u64,
    /// Last content modification time
    pub modified_at: DateTime<Utc>,
    /// First time this path was indexed; immutable once stored
    pub created_at: DateTime<Utc>,
}

/// Local mirror of one remote folder
///
/// Same (account id, path) keying and `created_at` behavior as
/// [`FileRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Owning account; the row is removed with the account
    pub account_id: AccountId,
    /// Path relative to the sync root, e.g. `docs`
    pub path: String,
    /// The folder's id on the remote service
    pub remote_id: RemoteId,
    /// Remote id of the parent folder; `None` for the sync root itself
    pub parent_id: Option<RemoteId>,
    /// First time this path was indexed; immutable once stored
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}
