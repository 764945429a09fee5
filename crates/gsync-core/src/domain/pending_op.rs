//! Pending operation record
//!
//! Durable work-queue entry for a local<->remote mutation awaiting
//! confirmation. Rows are never removed automatically: the consumer
//! deletes an entry only after the mutation is confirmed end-to-end,
//! which gives at-least-once delivery across process restarts.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::newtypes::{AccountId, RemoteId};

/// Queue state of a pending operation
///
/// Transitions: `Queued -> Done | Failed`, with `Failed` re-enterable to
/// `Queued` by the consumer for retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpState {
    /// Waiting for a consumer to pick it up
    #[default]
    Queued,
    /// The mutation succeeded; awaiting explicit deletion
    Done,
    /// The last attempt failed; eligible for requeue
    Failed,
}

impl OpState {
    /// Stable string form used in the database
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OpState::Queued => "queued",
            OpState::Done => "done",
            OpState::Failed => "failed",
        }
    }
}

impl Display for OpState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(OpState::Queued),
            "done" => Ok(OpState::Done),
            "failed" => Ok(OpState::Failed),
            other => Err(DomainError::InvalidOpState(other.to_string())),
        }
    }
}

/// Kind of mutation a pending operation carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Push local content to the remote
    Upload,
    /// Fetch remote content to the local mirror
    Download,
    /// Propagate a deletion
    Delete,
    /// Create a remote folder
    CreateFolder,
    /// Move or rename
    Move,
}

impl OpKind {
    /// Stable string form used in the database
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Upload => "upload",
            OpKind::Download => "download",
            OpKind::Delete => "delete",
            OpKind::CreateFolder => "create_folder",
            OpKind::Move => "move",
        }
    }
}

impl Display for OpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(OpKind::Upload),
            "download" => Ok(OpKind::Download),
            "delete" => Ok(OpKind::Delete),
            "create_folder" => Ok(OpKind::CreateFolder),
            "move" => Ok(OpKind::Move),
            other => Err(DomainError::InvalidOpKind(other.to_string())),
        }
    }
}

/// One durable work-queue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOp {
    /// Opaque entry id, unique across all accounts
    pub id: String,
    /// Owning account; the row is removed with the account
    pub account_id: AccountId,
    /// Path the mutation applies to, relative to the sync root
    pub path: String,
    /// Remote id of the target, when already known (uploads of new files
    /// have none until the remote assigns one)
    pub remote_id: Option<RemoteId>,
    /// What the operation does
    pub kind: OpKind,
    /// Current queue state
    pub state: OpState,
    /// Number of failed attempts so far
    pub attempts: u32,
    /// Error text from the last failed attempt; empty otherwise
    pub last_error: String,
    /// Enqueue time; queue order is FIFO on this field
    pub created_at: DateTime<Utc>,
    /// Last state change time
    pub updated_at: DateTime<Utc>,
}

impl PendingOp {
    /// Creates a queued entry with a fresh random id and zero attempts
    pub fn new(account_id: AccountId, path: impl Into<String>, kind: OpKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            account_id,
            path: path.into(),
            remote_id: None,
            kind,
            state: OpState::Queued,
            attempts: 0,
            last_error: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a failed attempt: `Failed` state, attempt count incremented
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.state = OpState::Failed;
        self.attempts += 1;
        self.last_error = error.into();
        self.updated_at = Utc::now();
    }

    /// Marks the mutation confirmed; the row still needs explicit deletion
    pub fn mark_done(&mut self) {
        self.state = OpState::Done;
        self.last_error.clear();
        self.updated_at = Utc::now();
    }

    /// Returns a failed entry to the queue for another attempt
    ///
    /// The attempt count and last error are kept so the retry policy can
    /// inspect them.
    pub fn requeue(&mut self) {
        self.state = OpState::Queued;
        self.updated_at = Utc::now();
    }
}
