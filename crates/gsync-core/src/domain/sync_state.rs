//! Sync cursor record
//!
//! Per-account resumption point for incremental change polling, plus the
//! account's last-known health. The reconciliation engine is the sole
//! writer; this store only persists and returns what it is given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{AccountId, PageToken};

/// Incremental-sync cursor for one account (1:1 with the account)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Owning account; the row is removed with the account
    pub account_id: AccountId,
    /// Cursor to present to the remote change feed; `None` before the
    /// first completed poll (forces a full listing)
    pub start_page_token: Option<PageToken>,
    /// Time of the last successful poll
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Last poll error; empty when healthy
    pub last_error: String,
    /// Administratively paused - the poller must skip this account
    pub paused: bool,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl SyncState {
    /// Creates a fresh, healthy, never-synced cursor
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            start_page_token: None,
            last_sync_at: None,
            last_error: String::new(),
            paused: false,
            updated_at: Utc::now(),
        }
    }

    /// True when the last poll completed without error
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.last_error.is_empty()
    }

    /// Records a successful poll: advances the cursor and clears the error
    pub fn record_success(&mut self, token: PageToken, at: DateTime<Utc>) {
        self.start_page_token = Some(token);
        self.last_sync_at = Some(at);
        self.last_error.clear();
        self.updated_at = at;
    }

    /// Records a failed poll without moving the cursor
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.last_error = error.into();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_healthy() {
        let state = SyncState::new(AccountId::new("acct-1").unwrap());
        assert!(state.is_healthy());
        assert!(state.start_page_token.is_none());
        assert!(state.last_sync_at.is_none());
        assert!(!state.paused);
    }

    #[test]
    fn test_record_success_clears_error() {
        let mut state = SyncState::new(AccountId::new("acct-1").unwrap());
        state.record_error("remote unreachable");
        assert!(!state.is_healthy());

        let at = Utc::now();
        state.record_success(PageToken::new("token-2").unwrap(), at);
        assert!(state.is_healthy());
        assert_eq!(state.start_page_token.as_ref().unwrap().as_str(), "token-2");
        assert_eq!(state.last_sync_at, Some(at));
    }

    #[test]
    fn test_record_error_keeps_cursor() {
        let mut state = SyncState::new(AccountId::new("acct-1").unwrap());
        state.record_success(PageToken::new("token-1").unwrap(), Utc::now());
        state.record_error("quota exceeded");
        assert_eq!(state.start_page_token.as_ref().unwrap().as_str(), "token-1");
        assert_eq!(state.last_error, "quota exceeded");
    }
}
