//! Account record
//!
//! One row per signed-in remote identity. Created on sign-in, updated on
//! re-auth or primary-flag change, deleted on sign-out (which cascades to
//! every dependent row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{AccountId, Email};

/// A signed-in remote identity tracked by this client
///
/// `email` is globally unique across accounts; inserting a second account
/// with the same email fails with a conflict rather than overwriting.
/// At most one account should carry `is_primary` - recommended, not
/// database-enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Remote subject identifier
    pub id: AccountId,
    /// Email address, unique across all accounts
    pub email: Email,
    /// Display name from the remote profile
    pub display_name: String,
    /// Whether this is the primary account
    pub is_primary: bool,
    /// First sign-in time; immutable once stored
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new non-primary account stamped with the current time
    pub fn new(id: AccountId, email: Email, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            display_name: display_name.into(),
            is_primary: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
