//! Credential reference record
//!
//! Points at a secret held in the operating-system vault; never carries
//! the secret itself. The vault entry is keyed by (service, account id),
//! so `key_id` is all a consumer needs to fetch the real token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::AccountId;

/// Reference to an externally stored credential (1:1 with an account)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    /// Owning account; the row is removed with the account
    pub account_id: AccountId,
    /// Key of the secret in the external vault
    pub key_id: String,
    /// Token type, e.g. "refresh"
    pub token_type: String,
    /// Space-joined granted scopes, see [`join_scopes`]
    pub scope: String,
    /// Expiry of the access token last minted from this credential
    pub expiry: Option<DateTime<Utc>>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl TokenRef {
    /// Creates a reference for `account_id` with a normalized scope string
    pub fn new<S: AsRef<str>>(
        account_id: AccountId,
        key_id: impl Into<String>,
        token_type: impl Into<String>,
        scopes: &[S],
    ) -> Self {
        Self {
            account_id,
            key_id: key_id.into(),
            token_type: token_type.into(),
            scope: join_scopes(scopes),
            expiry: None,
            updated_at: Utc::now(),
        }
    }
}

/// Builds the canonical scope string from a caller-supplied scope list
///
/// Duplicates and empty entries are dropped, first-occurrence order is
/// kept, and the survivors are space-joined. The result is deterministic
/// for any ordering-preserving input, so it is safe to compare stored
/// scope strings for equality.
pub fn join_scopes<S: AsRef<str>>(scopes: &[S]) -> String {
    let mut seen = Vec::with_capacity(scopes.len());
    for scope in scopes {
        let scope = scope.as_ref();
        if scope.is_empty() || seen.contains(&scope) {
            continue;
        }
        seen.push(scope);
    }
    seen.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_scopes_dedups_preserving_order() {
        let joined = join_scopes(&["drive", "profile", "drive", "email"]);
        assert_eq!(joined, "drive profile email");
    }

    #[test]
    fn test_join_scopes_drops_empties() {
        let joined = join_scopes(&["", "drive", "", "drive"]);
        assert_eq!(joined, "drive");
    }

    #[test]
    fn test_join_scopes_empty_input() {
        let scopes: [&str; 0] = [];
        assert_eq!(join_scopes(&scopes), "");
    }

    #[test]
    fn test_new_normalizes_scope() {
        let token = TokenRef::new(
            AccountId::new("acct-1").unwrap(),
            "acct-1",
            "refresh",
            &["drive", "drive", "openid"],
        );
        assert_eq!(token.scope, "drive openid");
        assert!(token.expiry.is_none());
    }
}
