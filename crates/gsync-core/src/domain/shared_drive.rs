//! Shared drive catalog record
//!
//! Shared drives are objects of the remote service that several signed-in
//! accounts may attach to, so the catalog is global rather than
//! account-scoped and sits outside the account delete cascade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// A shared drive known to this client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDrive {
    /// The drive's id on the remote service
    pub id: RemoteId,
    /// Human-readable drive name
    pub name: String,
    /// First time this drive was cataloged; immutable once stored
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl SharedDrive {
    /// Creates a catalog entry stamped with the current time
    pub fn new(id: RemoteId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        let drive = SharedDrive::new(RemoteId::new("drive-1").unwrap(), "Team Drive");
        let json = serde_json::to_string(&drive).unwrap();
        let parsed: SharedDrive = serde_json::from_str(&json).unwrap();
        assert_eq!(drive, parsed);
    }
}
