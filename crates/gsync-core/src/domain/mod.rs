//! Domain records and validation
//!
//! The seven entities the metadata store persists, the validated newtypes
//! they are built from, and the domain-level error type:
//! - Accounts and their credential references
//! - The mirrored remote file/folder tree
//! - Per-account sync cursors
//! - The pending-operation queue
//! - The shared-drive catalog

pub mod account;
pub mod errors;
pub mod index;
pub mod newtypes;
pub mod pending_op;
pub mod shared_drive;
pub mod sync_state;
pub mod token;

// Re-export commonly used types
pub use account::Account;
pub use errors::DomainError;
pub use index::{FileRecord, Folder};
pub use newtypes::{AccountId, Email, PageToken, RemoteId};
pub use pending_op::{OpKind, OpState, PendingOp};
pub use shared_drive::SharedDrive;
pub use sync_state::SyncState;
pub use token::{join_scopes, TokenRef};
