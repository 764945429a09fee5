//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces the domain core depends on, with implementations
//! living in adapter crates. The metadata store has a single port:
//!
//! - [`MetadataStore`] - durable persistence for accounts, credential
//!   references, the file/folder index, sync cursors, pending operations,
//!   and the shared-drive catalog

pub mod metadata_store;

pub use metadata_store::{MetadataStore, StoreError, StoreResult};
