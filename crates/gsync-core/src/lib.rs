//! GSync Core - Domain types and store port
//!
//! This crate contains the storage-independent core of the GSync metadata
//! store:
//! - **Domain records** - `Account`, `TokenRef`, `SyncState`, `FileRecord`,
//!   `Folder`, `PendingOp`, `SharedDrive`
//! - **Port definition** - the [`ports::MetadataStore`] trait that storage
//!   adapters implement
//! - **Error taxonomy** - [`ports::StoreError`] plus the domain-level
//!   [`domain::DomainError`]
//! - **Retry policy** - the backoff/dead-letter contract queue consumers
//!   are expected to honor
//!
//! # Architecture
//!
//! The domain module holds pure data and validation with no database
//! dependency. The port defines the trait interface a driven adapter
//! (currently `gsync-store`, SQLite-backed) implements. Higher layers -
//! the reconciliation engine, auth flows, the control plane - compose the
//! port's primitives into policy; nothing in this crate decides what to
//! sync.

pub mod config;
pub mod domain;
pub mod ports;
pub mod retry;
