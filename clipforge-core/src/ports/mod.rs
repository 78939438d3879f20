//! Collaborator ports (interfaces) consumed by the core services.
//!
//! Services depend on these traits, never on concrete adapters; the Postgres
//! and HTTP implementations live under `infrastructure`. Test fakes implement
//! the same traits.

pub mod catalog;
pub mod directory;
pub mod store;

pub use catalog::ContentCatalog;
pub use directory::{SaveOptions, UserDirectory};
pub use store::{ObjectStore, StoreError, StoredObject};
