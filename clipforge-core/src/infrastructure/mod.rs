//! Adapters binding the service ports to real backends.

pub mod http_store;
#[cfg(feature = "database")]
pub mod postgres;

pub use http_store::HttpObjectStore;
#[cfg(feature = "database")]
pub use postgres::{PostgresContentCatalog, PostgresUserDirectory};
