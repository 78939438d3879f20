//! # Clipforge Core
//!
//! Core library for the Clipforge video platform, providing credential and
//! session lifecycle management plus the protocol that keeps database media
//! records and the remote object store consistent.
//!
//! ## Overview
//!
//! `clipforge-core` sits between transport handlers and the storage
//! backends, offering:
//!
//! - **Token Codec**: Stateless JWT issuance and verification with separate
//!   access/refresh keys and lifetimes
//! - **Session Lifecycle**: Login, logout, single-slot refresh rotation, and
//!   password changes
//! - **Asset Sync**: Upload-then-commit-then-retire replacement of stored
//!   media, so records never point at retired objects
//! - **Account & Catalog Services**: Registration, profile media, and the
//!   video publish/update/delete lifecycle
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL adapters (SQLx support)
//!
//! ## Architecture
//!
//! - [`auth`]: password hashing, token codec, session service
//! - [`sync`]: the asset replacement protocol
//! - [`account`] / [`catalog`]: the user-facing services
//! - [`ports`]: storage traits the services depend on
//! - [`infrastructure`]: PostgreSQL and HTTP adapters binding those traits
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clipforge_core::auth::{PasswordCrypto, SessionService, TokenCodec};
//! use clipforge_core::config::Config;
//! use clipforge_core::ports::UserDirectory;
//!
//! async fn open_session(
//!     directory: Arc<dyn UserDirectory>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let crypto =
//!         Arc::new(PasswordCrypto::new(config.auth.password_pepper.as_bytes())?);
//!     let codec = TokenCodec::new(&config.auth);
//!     let sessions = SessionService::new(
//!         directory,
//!         crypto,
//!         codec,
//!         config.auth.policy,
//!     );
//!
//!     let outcome = sessions.login("alice", "secure_password").await?;
//!     println!("opened session for {}", outcome.principal.username);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod account;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod ports;
pub mod sync;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{CoreError, Result};
