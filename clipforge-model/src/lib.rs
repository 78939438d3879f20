//! Core data model definitions shared across clipforge crates.
#![allow(missing_docs)]

pub mod asset;
pub mod error;
pub mod ids;
pub mod patch;
pub mod principal;
pub mod video;

// Intentionally curated re-exports for downstream consumers.
pub use asset::{AssetRef, AssetSlot, MediaKind, MediaOwner};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{PrincipalId, VideoId};
pub use patch::{AccountUpdate, Patch, VideoUpdate};
pub use principal::{NewPrincipal, Principal, PrincipalView};
pub use video::{Video, VideoDraft};
