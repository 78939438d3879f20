//! Stored-object references and the media slots that carry them.
//!
//! An [`AssetRef`] is a durable pointer into the remote object store. It is
//! immutable once constructed: replacing a slot's asset means writing a new
//! reference and retiring the old one, never editing a reference in place.

use url::Url;

use crate::error::{ModelError, Result};

/// Kind of object held by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named media field on an owning record.
///
/// Each slot holds at most one asset of a fixed [`MediaKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetSlot {
    Avatar,
    Cover,
    VideoFile,
    Thumbnail,
}

impl AssetSlot {
    /// The kind of object this slot stores.
    pub fn kind(&self) -> MediaKind {
        match self {
            AssetSlot::Avatar | AssetSlot::Cover | AssetSlot::Thumbnail => {
                MediaKind::Image
            }
            AssetSlot::VideoFile => MediaKind::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetSlot::Avatar => "avatar",
            AssetSlot::Cover => "cover",
            AssetSlot::VideoFile => "video_file",
            AssetSlot::Thumbnail => "thumbnail",
        }
    }

    /// Human-readable slot name for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            AssetSlot::Avatar => "avatar",
            AssetSlot::Cover => "cover image",
            AssetSlot::VideoFile => "video",
            AssetSlot::Thumbnail => "thumbnail",
        }
    }
}

impl std::fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable pointer to an object in remote storage.
///
/// Construction validates usability: the URL must be non-empty and parse as
/// an absolute URL with a host. A reference that fails this check must never
/// be committed to a record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetRef {
    url: String,
    kind: MediaKind,
    /// Playback length in seconds, reported by the store for video objects.
    duration_secs: Option<f64>,
}

impl AssetRef {
    /// Builds a reference after checking the URL is usable.
    pub fn new(
        url: impl Into<String>,
        kind: MediaKind,
        duration_secs: Option<f64>,
    ) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidAssetRef("empty URL".to_string()));
        }
        let parsed = Url::parse(trimmed).map_err(|e| {
            ModelError::InvalidAssetRef(format!("unparsable URL: {e}"))
        })?;
        if parsed.host_str().is_none() {
            return Err(ModelError::InvalidAssetRef(
                "URL has no host".to_string(),
            ));
        }
        Ok(AssetRef {
            url: trimmed.to_string(),
            kind,
            duration_secs,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.url, self.kind)
    }
}

/// Any owned record with exactly one field per media slot.
///
/// Invariant: a slot points at "no asset" or at a reference that currently
/// exists in the remote store. It is never observed pointing at a retired
/// object; the sync protocol commits the new reference before retiring the
/// old one.
pub trait MediaOwner {
    /// Slots this record carries.
    fn slots(&self) -> &'static [AssetSlot];

    /// Current reference held by `slot`, if any.
    fn asset_ref(&self, slot: AssetSlot) -> Option<&AssetRef>;

    /// Replaces the slot's value, returning the superseded reference.
    ///
    /// Slots the record does not carry are left untouched and return `None`;
    /// callers are expected to pass slots listed by [`MediaOwner::slots`].
    fn replace_asset_ref(
        &mut self,
        slot: AssetSlot,
        reference: AssetRef,
    ) -> Option<AssetRef>;

    /// Every populated slot paired with its reference.
    fn all_asset_refs(&self) -> Vec<(AssetSlot, AssetRef)> {
        self.slots()
            .iter()
            .filter_map(|slot| {
                self.asset_ref(*slot).map(|r| (*slot, r.clone()))
            })
            .collect()
    }
}
