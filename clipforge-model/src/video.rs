//! Catalog video records.

use chrono::{DateTime, Utc};

use crate::asset::{AssetRef, AssetSlot, MediaOwner};
use crate::ids::{PrincipalId, VideoId};

/// A published or draft video owned by a principal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Video {
    pub id: VideoId,
    /// Principal that uploaded the video; all mutations require ownership.
    pub owner: PrincipalId,
    pub title: String,
    pub description: String,
    /// Stored video object.
    pub video_file: AssetRef,
    /// Stored thumbnail image.
    pub thumbnail: AssetRef,
    /// Playback length in seconds, captured from the store response.
    pub duration_secs: f64,
    /// View counter, starts at zero.
    pub views: i64,
    /// Whether the video is visible to non-owners.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new video; assets and duration are attached
/// by the publish flow after the uploads succeed.
#[derive(Debug, Clone)]
pub struct VideoDraft {
    pub title: String,
    pub description: String,
}

impl Video {
    /// Builds a fresh record with catalog defaults: zero views, published.
    pub fn new(
        owner: PrincipalId,
        draft: VideoDraft,
        video_file: AssetRef,
        thumbnail: AssetRef,
    ) -> Self {
        let now = Utc::now();
        let duration_secs = video_file.duration_secs().unwrap_or(0.0);
        Video {
            id: VideoId::new(),
            owner,
            title: draft.title,
            description: draft.description,
            video_file,
            thumbnail,
            duration_secs,
            views: 0,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as just updated.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, principal: PrincipalId) -> bool {
        self.owner == principal
    }
}

impl MediaOwner for Video {
    fn slots(&self) -> &'static [AssetSlot] {
        &[AssetSlot::VideoFile, AssetSlot::Thumbnail]
    }

    fn asset_ref(&self, slot: AssetSlot) -> Option<&AssetRef> {
        match slot {
            AssetSlot::VideoFile => Some(&self.video_file),
            AssetSlot::Thumbnail => Some(&self.thumbnail),
            _ => None,
        }
    }

    fn replace_asset_ref(
        &mut self,
        slot: AssetSlot,
        reference: AssetRef,
    ) -> Option<AssetRef> {
        match slot {
            AssetSlot::VideoFile => {
                Some(std::mem::replace(&mut self.video_file, reference))
            }
            AssetSlot::Thumbnail => {
                Some(std::mem::replace(&mut self.thumbnail, reference))
            }
            _ => None,
        }
    }
}
