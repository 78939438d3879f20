//! Video catalog operations.
//!
//! Every mutation checks ownership first; publish visibility hides an
//! unpublished video from everyone but its owner without revealing that it
//! exists.

use std::path::Path;
use std::sync::Arc;

use clipforge_model::{
    AssetSlot, MediaOwner, PrincipalId, Video, VideoDraft, VideoId,
    VideoUpdate,
};

use crate::error::{CoreError, Result};
use crate::ports::ContentCatalog;
use crate::sync::{AssetSyncCoordinator, RetireFailure};

const OWNER_ONLY: &str = "Only the owner may modify this video";

/// Publish, fetch, update, and delete catalog videos.
pub struct VideoService {
    catalog: Arc<dyn ContentCatalog>,
    sync: AssetSyncCoordinator,
}

impl std::fmt::Debug for VideoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoService").finish()
    }
}

impl VideoService {
    pub fn new(
        catalog: Arc<dyn ContentCatalog>,
        sync: AssetSyncCoordinator,
    ) -> Self {
        VideoService { catalog, sync }
    }

    /// Upload both assets and create the record.
    ///
    /// Duration comes from the store's response for the video object; the
    /// view counter starts at zero and the publish flag defaults on.
    pub async fn publish(
        &self,
        owner: PrincipalId,
        draft: VideoDraft,
        video_file: Option<&Path>,
        thumbnail: Option<&Path>,
    ) -> Result<Video> {
        if draft.title.trim().is_empty() || draft.description.trim().is_empty()
        {
            return Err(CoreError::bad_request(
                "title and description are required",
            ));
        }

        let video_file =
            self.sync.stage(video_file, AssetSlot::VideoFile).await?;
        let thumbnail =
            self.sync.stage(thumbnail, AssetSlot::Thumbnail).await?;

        let video = Video::new(owner, draft, video_file, thumbnail);
        self.catalog.create_video(&video).await?;

        tracing::info!(video = %video.id, owner = %owner, "video published");
        Ok(video)
    }

    /// Fetch a video. Unpublished videos are visible only to their owner;
    /// everyone else sees the same `NotFound` as for a missing record.
    pub async fn fetch(
        &self,
        video: VideoId,
        requester: PrincipalId,
    ) -> Result<Video> {
        let record = self.load(video).await?;
        if !record.is_published && !record.is_owned_by(requester) {
            return Err(CoreError::not_found("Video not found"));
        }
        Ok(record)
    }

    /// Patch title/description and optionally replace the thumbnail.
    ///
    /// With a new thumbnail the patched fields and the new reference land in
    /// one record write, and the old thumbnail is retired only after it.
    pub async fn update(
        &self,
        video: VideoId,
        requester: PrincipalId,
        update: VideoUpdate,
        thumbnail: Option<&Path>,
    ) -> Result<Video> {
        if update.is_noop() && thumbnail.is_none() {
            return Err(CoreError::bad_request("No update fields provided"));
        }

        let mut record = self.load(video).await?;
        if !record.is_owned_by(requester) {
            return Err(CoreError::unauthorized(OWNER_ONLY));
        }

        update.title.apply_text(&mut record.title).map_err(|reason| {
            CoreError::bad_request(format!("title {reason}"))
        })?;
        update
            .description
            .apply_text(&mut record.description)
            .map_err(|reason| {
                CoreError::bad_request(format!("description {reason}"))
            })?;
        record.touch();

        match thumbnail {
            Some(path) => {
                let catalog = Arc::clone(&self.catalog);
                self.sync
                    .replace_slot(
                        &mut record,
                        AssetSlot::Thumbnail,
                        Some(path),
                        move |next: Video| async move {
                            catalog.update_video(&next).await
                        },
                    )
                    .await?;
            }
            None => self.catalog.update_video(&record).await?,
        }

        tracing::info!(video = %record.id, "video updated");
        Ok(record)
    }

    /// Retire both assets, then delete the record.
    ///
    /// Retire failures are collected and returned, not fatal: the record
    /// deletion proceeds and the failures are surfaced for observability.
    pub async fn delete(
        &self,
        video: VideoId,
        requester: PrincipalId,
    ) -> Result<Vec<RetireFailure>> {
        let record = self.load(video).await?;
        if !record.is_owned_by(requester) {
            return Err(CoreError::unauthorized(OWNER_ONLY));
        }

        let failures = self.sync.retire_all(record.all_asset_refs()).await;
        self.catalog.delete_video(record.id).await?;

        tracing::info!(
            video = %record.id,
            orphaned = failures.len(),
            "video deleted"
        );
        Ok(failures)
    }

    /// Flip the publish flag.
    pub async fn toggle_publish(
        &self,
        video: VideoId,
        requester: PrincipalId,
    ) -> Result<Video> {
        let mut record = self.load(video).await?;
        if !record.is_owned_by(requester) {
            return Err(CoreError::unauthorized(OWNER_ONLY));
        }

        record.is_published = !record.is_published;
        record.touch();
        self.catalog.update_video(&record).await?;

        tracing::info!(
            video = %record.id,
            published = record.is_published,
            "publish flag toggled"
        );
        Ok(record)
    }

    async fn load(&self, video: VideoId) -> Result<Video> {
        self.catalog
            .find_video(video)
            .await?
            .ok_or_else(|| CoreError::not_found("Video not found"))
    }
}
