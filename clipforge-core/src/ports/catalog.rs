use async_trait::async_trait;

use clipforge_model::{Video, VideoId};

use crate::error::Result;

// Video record storage with ownership and publish flags
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn find_video(&self, id: VideoId) -> Result<Option<Video>>;

    async fn create_video(&self, video: &Video) -> Result<()>;

    /// Persist the mutable fields of an existing record.
    async fn update_video(&self, video: &Video) -> Result<()>;

    /// Remove the record. The caller retires the record's assets first.
    async fn delete_video(&self, id: VideoId) -> Result<()>;
}
