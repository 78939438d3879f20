use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use clipforge_model::MediaKind;

/// Raw upload result from the remote store, before usability checks.
///
/// The sync coordinator turns this into an `AssetRef` or rejects it; adapters
/// report exactly what the store said.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    /// Playback length in seconds, reported for video objects.
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read upload staging file: {0}")]
    Io(#[from] std::io::Error),

    #[error("store transport error: {0}")]
    Transport(String),

    #[error("store rejected the request: {status} {message}")]
    Rejected { status: u16, message: String },
}

// Durable object storage for user media
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local staging file, returning the durable reference.
    async fn store(
        &self,
        local_path: &Path,
        kind: MediaKind,
    ) -> std::result::Result<StoredObject, StoreError>;

    /// Permanently delete a stored object by reference.
    async fn retire(
        &self,
        url: &str,
        kind: MediaKind,
    ) -> std::result::Result<(), StoreError>;
}
