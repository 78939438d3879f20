//! HTTP adapter for the remote object store.
//!
//! Speaks a small multipart API: `POST v1/objects` uploads a file and
//! returns the durable URL (plus a measured duration for videos), and
//! `DELETE v1/objects` retires a stored object by URL.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use clipforge_model::MediaKind;

use crate::config::StoreConfig;
use crate::ports::{ObjectStore, StoreError, StoredObject};

/// What the store reports back for a completed upload.
#[derive(Debug, serde::Deserialize)]
struct UploadResponse {
    url: String,
    /// Playback length in seconds, present for video objects.
    duration: Option<f64>,
}

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpObjectStore")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpObjectStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn objects_url(&self) -> Result<Url, StoreError> {
        self.endpoint.join("v1/objects").map_err(|e| {
            StoreError::Transport(format!("invalid store endpoint: {e}"))
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn store(
        &self,
        local_path: &Path,
        kind: MediaKind,
    ) -> Result<StoredObject, StoreError> {
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(local_path).await?;

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("kind", kind.as_str());

        let response = self
            .authorize(self.client.post(self.objects_url()?).multipart(form))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response.json().await.map_err(|e| {
            StoreError::Transport(format!("unparsable store response: {e}"))
        })?;

        debug!(url = %upload.url, %kind, "object stored");
        Ok(StoredObject {
            url: upload.url,
            duration_secs: upload.duration,
        })
    }

    async fn retire(
        &self,
        url: &str,
        kind: MediaKind,
    ) -> Result<(), StoreError> {
        let response = self
            .authorize(
                self.client
                    .delete(self.objects_url()?)
                    .query(&[("kind", kind.as_str()), ("url", url)]),
            )
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        // An object that is already gone leaves the store in the requested
        // state; retiring stays idempotent.
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(%url, "object already absent");
            return Ok(());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!(%url, %kind, "object retired");
        Ok(())
    }
}
