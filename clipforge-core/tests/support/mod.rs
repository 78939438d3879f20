//! Shared in-memory backends and service harness for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use clipforge_core::account::{AccountService, RegisterRequest};
use clipforge_core::auth::{PasswordCrypto, SessionService, TokenCodec};
use clipforge_core::catalog::VideoService;
use clipforge_core::config::SessionPolicy;
use clipforge_core::error::{CoreError, Result};
use clipforge_core::ports::{
    ContentCatalog, ObjectStore, SaveOptions, StoreError, StoredObject,
    UserDirectory,
};
use clipforge_core::sync::AssetSyncCoordinator;
use clipforge_model::{
    MediaKind, Principal, PrincipalId, PrincipalView, Video, VideoDraft,
    VideoId,
};

pub const TEST_PASSWORD: &str = "CorrectHorseBattery1!";
pub const TEST_ACCESS_SECRET: &[u8] = b"test-access-secret";
pub const TEST_REFRESH_SECRET: &[u8] = b"test-refresh-secret";
/// Duration the fake store reports for every video upload.
pub const TEST_VIDEO_DURATION: f64 = 42.5;

/// In-memory `UserDirectory` with the same conflict and swap semantics as
/// the Postgres adapter.
#[derive(Default)]
pub struct MemoryDirectory {
    records: Mutex<HashMap<PrincipalId, Principal>>,
}

impl MemoryDirectory {
    pub fn insert(&self, principal: Principal) {
        self.records
            .lock()
            .unwrap()
            .insert(principal.id, principal);
    }

    pub fn get(&self, id: PrincipalId) -> Option<Principal> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn stored_refresh_token(&self, id: PrincipalId) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|p| p.refresh_token.clone())
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .find(|p| p.username == identifier || p.email == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, principal: &Principal) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if records.values().any(|p| p.username == principal.username) {
            return Err(CoreError::conflict("Username already exists"));
        }
        if records.values().any(|p| p.email == principal.email) {
            return Err(CoreError::conflict("Email already exists"));
        }
        records.insert(principal.id, principal.clone());
        Ok(())
    }

    async fn save(
        &self,
        principal: &Principal,
        _opts: SaveOptions,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&principal.id) {
            return Err(CoreError::not_found("User not found"));
        }
        let others =
            records.values().filter(|other| other.id != principal.id);
        for other in others {
            if other.username == principal.username {
                return Err(CoreError::conflict("Username already exists"));
            }
            if other.email == principal.email {
                return Err(CoreError::conflict("Email already exists"));
            }
        }
        records.insert(principal.id, principal.clone());
        Ok(())
    }

    async fn clear_refresh_token(&self, id: PrincipalId) -> Result<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.refresh_token = None;
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        id: PrincipalId,
        expected: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(false);
        };
        if record.refresh_token.as_deref() == expected {
            record.refresh_token = next.map(str::to_string);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-memory `ContentCatalog` that counts record writes.
#[derive(Default)]
pub struct MemoryCatalog {
    records: Mutex<HashMap<VideoId, Video>>,
    update_calls: AtomicUsize,
}

impl MemoryCatalog {
    pub fn get(&self, id: VideoId) -> Option<Video> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    /// Number of `update_video` calls so far.
    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentCatalog for MemoryCatalog {
    async fn find_video(&self, id: VideoId) -> Result<Option<Video>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn create_video(&self, video: &Video) -> Result<()> {
        self.records.lock().unwrap().insert(video.id, video.clone());
        Ok(())
    }

    async fn update_video(&self, video: &Video) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&video.id) {
            return Err(CoreError::not_found("Video not found"));
        }
        records.insert(video.id, video.clone());
        Ok(())
    }

    async fn delete_video(&self, id: VideoId) -> Result<()> {
        if self.records.lock().unwrap().remove(&id).is_none() {
            return Err(CoreError::not_found("Video not found"));
        }
        Ok(())
    }
}

/// One remote-store interaction, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Stored(String),
    Retired(String),
}

/// Fake `ObjectStore` that records every interaction and can be primed to
/// fail in the ways the sync protocol must tolerate.
pub struct RecordingStore {
    serial: AtomicUsize,
    events: Mutex<Vec<StoreEvent>>,
    fail_next_store: AtomicBool,
    unusable_next_store: AtomicBool,
    failing_retires: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        RecordingStore {
            serial: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            fail_next_store: AtomicBool::new(false),
            unusable_next_store: AtomicBool::new(false),
            failing_retires: Mutex::new(HashSet::new()),
        }
    }

    /// Reject the next upload outright.
    pub fn fail_next_store(&self) {
        self.fail_next_store.store(true, Ordering::SeqCst);
    }

    /// Accept the next upload but hand back a reference the record layer
    /// must refuse to commit.
    pub fn yield_unusable_next_store(&self) {
        self.unusable_next_store.store(true, Ordering::SeqCst);
    }

    /// Make every retire of this URL fail.
    pub fn fail_retire_of(&self, url: &str) {
        self.failing_retires.lock().unwrap().insert(url.to_string());
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    /// URLs successfully retired, in order. Failed attempts do not count.
    pub fn retired_urls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::Retired(url) => Some(url),
                StoreEvent::Stored(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn store(
        &self,
        _local_path: &Path,
        kind: MediaKind,
    ) -> std::result::Result<StoredObject, StoreError> {
        if self.fail_next_store.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 500,
                message: "simulated outage".to_string(),
            });
        }

        let url = if self.unusable_next_store.swap(false, Ordering::SeqCst) {
            "/missing-host/object".to_string()
        } else {
            let n = self.serial.fetch_add(1, Ordering::SeqCst);
            format!("https://objects.test/{kind}/obj-{n}")
        };
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Stored(url.clone()));

        let duration_secs = match kind {
            MediaKind::Video => Some(TEST_VIDEO_DURATION),
            MediaKind::Image => None,
        };
        Ok(StoredObject { url, duration_secs })
    }

    async fn retire(
        &self,
        url: &str,
        _kind: MediaKind,
    ) -> std::result::Result<(), StoreError> {
        if self.failing_retires.lock().unwrap().contains(url) {
            return Err(StoreError::Transport(
                "simulated retire failure".to_string(),
            ));
        }
        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Retired(url.to_string()));
        Ok(())
    }
}

/// End-to-end service harness over in-memory backends.
pub struct Harness {
    pub directory: Arc<MemoryDirectory>,
    pub catalog: Arc<MemoryCatalog>,
    pub store: Arc<RecordingStore>,
    pub crypto: Arc<PasswordCrypto>,
    pub sessions: SessionService,
    pub accounts: AccountService,
    pub videos: VideoService,
}

pub fn harness() -> Harness {
    harness_with_policy(SessionPolicy::default())
}

pub fn harness_with_policy(policy: SessionPolicy) -> Harness {
    init_tracing();

    let directory = Arc::new(MemoryDirectory::default());
    let catalog = Arc::new(MemoryCatalog::default());
    let store = Arc::new(RecordingStore::new());

    let crypto = Arc::new(
        PasswordCrypto::with_params("test-pepper", fast_params()).unwrap(),
    );
    let codec = TokenCodec::from_secrets(
        TEST_ACCESS_SECRET,
        TEST_REFRESH_SECRET,
        900,
        864_000,
    );
    let sync =
        AssetSyncCoordinator::new(Arc::clone(&store) as Arc<dyn ObjectStore>);

    let sessions = SessionService::new(
        Arc::clone(&directory) as Arc<dyn UserDirectory>,
        Arc::clone(&crypto),
        codec,
        policy,
    );
    let accounts = AccountService::new(
        Arc::clone(&directory) as Arc<dyn UserDirectory>,
        Arc::clone(&crypto),
        sync.clone(),
    );
    let videos = VideoService::new(
        Arc::clone(&catalog) as Arc<dyn ContentCatalog>,
        sync,
    );

    Harness {
        directory,
        catalog,
        store,
        crypto,
        sessions,
        accounts,
        videos,
    }
}

fn fast_params() -> argon2::Params {
    argon2::ParamsBuilder::new()
        .m_cost(8)
        .t_cost(1)
        .p_cost(1)
        .output_len(32)
        .build()
        .unwrap()
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write bytes to a named temp file that lives until dropped.
pub fn temp_upload(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

/// Register a principal through the account service, avatar included.
pub async fn register_principal(
    harness: &Harness,
    username: &str,
    email: &str,
) -> PrincipalView {
    let avatar = temp_upload(b"avatar-bytes");
    harness
        .accounts
        .register(
            RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                full_name: "Test User".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
            Some(avatar.path()),
            None,
        )
        .await
        .unwrap()
}

/// Publish a video with both uploads through the catalog service.
pub async fn publish_video(harness: &Harness, owner: PrincipalId) -> Video {
    let file = temp_upload(b"video-bytes");
    let thumbnail = temp_upload(b"thumb-bytes");
    harness
        .videos
        .publish(
            owner,
            VideoDraft {
                title: "First upload".to_string(),
                description: "A test clip".to_string(),
            },
            Some(file.path()),
            Some(thumbnail.path()),
        )
        .await
        .unwrap()
}
