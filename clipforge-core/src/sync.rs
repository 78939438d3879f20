//! Media asset synchronization.
//!
//! Moving a user-supplied file into the remote store and onto a record runs
//! through one protocol: upload, validate the returned reference, commit the
//! new reference to the owning record, and only then retire the superseded
//! object. The ordering guarantees a record is never observed pointing at a
//! retired object; the worst partial-failure outcome is an orphaned remote
//! object, never a broken reference.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use clipforge_model::{AssetRef, AssetSlot, MediaOwner};

use crate::error::{CoreError, Result};
use crate::ports::{ObjectStore, StoreError};

/// What happened to the superseded reference after a successful commit.
#[derive(Debug)]
pub enum RetireOutcome {
    /// Initial creation, no prior asset existed.
    NothingToRetire,
    /// The old object was deleted from the store.
    Retired(AssetRef),
    /// The delete failed; the old object stays orphaned in the store. The
    /// replace still succeeded, the record already points at the new object.
    Failed {
        reference: AssetRef,
        error: StoreError,
    },
}

impl RetireOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RetireOutcome::Failed { .. })
    }
}

/// Receipt for a completed slot replacement.
#[derive(Debug)]
pub struct SwapReceipt {
    /// Reference now committed on the record.
    pub committed: AssetRef,
    /// Fate of the previous reference.
    pub retired: RetireOutcome,
}

/// One failed retire from a bulk retirement.
#[derive(Debug)]
pub struct RetireFailure {
    pub slot: AssetSlot,
    pub reference: AssetRef,
    pub error: StoreError,
}

/// Orchestrates store-then-commit-then-retire for media slots.
#[derive(Clone)]
pub struct AssetSyncCoordinator {
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for AssetSyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSyncCoordinator").finish()
    }
}

impl AssetSyncCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        AssetSyncCoordinator { store }
    }

    /// Upload a staging file and validate the returned reference.
    ///
    /// This is the creation-path entry point and the first half of
    /// [`AssetSyncCoordinator::replace_slot`]. Nothing is committed here; on
    /// failure the caller's record is untouched. A reference that fails
    /// usability validation is best-effort retired before the error returns,
    /// so the store does not keep an object nothing will ever point at.
    pub async fn stage(
        &self,
        upload: Option<&Path>,
        slot: AssetSlot,
    ) -> Result<AssetRef> {
        let path = upload.ok_or_else(|| {
            CoreError::bad_request(format!("{} file is required", slot.label()))
        })?;

        let stored =
            self.store.store(path, slot.kind()).await.map_err(|err| {
                tracing::warn!(
                    slot = slot.as_str(),
                    error = %err,
                    "store upload failed"
                );
                CoreError::upload_failed(format!(
                    "Error while uploading {}",
                    slot.label()
                ))
            })?;

        match AssetRef::new(stored.url.clone(), slot.kind(), stored.duration_secs)
        {
            Ok(reference) => Ok(reference),
            Err(err) => {
                tracing::warn!(
                    slot = slot.as_str(),
                    error = %err,
                    "store returned an unusable reference"
                );
                self.retire_raw(&stored.url, slot).await;
                Err(CoreError::upload_failed(format!(
                    "Error while uploading {}",
                    slot.label()
                )))
            }
        }
    }

    /// Replace `slot` on `owner` with a newly uploaded asset.
    ///
    /// `persist` performs the single record write that commits the new
    /// reference; it runs exactly once, after the upload succeeded and before
    /// the old reference is retired. When `persist` fails, the record keeps
    /// its old reference and the uploaded object stays unreferenced in the
    /// store (recoverable, not auto-healed). A failed retire is reported on
    /// the receipt and logged, never propagated: the record is already
    /// correct.
    pub async fn replace_slot<O, F, Fut>(
        &self,
        owner: &mut O,
        slot: AssetSlot,
        upload: Option<&Path>,
        persist: F,
    ) -> Result<SwapReceipt>
    where
        O: MediaOwner + Clone + Send,
        F: FnOnce(O) -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        let staged = self.stage(upload, slot).await?;

        let mut next = owner.clone();
        let previous = next.replace_asset_ref(slot, staged.clone());
        if next.asset_ref(slot) != Some(&staged) {
            return Err(CoreError::internal(format!(
                "record does not carry the {} slot",
                slot.as_str()
            )));
        }

        persist(next.clone()).await?;
        *owner = next;
        tracing::info!(
            slot = slot.as_str(),
            url = staged.url(),
            "committed new asset reference"
        );

        let retired = self.settle(slot, previous).await;
        Ok(SwapReceipt {
            committed: staged,
            retired,
        })
    }

    /// Retire every given reference, collecting partial failures.
    ///
    /// Used when an owning record is deleted: all its assets are retired
    /// first, failures are logged and returned so the caller can surface
    /// them, and the record deletion proceeds regardless.
    pub async fn retire_all(
        &self,
        refs: Vec<(AssetSlot, AssetRef)>,
    ) -> Vec<RetireFailure> {
        let attempts = refs.into_iter().map(|(slot, reference)| {
            let store = Arc::clone(&self.store);
            async move {
                match store.retire(reference.url(), reference.kind()).await {
                    Ok(()) => None,
                    Err(error) => Some(RetireFailure {
                        slot,
                        reference,
                        error,
                    }),
                }
            }
        });

        let failures: Vec<RetireFailure> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .flatten()
            .collect();

        for failure in &failures {
            tracing::warn!(
                slot = failure.slot.as_str(),
                url = failure.reference.url(),
                error = %failure.error,
                "retire failed during bulk retirement; object orphaned"
            );
        }
        failures
    }

    async fn settle(
        &self,
        slot: AssetSlot,
        previous: Option<AssetRef>,
    ) -> RetireOutcome {
        let Some(old) = previous else {
            return RetireOutcome::NothingToRetire;
        };

        match self.store.retire(old.url(), old.kind()).await {
            Ok(()) => {
                tracing::debug!(
                    slot = slot.as_str(),
                    url = old.url(),
                    "retired superseded asset"
                );
                RetireOutcome::Retired(old)
            }
            Err(error) => {
                tracing::warn!(
                    slot = slot.as_str(),
                    url = old.url(),
                    error = %error,
                    "retire failed; superseded object orphaned"
                );
                RetireOutcome::Failed {
                    reference: old,
                    error,
                }
            }
        }
    }

    /// Best-effort retire of a reference that never became an `AssetRef`.
    async fn retire_raw(&self, url: &str, slot: AssetSlot) {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Err(error) = self.store.retire(trimmed, slot.kind()).await {
            tracing::warn!(
                slot = slot.as_str(),
                url = trimmed,
                error = %error,
                "could not retire unusable reference; object orphaned"
            );
        }
    }
}
