//! Account registration and profile maintenance.

use std::path::Path;
use std::sync::Arc;

use clipforge_model::{
    AccountUpdate, AssetSlot, NewPrincipal, Principal, PrincipalId,
    PrincipalView,
};

use crate::auth::crypto::PasswordCrypto;
use crate::error::{CoreError, Result};
use crate::ports::{SaveOptions, UserDirectory};
use crate::sync::AssetSyncCoordinator;

/// Fields supplied at registration, password still in plaintext.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<()> {
        let fields = [
            &self.username,
            &self.email,
            &self.full_name,
            &self.password,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(CoreError::bad_request("All fields are required"));
        }
        Ok(())
    }
}

/// Registration, profile reads, and profile/media updates for principals.
pub struct AccountService {
    directory: Arc<dyn UserDirectory>,
    crypto: Arc<PasswordCrypto>,
    sync: AssetSyncCoordinator,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish()
    }
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        crypto: Arc<PasswordCrypto>,
        sync: AssetSyncCoordinator,
    ) -> Self {
        AccountService {
            directory,
            crypto,
            sync,
        }
    }

    /// Create a principal with a required avatar and optional cover image.
    ///
    /// No tokens are issued here; login is a separate step. Uploads staged
    /// before a duplicate slips through the race between the pre-check and
    /// the insert are left to the store (same recoverable-orphan class as a
    /// failed commit).
    pub async fn register(
        &self,
        request: RegisterRequest,
        avatar: Option<&Path>,
        cover: Option<&Path>,
    ) -> Result<PrincipalView> {
        request.validate()?;
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        for identifier in [username.as_str(), email.as_str()] {
            if self
                .directory
                .find_by_identifier(identifier)
                .await?
                .is_some()
            {
                return Err(CoreError::conflict(
                    "User with email or username already exists",
                ));
            }
        }

        let avatar = self.sync.stage(avatar, AssetSlot::Avatar).await?;
        let cover_image = match cover {
            Some(path) => {
                Some(self.sync.stage(Some(path), AssetSlot::Cover).await?)
            }
            None => None,
        };

        let password_hash = self
            .crypto
            .hash_password(&request.password)
            .map_err(|err| {
                CoreError::internal(format!("credential hashing failed: {err}"))
            })?;

        let principal = Principal::new(NewPrincipal {
            username,
            email,
            full_name: request.full_name.trim().to_string(),
            password_hash,
            avatar,
            cover_image,
        });
        self.directory.create(&principal).await?;

        tracing::info!(principal = %principal.id, "account registered");
        Ok(principal.sanitized())
    }

    /// Sanitized view of an existing principal.
    pub async fn current_user(
        &self,
        principal: PrincipalId,
    ) -> Result<PrincipalView> {
        let record = self
            .directory
            .find_by_id(principal)
            .await?
            .ok_or_else(|| CoreError::not_found("User doesn't exist"))?;
        Ok(record.sanitized())
    }

    /// Apply a tri-state patch to the profile fields.
    pub async fn update_account(
        &self,
        principal: PrincipalId,
        update: AccountUpdate,
    ) -> Result<PrincipalView> {
        if update.is_noop() {
            return Err(CoreError::bad_request("No update fields provided"));
        }

        let mut record = self
            .directory
            .find_by_id(principal)
            .await?
            .ok_or_else(|| CoreError::not_found("User doesn't exist"))?;

        update
            .username
            .apply_text(&mut record.username)
            .map_err(|reason| {
                CoreError::bad_request(format!("username {reason}"))
            })?;
        update.email.apply_text(&mut record.email).map_err(|reason| {
            CoreError::bad_request(format!("email {reason}"))
        })?;
        update
            .full_name
            .apply_text(&mut record.full_name)
            .map_err(|reason| {
                CoreError::bad_request(format!("full name {reason}"))
            })?;
        record.touch();

        self.directory
            .save(&record, SaveOptions::default())
            .await?;
        tracing::info!(principal = %record.id, "account details updated");
        Ok(record.sanitized())
    }

    /// Replace the avatar through the asset sync protocol.
    pub async fn update_avatar(
        &self,
        principal: PrincipalId,
        upload: Option<&Path>,
    ) -> Result<PrincipalView> {
        self.replace_media(principal, AssetSlot::Avatar, upload).await
    }

    /// Replace the cover image through the asset sync protocol.
    pub async fn update_cover(
        &self,
        principal: PrincipalId,
        upload: Option<&Path>,
    ) -> Result<PrincipalView> {
        self.replace_media(principal, AssetSlot::Cover, upload).await
    }

    async fn replace_media(
        &self,
        principal: PrincipalId,
        slot: AssetSlot,
        upload: Option<&Path>,
    ) -> Result<PrincipalView> {
        let mut record = self
            .directory
            .find_by_id(principal)
            .await?
            .ok_or_else(|| CoreError::not_found("User doesn't exist"))?;
        record.touch();

        let directory = Arc::clone(&self.directory);
        self.sync
            .replace_slot(&mut record, slot, upload, move |next: Principal| {
                async move {
                    directory.save(&next, SaveOptions::default()).await
                }
            })
            .await?;

        Ok(record.sanitized())
    }
}
