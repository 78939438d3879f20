//! Registered user identity records.
//!
//! A [`Principal`] carries two credential fields that must never leave the
//! service boundary: the password hash and the currently live refresh-token
//! value. Every externally visible shape is a [`PrincipalView`].
//!
//! ## Session invariant
//!
//! At most one live refresh token exists per principal at any time. Login and
//! refresh each write a new value and atomically invalidate the prior one;
//! logout clears the slot. A refresh token is valid only while it equals the
//! stored value, regardless of its own expiry.

use chrono::{DateTime, Utc};

use crate::asset::{AssetRef, AssetSlot, MediaOwner};
use crate::ids::PrincipalId;

/// A registered user identity record.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Principal {
    /// Unique principal identifier
    pub id: PrincipalId,
    /// Unique login name
    pub username: String,
    /// Unique contact address, usable as a login identifier
    pub email: String,
    /// Display name shown on the channel
    pub full_name: String,
    /// Argon2id credential digest, never exposed
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub password_hash: String,
    /// Value of the single live refresh token; `None` means no active session
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub refresh_token: Option<String>,
    /// Profile image, required at registration
    pub avatar: AssetRef,
    /// Channel banner, optional
    pub cover_image: Option<AssetRef>,
    /// Timestamp of account creation
    pub created_at: DateTime<Utc>,
    /// Timestamp of last record update
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a principal.
///
/// The password arrives already hashed; plaintext never reaches the record.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: AssetRef,
    pub cover_image: Option<AssetRef>,
}

impl Principal {
    /// Builds a fresh record with a new id and current timestamps.
    pub fn new(fields: NewPrincipal) -> Self {
        let now = Utc::now();
        Principal {
            id: PrincipalId::new(),
            username: fields.username,
            email: fields.email,
            full_name: fields.full_name,
            password_hash: fields.password_hash,
            refresh_token: None,
            avatar: fields.avatar,
            cover_image: fields.cover_image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as just updated.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// The externally visible shape, credential fields excluded.
    pub fn sanitized(&self) -> PrincipalView {
        PrincipalView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
            cover_image: self.cover_image.clone(),
            created_at: self.created_at,
        }
    }
}

impl MediaOwner for Principal {
    fn slots(&self) -> &'static [AssetSlot] {
        &[AssetSlot::Avatar, AssetSlot::Cover]
    }

    fn asset_ref(&self, slot: AssetSlot) -> Option<&AssetRef> {
        match slot {
            AssetSlot::Avatar => Some(&self.avatar),
            AssetSlot::Cover => self.cover_image.as_ref(),
            _ => None,
        }
    }

    fn replace_asset_ref(
        &mut self,
        slot: AssetSlot,
        reference: AssetRef,
    ) -> Option<AssetRef> {
        match slot {
            AssetSlot::Avatar => {
                Some(std::mem::replace(&mut self.avatar, reference))
            }
            AssetSlot::Cover => self.cover_image.replace(reference),
            _ => None,
        }
    }
}

/// Sanitized principal shape returned to callers.
///
/// Excludes the password hash and refresh token by construction rather than
/// by serializer attribute, so a future field cannot leak by omission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrincipalView {
    pub id: PrincipalId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: AssetRef,
    pub cover_image: Option<AssetRef>,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        principal.sanitized()
    }
}
