use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Which of the two signing keys a token belongs to.
///
/// Access tokens ride on every request, so their secret is the most exposed;
/// it can never mint a refresh token. Refresh tokens use a distinct secret
/// and lifetime so rotation is independent of access cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Access,
    Refresh,
}

/// Signed claims carried by both token classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal the token was issued to.
    pub sub: Uuid,
    /// Expiry as a unix timestamp.
    pub exp: i64,
    /// Issue time as a unix timestamp.
    pub iat: i64,
    /// Random token id, so two tokens minted in the same second differ.
    pub jti: String,
}

/// Freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("token is expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature mismatch")]
    SignatureMismatch,
    #[error("token signing failed: {0}")]
    Signing(String),
}

struct KeySet {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeySet {
    fn new(secret: &[u8], ttl_secs: i64) -> Self {
        KeySet {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

/// Signs and verifies the two bearer-token classes.
pub struct TokenCodec {
    access: KeySet,
    refresh: KeySet,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(auth: &AuthConfig) -> Self {
        Self::from_secrets(
            auth.access_token_secret.as_bytes(),
            auth.refresh_token_secret.as_bytes(),
            auth.access_token_ttl_secs,
            auth.refresh_token_ttl_secs,
        )
    }

    /// Build a codec directly from secrets and lifetimes (in seconds).
    pub fn from_secrets(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        TokenCodec {
            access: KeySet::new(access_secret, access_ttl_secs),
            refresh: KeySet::new(refresh_secret, refresh_ttl_secs),
        }
    }

    /// Encode a short-lived access token for the principal.
    pub fn issue_access(&self, principal: Uuid) -> Result<String, CodecError> {
        self.issue(principal, TokenClass::Access)
    }

    /// Encode a long-lived refresh token for the principal.
    pub fn issue_refresh(&self, principal: Uuid) -> Result<String, CodecError> {
        self.issue(principal, TokenClass::Refresh)
    }

    /// Issue both classes at once.
    pub fn issue_pair(&self, principal: Uuid) -> Result<TokenPair, CodecError> {
        Ok(TokenPair {
            access: self.issue_access(principal)?,
            refresh: self.issue_refresh(principal)?,
        })
    }

    /// Decode and validate a token against one class's key and expiry.
    pub fn verify(
        &self,
        token: &str,
        class: TokenClass,
    ) -> Result<Claims, CodecError> {
        let keys = self.keys(class);
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => CodecError::Expired,
                ErrorKind::InvalidSignature => CodecError::SignatureMismatch,
                _ => CodecError::Malformed,
            })
    }

    /// Lifetime of tokens in the given class.
    pub fn ttl(&self, class: TokenClass) -> Duration {
        self.keys(class).ttl
    }

    fn issue(
        &self,
        principal: Uuid,
        class: TokenClass,
    ) -> Result<String, CodecError> {
        let keys = self.keys(class);
        let now = Utc::now();
        let claims = Claims {
            sub: principal,
            exp: (now + keys.ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|err| CodecError::Signing(err.to_string()))
    }

    fn keys(&self, class: TokenClass) -> &KeySet {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }
}
