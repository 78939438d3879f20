//! Session credential lifecycle.
//!
//! Per principal the states are `Anonymous -> Authenticated` (login),
//! `Authenticated -> Anonymous` (logout), and `Authenticated ->
//! Authenticated` (rotation: same state, new token value). The persisted
//! refresh-token slot is the whole revocation mechanism: a refresh token is
//! live only while it equals that slot, so rotation and logout kill a stolen
//! copy without any blocklist.

use std::sync::Arc;

use constant_time_eq::constant_time_eq;

use clipforge_model::{PrincipalId, PrincipalView};

use crate::auth::crypto::{CryptoError, PasswordCrypto};
use crate::auth::token::{CodecError, TokenClass, TokenCodec, TokenPair};
use crate::config::SessionPolicy;
use crate::error::{CoreError, Result};
use crate::ports::{SaveOptions, UserDirectory};

/// Cookie name carrying the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie name carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Stable message for every refresh verification failure past the
/// missing-token check. Expired, forged, unknown subject, and superseded
/// tokens are indistinguishable to the caller.
const STALE_REFRESH: &str = "Refresh Token is expired or invalid";

/// Cookie attributes handed to the transport edge.
///
/// The edge sets these verbatim; tokens always travel `HttpOnly` + `Secure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: &'static str,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
}

impl CookieSpec {
    /// Both session cookies for a freshly issued pair.
    pub fn session_pair(tokens: &TokenPair) -> [CookieSpec; 2] {
        [
            CookieSpec {
                name: ACCESS_COOKIE,
                value: tokens.access.clone(),
                http_only: true,
                secure: true,
            },
            CookieSpec {
                name: REFRESH_COOKIE,
                value: tokens.refresh.clone(),
                http_only: true,
                secure: true,
            },
        ]
    }
}

/// Successful login: sanitized principal plus both tokens.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: PrincipalView,
    pub tokens: TokenPair,
}

impl LoginOutcome {
    pub fn cookies(&self) -> [CookieSpec; 2] {
        CookieSpec::session_pair(&self.tokens)
    }
}

/// Orchestrates login, logout, refresh rotation, and password changes.
pub struct SessionService {
    directory: Arc<dyn UserDirectory>,
    crypto: Arc<PasswordCrypto>,
    codec: TokenCodec,
    policy: SessionPolicy,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("policy", &self.policy)
            .finish()
    }
}

impl SessionService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        crypto: Arc<PasswordCrypto>,
        codec: TokenCodec,
        policy: SessionPolicy,
    ) -> Self {
        SessionService {
            directory,
            crypto,
            codec,
            policy,
        }
    }

    /// Resolve the principal by username or email, verify the password, and
    /// open a session.
    ///
    /// Exactly one refresh-token write happens; the returned refresh token
    /// equals the persisted value.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CoreError::bad_request(
                "username or email is required",
            ));
        }

        let mut principal = self
            .directory
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| CoreError::not_found("User doesn't exist"))?;

        let valid = self
            .crypto
            .verify_password(password, &principal.password_hash)
            .map_err(map_crypto_error)?;
        if !valid {
            return Err(CoreError::unauthorized("Invalid password"));
        }

        let tokens = self
            .codec
            .issue_pair(principal.id.to_uuid())
            .map_err(map_issue_error)?;
        principal.refresh_token = Some(tokens.refresh.clone());
        principal.touch();
        self.directory
            .save(&principal, SaveOptions {
                skip_validation: true,
            })
            .await?;

        tracing::info!(principal = %principal.id, "session opened");
        Ok(LoginOutcome {
            principal: principal.sanitized(),
            tokens,
        })
    }

    /// Clear the persisted refresh token. Idempotent: a second logout, or a
    /// logout with no live session, succeeds with the same observable state.
    pub async fn logout(&self, principal: PrincipalId) -> Result<()> {
        self.directory.clear_refresh_token(principal).await?;
        tracing::info!(principal = %principal, "session closed");
        Ok(())
    }

    /// Rotate a refresh token into a new token pair.
    ///
    /// Every inner failure (codec error of any class, unknown subject,
    /// value mismatch against the stored token, lost rotation race) is
    /// `Unauthorized` with one stable message. The mismatch check is what
    /// turns a superseded-but-unexpired token into a dead one; the
    /// compare-and-swap overwrite closes the race between two concurrent
    /// rotations of the same token.
    pub async fn refresh_session(
        &self,
        presented: Option<&str>,
    ) -> Result<TokenPair> {
        let presented = presented
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CoreError::unauthorized("Unauthorized request"))?;

        let claims = self
            .codec
            .verify(presented, TokenClass::Refresh)
            .map_err(|_: CodecError| CoreError::unauthorized(STALE_REFRESH))?;

        let principal = self
            .directory
            .find_by_id(PrincipalId::from(claims.sub))
            .await?
            .ok_or_else(|| CoreError::unauthorized(STALE_REFRESH))?;

        let stored = principal
            .refresh_token
            .as_deref()
            .ok_or_else(|| CoreError::unauthorized(STALE_REFRESH))?;
        if !token_matches(presented, stored) {
            tracing::warn!(
                principal = %principal.id,
                "superseded refresh token presented"
            );
            return Err(CoreError::unauthorized(STALE_REFRESH));
        }

        let tokens = self
            .codec
            .issue_pair(principal.id.to_uuid())
            .map_err(map_issue_error)?;
        let swapped = self
            .directory
            .swap_refresh_token(
                principal.id,
                Some(presented),
                Some(&tokens.refresh),
            )
            .await?;
        if !swapped {
            tracing::warn!(
                principal = %principal.id,
                "refresh rotation lost a concurrent race"
            );
            return Err(CoreError::unauthorized(STALE_REFRESH));
        }

        tracing::info!(principal = %principal.id, "session tokens rotated");
        Ok(tokens)
    }

    /// Verify the old password and store a new credential hash.
    ///
    /// Whether the live refresh token survives is a [`SessionPolicy`]
    /// decision; the default clears it in the same record write.
    pub async fn change_password(
        &self,
        principal: PrincipalId,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if new_password.is_empty() {
            return Err(CoreError::bad_request("new password is required"));
        }

        let mut record = self
            .directory
            .find_by_id(principal)
            .await?
            .ok_or_else(|| CoreError::not_found("User doesn't exist"))?;

        let valid = self
            .crypto
            .verify_password(old_password, &record.password_hash)
            .map_err(map_crypto_error)?;
        if !valid {
            return Err(CoreError::unauthorized("Wrong Password Entered"));
        }

        record.password_hash = self
            .crypto
            .hash_password(new_password)
            .map_err(map_crypto_error)?;
        if self.policy.revoke_sessions_on_password_change {
            record.refresh_token = None;
        }
        record.touch();
        self.directory
            .save(&record, SaveOptions {
                skip_validation: true,
            })
            .await?;

        tracing::info!(
            principal = %principal,
            revoked = self.policy.revoke_sessions_on_password_change,
            "password changed"
        );
        Ok(())
    }
}

/// Byte-for-byte token comparison without early exit on content.
fn token_matches(presented: &str, stored: &str) -> bool {
    let presented = presented.as_bytes();
    let stored = stored.as_bytes();
    if presented.len() != stored.len() {
        return false;
    }
    constant_time_eq(presented, stored)
}

fn map_crypto_error(err: CryptoError) -> CoreError {
    CoreError::internal(format!("credential hashing failed: {err}"))
}

fn map_issue_error(err: CodecError) -> CoreError {
    CoreError::internal(format!("token issuance failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_match_requires_exact_bytes() {
        assert!(token_matches("abc.def.ghi", "abc.def.ghi"));
        assert!(!token_matches("abc.def.ghi", "abc.def.ghj"));
        assert!(!token_matches("abc", "abcd"));
        assert!(!token_matches("", "abcd"));
    }

    #[test]
    fn session_cookies_are_locked_down() {
        let tokens = TokenPair {
            access: "a-token".to_string(),
            refresh: "r-token".to_string(),
        };
        let cookies = CookieSpec::session_pair(&tokens);
        assert_eq!(cookies[0].name, ACCESS_COOKIE);
        assert_eq!(cookies[1].name, REFRESH_COOKIE);
        for cookie in &cookies {
            assert!(cookie.http_only);
            assert!(cookie.secure);
        }
    }
}
