//! Environment-backed configuration.

use std::env;

use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Core configuration loaded via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database settings
    pub database_url: Option<String>,

    // Remote object store settings
    pub store: StoreConfig,

    // Session and credential settings
    pub auth: AuthConfig,
}

/// Remote object store endpoint settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the object store HTTP API.
    pub endpoint: Url,
    /// Bearer credential for the store API, if it requires one.
    pub api_key: Option<String>,
}

/// Token secrets, lifetimes, and session policy.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signing secret for access tokens (minutes-scale lifetime).
    pub access_token_secret: Zeroizing<String>,
    /// Signing secret for refresh tokens; must differ from the access secret.
    pub refresh_token_secret: Zeroizing<String>,
    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,
    /// Server-side pepper mixed into password hashing.
    pub password_pepper: Zeroizing<String>,
    /// Session policy knobs.
    pub policy: SessionPolicy,
}

/// Explicit policy decisions around session handling.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Clear the live refresh token when the password changes, so a stolen
    /// refresh token does not survive a password reset.
    pub revoke_sessions_on_password_change: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        SessionPolicy {
            revoke_sessions_on_password_change: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let endpoint = env::var("OBJECT_STORE_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_string());
        let endpoint =
            Url::parse(&endpoint).map_err(|e| ConfigError::InvalidVar {
                name: "OBJECT_STORE_URL",
                reason: e.to_string(),
            })?;

        let auth = AuthConfig::from_env()?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            store: StoreConfig {
                endpoint,
                api_key: env::var("OBJECT_STORE_API_KEY").ok(),
            },
            auth,
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token_secret = Zeroizing::new(
            env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| "change-me-access-secret".to_string()),
        );
        let refresh_token_secret = Zeroizing::new(
            env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or_else(|_| "change-me-refresh-secret".to_string()),
        );
        if *access_token_secret == *refresh_token_secret {
            return Err(ConfigError::InvalidVar {
                name: "REFRESH_TOKEN_SECRET",
                reason: "must differ from ACCESS_TOKEN_SECRET".to_string(),
            });
        }

        Ok(Self {
            access_token_secret,
            refresh_token_secret,
            // 15 minutes
            access_token_ttl_secs: env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap_or(900),
            // 10 days
            refresh_token_ttl_secs: env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "864000".to_string())
                .parse()
                .unwrap_or(864_000),
            password_pepper: Zeroizing::new(
                env::var("AUTH_PASSWORD_PEPPER").unwrap_or_else(|_| {
                    "change-me-password-pepper".to_string()
                }),
            ),
            policy: SessionPolicy {
                revoke_sessions_on_password_change: !env::var(
                    "KEEP_SESSIONS_ON_PASSWORD_CHANGE",
                )
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            },
        })
    }
}
