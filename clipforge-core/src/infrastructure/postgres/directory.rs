use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use clipforge_model::{AssetRef, MediaKind, Principal, PrincipalId};

use crate::error::{CoreError, Result};
use crate::ports::{SaveOptions, UserDirectory};

const PRINCIPAL_COLUMNS: &str = "id, username, email, full_name, \
     password_hash, refresh_token, avatar_url, cover_url, created_at, \
     updated_at";

/// PostgreSQL-backed implementation of the `UserDirectory` port.
#[derive(Clone, Debug)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Flat row shape; asset references are rebuilt on the way out.
#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: PrincipalId,
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    refresh_token: Option<String>,
    avatar_url: String,
    cover_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = CoreError;

    fn try_from(row: PrincipalRow) -> Result<Self> {
        let avatar = AssetRef::new(row.avatar_url, MediaKind::Image, None)
            .map_err(|e| {
                CoreError::internal(format!(
                    "Corrupt avatar reference for {}: {}",
                    row.id, e
                ))
            })?;
        let cover_image = row
            .cover_url
            .map(|url| AssetRef::new(url, MediaKind::Image, None))
            .transpose()
            .map_err(|e| {
                CoreError::internal(format!(
                    "Corrupt cover reference for {}: {}",
                    row.id, e
                ))
            })?;

        Ok(Principal {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            refresh_token: row.refresh_token,
            avatar,
            cover_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Field-shape checks mirroring what the service layer enforces on input.
/// Skippable for credential-slot writes on records loaded from this table.
fn validate_record(principal: &Principal) -> Result<()> {
    if principal.username.trim().is_empty()
        || principal.email.trim().is_empty()
        || principal.full_name.trim().is_empty()
    {
        return Err(CoreError::bad_request(
            "principal record has empty required fields",
        ));
    }
    if !principal.email.contains('@') {
        return Err(CoreError::bad_request(
            "principal record has a malformed email",
        ));
    }
    Ok(())
}

fn map_unique_violation(e: sqlx::Error, context: &str) -> CoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.constraint() == Some("principals_username_key") {
            return CoreError::conflict("Username already exists");
        }
        if db_err.constraint() == Some("principals_email_key") {
            return CoreError::conflict("Email already exists");
        }
    }
    CoreError::internal(format!("{context}: {e}"))
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>> {
        let query = format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals \
             WHERE username = $1 OR email = $1"
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(identifier)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!(
                    "Failed to look up principal by identifier: {e}"
                ))
            })?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>> {
        let query = format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1"
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&query)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!(
                    "Failed to look up principal by id: {e}"
                ))
            })?;

        row.map(Principal::try_from).transpose()
    }

    async fn create(&self, principal: &Principal) -> Result<()> {
        validate_record(principal)?;

        sqlx::query(
            r#"
            INSERT INTO principals (
                id, username, email, full_name, password_hash,
                refresh_token, avatar_url, cover_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(principal.id)
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.full_name)
        .bind(&principal.password_hash)
        .bind(principal.refresh_token.as_deref())
        .bind(principal.avatar.url())
        .bind(principal.cover_image.as_ref().map(|r| r.url()))
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_unique_violation(e, "Failed to create principal"))?;

        info!("Created principal: {} ({})", principal.username, principal.id);
        Ok(())
    }

    async fn save(
        &self,
        principal: &Principal,
        opts: SaveOptions,
    ) -> Result<()> {
        if !opts.skip_validation {
            validate_record(principal)?;
        }

        let result = sqlx::query(
            r#"
            UPDATE principals
            SET username = $2, email = $3, full_name = $4,
                password_hash = $5, refresh_token = $6, avatar_url = $7,
                cover_url = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(principal.id)
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.full_name)
        .bind(&principal.password_hash)
        .bind(principal.refresh_token.as_deref())
        .bind(principal.avatar.url())
        .bind(principal.cover_image.as_ref().map(|r| r.url()))
        .bind(principal.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_unique_violation(e, "Failed to save principal"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User not found"));
        }
        Ok(())
    }

    async fn clear_refresh_token(&self, id: PrincipalId) -> Result<()> {
        // Zero rows affected is fine: clearing an absent record or an
        // already-empty slot both leave the world in the requested state.
        sqlx::query(
            "UPDATE principals SET refresh_token = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::internal(format!("Failed to clear refresh token: {e}"))
        })?;

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        id: PrincipalId,
        expected: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool> {
        // IS NOT DISTINCT FROM treats NULL as an ordinary comparable value,
        // so an empty slot can only swap against an expected `None`.
        let result = sqlx::query(
            "UPDATE principals SET refresh_token = $3, updated_at = NOW() \
             WHERE id = $1 AND refresh_token IS NOT DISTINCT FROM $2",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::internal(format!("Failed to swap refresh token: {e}"))
        })?;

        Ok(result.rows_affected() == 1)
    }
}
