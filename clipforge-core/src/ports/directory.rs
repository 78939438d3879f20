use async_trait::async_trait;

use clipforge_model::{Principal, PrincipalId};

use crate::error::Result;

/// Options for persisting a principal record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Skip application-level field validation. Schema constraints still
    /// apply; used for credential-slot writes on already-validated records.
    pub skip_validation: bool,
}

// Principal lookup, creation, and persistence (authentication-adjacent)
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a principal by username or email.
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Principal>>;

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>>;

    /// Persist a new record. A duplicate username or email is `Conflict`.
    async fn create(&self, principal: &Principal) -> Result<()>;

    /// Persist the mutable fields of an existing record.
    async fn save(
        &self,
        principal: &Principal,
        opts: SaveOptions,
    ) -> Result<()>;

    /// Unconditionally clear the stored refresh token. A missing record is
    /// not an error; logout stays idempotent.
    async fn clear_refresh_token(&self, id: PrincipalId) -> Result<()>;

    /// Atomically replace the stored refresh token only while it still
    /// equals `expected`. Returns whether the swap happened; `false` means
    /// the stored value never matched or changed concurrently.
    async fn swap_refresh_token(
        &self,
        id: PrincipalId,
        expected: Option<&str>,
        next: Option<&str>,
    ) -> Result<bool>;
}
