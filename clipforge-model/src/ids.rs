use uuid::Uuid;

/// Strongly typed ID for principals
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct PrincipalId(pub Uuid);

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl PrincipalId {
    pub fn new() -> Self {
        PrincipalId(Uuid::now_v7())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for PrincipalId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for PrincipalId {
    fn from(id: Uuid) -> Self {
        PrincipalId(id)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for catalog videos
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct VideoId(pub Uuid);

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoId {
    pub fn new() -> Self {
        VideoId(Uuid::now_v7())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for VideoId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for VideoId {
    fn from(id: Uuid) -> Self {
        VideoId(id)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
