use thiserror::Error;

/// Failure taxonomy for every core operation.
///
/// Each variant maps to one stable status code via [`CoreError::status_code`];
/// the carried message is the user-visible text. Lower-level error detail
/// (codec class, store transport) is folded into these variants at the
/// service boundary and never leaks through refresh verification.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UploadFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        CoreError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        CoreError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }

    pub fn upload_failed(message: impl Into<String>) -> Self {
        CoreError::UploadFailed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal(message.into())
    }

    /// Stable status code for the transport edge.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::BadRequest(_) => 400,
            CoreError::Unauthorized(_) => 401,
            CoreError::NotFound(_) => 404,
            CoreError::Conflict(_) => 409,
            CoreError::UploadFailed(_) => 502,
            CoreError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
