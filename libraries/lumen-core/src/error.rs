/// Core error types for Lumen
use thiserror::Error;

/// Result type alias using `LumenError`
pub type Result<T> = std::result::Result<T, LumenError>;

/// Core error type for Lumen
#[derive(Error, Debug)]
pub enum LumenError {
    /// The intent payload was absent
    #[error("Missing payload")]
    MissingPayload,

    /// The intent payload was present but not a list of media items
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LumenError {
    /// Create an invalid payload error
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }
}
