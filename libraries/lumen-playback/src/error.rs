//! Error types for playback session control

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Requested playback rate is outside the supported range
    #[error("Invalid playback rate: {0}")]
    InvalidRate(f32),

    /// The host denied a permission playback depends on
    #[error("Permission denied")]
    PermissionDenied,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
