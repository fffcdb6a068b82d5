//! Error types for playback

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track does not exist on the track source
    #[error("Missing file: {0}")]
    MissingFile(String),

    /// Audio source could not be opened or decoded
    #[error("Audio source error: {0}")]
    AudioSource(String),

    /// Render worker thread could not be started
    #[error("Failed to spawn render worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
