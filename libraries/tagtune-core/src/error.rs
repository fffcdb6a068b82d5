/// Core error types for Tagtune
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Tagtune
#[derive(Error, Debug)]
pub enum CoreError {
    /// A fixed ceiling was reached; the entry was not stored
    #[error("{what} ceiling reached ({limit})")]
    CapacityExceeded { what: &'static str, limit: usize },

    /// A card with the same uid already exists
    #[error("Duplicate card uid: {0}")]
    DuplicateUid(String),

    /// A game with the same id already exists
    #[error("Duplicate game id: {0}")]
    DuplicateGame(String),

    /// Settings store failure
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
