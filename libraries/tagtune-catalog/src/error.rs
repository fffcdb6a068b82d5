//! Error types for catalog loading

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a catalog load
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Cannot read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top level is not a JSON object
    #[error("Catalog root must be an object")]
    NotAnObject,

    /// A required top-level section is missing
    #[error("Catalog is missing the '{0}' array")]
    MissingSection(&'static str),
}

/// Result type for catalog loading
pub type Result<T> = std::result::Result<T, CatalogError>;
