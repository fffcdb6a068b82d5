//! Tagtune Catalog Loader
//!
//! Turns the JSON catalog document on the storage card into a validated
//! [`Catalog`](tagtune_core::Catalog).
//!
//! Loading is observe-and-degrade: a malformed entry is skipped, anything past
//! a ceiling is truncated, and each such event is logged and recorded in the
//! returned [`LoadReport`]. Only an unreadable or unparsable document fails,
//! in which case the caller keeps whatever catalog it had.
//!
//! # Example
//!
//! ```rust
//! let doc = r#"{
//!     "cards": [
//!         { "uid": "ab12", "role": "music", "title": "Song",
//!           "play": { "kind": "single", "file": "/music/song.mp3" } }
//!     ]
//! }"#;
//!
//! let loaded = tagtune_catalog::load_from_str(doc).unwrap();
//! assert!(loaded.catalog.card("AB12").is_some());
//! assert!(loaded.report.is_clean());
//! ```

mod error;
mod loader;
mod raw;
mod report;

pub use error::{CatalogError, Result};
pub use loader::{load_from_path, load_from_str, load_from_value, LoadedCatalog};
pub use report::{LoadReport, LoadWarning};
