//! Tagtune Storage
//!
//! Small, durable preference storage for the player: the volume level and
//! the last music track. Implementations of [`tagtune_core::SettingsStore`]
//! live here together with the debounced volume writer.
//!
//! # Example
//!
//! ```rust
//! use tagtune_core::SettingsStore;
//! use tagtune_storage::{MemorySettings, VolumePersister, KEY_VOLUME};
//!
//! let mut store = MemorySettings::new();
//! let mut persister = VolumePersister::new(800);
//!
//! persister.note_change(45, 0);
//! assert!(!persister.poll(500, &mut store));
//! assert!(persister.poll(800, &mut store));
//! assert_eq!(store.get_int(KEY_VOLUME), Some(45));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod persister;
pub mod settings;

pub use error::{Result, StorageError};
pub use persister::{VolumePersister, DEFAULT_SAVE_DELAY_MS};
pub use settings::{JsonFileSettings, MemorySettings, KEY_LAST_PATH, KEY_VOLUME};
