//! Tagtune Core
//!
//! Platform-agnostic building blocks shared by every Tagtune crate.
//!
//! This crate provides:
//! - **Catalog model**: cards, games, questions, answer rules and the track pool
//! - **Ceilings**: the fixed capacity limits every loader and engine honours
//! - **Clock**: wraparound-safe millisecond deadlines
//! - **Collaborator traits**: scanner, buttons, display, settings, audio output
//!   and track source, implemented per platform
//!
//! # Example
//!
//! ```rust
//! use tagtune_core::{Catalog, CardEntry, CardRole, MusicPlay};
//!
//! let mut catalog = Catalog::default();
//! catalog
//!     .push_card(CardEntry::new(
//!         "ab12",
//!         "Lullaby",
//!         CardRole::Music { play: MusicPlay::Single("/music/lullaby.mp3".into()) },
//!     ))
//!     .unwrap();
//!
//! assert!(catalog.card("AB12").is_some());
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod clock;
pub mod error;
pub mod limits;
pub mod traits;
pub mod types;

pub use catalog::Catalog;
pub use clock::{deadline_reached, Clock, Deadline, ManualClock, Millis, MonotonicClock};
pub use error::{CoreError, Result};
pub use traits::{
    AudioOutput, ButtonAction, ButtonInput, Display, SettingsStore, StatusFlags, StatusFrame,
    TagScanner, TrackSource,
};
pub use types::{
    normalize_path, normalize_uid, AnswerCard, AnswerRule, CardEntry, CardRole, CueMessages,
    GameAudio, GameDef, GameTiming, MusicPlay, ParentAction, PendingCard, PoolSlice, Question,
    QuestionAudio, TagMode, TrackItem, TrackPool, MASTER_TAG,
};
