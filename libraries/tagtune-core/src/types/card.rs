//! Card entries and their roles

use serde::{Deserialize, Serialize};

use super::track::PoolSlice;

/// Tag that makes an answer card resolve any question as correct
pub const MASTER_TAG: &str = "master";

/// Normalize a scanned or configured uid for lookup.
///
/// Surrounding whitespace is dropped and hex digits are uppercased, so
/// `"ab12"` and `" AB12 "` address the same card.
pub fn normalize_uid(uid: &str) -> String {
    uid.trim().to_ascii_uppercase()
}

/// A physical token known to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEntry {
    /// Normalized uppercase uid
    pub uid: String,
    pub title: String,
    pub artist: Option<String>,
    pub role: CardRole,
}

impl CardEntry {
    /// Create a card, normalizing the uid.
    pub fn new(uid: &str, title: impl Into<String>, role: CardRole) -> Self {
        Self {
            uid: normalize_uid(uid),
            title: title.into(),
            artist: None,
            role,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Short label for logs and the status display
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.uid
        } else {
            &self.title
        }
    }
}

/// What scanning a card does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum CardRole {
    /// Start music
    Music { play: MusicPlay },
    /// Answer a game question
    Answer(AnswerCard),
    /// Start (or restart) a game
    GameSelector { game_id: String },
    /// Toggle a parental runtime flag
    Parent { action: ParentAction },
}

/// How a music card selects audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicPlay {
    /// One file; next/prev browse its directory
    Single(String),
    /// Every playable file in a folder
    AlbumFolder(String),
    /// Tracks listed in the catalog, stored in the pool
    AlbumTracks(PoolSlice),
    /// The card had no usable play block
    Unplayable,
}

/// Payload of an answer card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCard {
    pub tags: Vec<String>,
    /// Numeric value for sum rules; `None` when absent
    pub value: Option<i32>,
}

impl AnswerCard {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_master(&self) -> bool {
        self.has_tag(MASTER_TAG)
    }
}

/// Parental control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentAction {
    ToggleAntiRepeat,
    ToggleVolumeLock,
}

impl ParentAction {
    /// Parse the catalog spelling of an action.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "toggle_anti_repeat" => Some(Self::ToggleAntiRepeat),
            "toggle_volume_lock" => Some(Self::ToggleVolumeLock),
            _ => None,
        }
    }
}
