//! Fixed ceilings.
//!
//! Memory is bounded on the device, so every collection in the catalog and the
//! runtime has a hard cap. Anything beyond a cap is truncated with a warning.

/// Cards in a catalog
pub const MAX_CARDS: usize = 80;

/// Games in a catalog
pub const MAX_GAMES: usize = 10;

/// Questions per game
pub const MAX_QUESTIONS: usize = 40;

/// Tags per answer rule
pub const MAX_RULE_TAGS: usize = 6;

/// Tags per answer card
pub const MAX_CARD_TAGS: usize = 8;

/// Cards a single question may require
pub const MAX_PENDING: usize = 4;

/// Tracks across all album-track cards
pub const MAX_POOL_TRACKS: usize = 600;

/// Entries in the active playlist
pub const MAX_PLAYLIST: usize = 300;

/// Slots in the control-to-worker command queue
pub const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Longest accepted track or cue path, in bytes
pub const MAX_PATH_LEN: usize = 127;
