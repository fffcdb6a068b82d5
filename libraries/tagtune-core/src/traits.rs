/// Collaborator traits implemented per platform
///
/// The core never talks to hardware directly. Scanner, buttons, display,
/// settings storage, audio output and the track filesystem are all reached
/// through these seams, so the same engine runs on the device, on a host and
/// inside tests.
use bitflags::bitflags;

use crate::error::Result;

/// Reads token uids from the tag scanner
pub trait TagScanner {
    /// Return a uid when a new token was presented since the last poll.
    fn poll_for_uid(&mut self) -> Option<String>;
}

/// Debounced button events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    PlayPause,
    Next,
    Prev,
    VolumeUp,
    VolumeDown,
    /// Leave any game and return to music mode
    MusicMode,
}

/// Source of debounced button actions
pub trait ButtonInput {
    fn poll_action(&mut self) -> Option<ButtonAction>;
}

/// Output stage gain control
pub trait AudioOutput: Send {
    /// Set linear gain, `0.0..=1.0`.
    fn set_gain(&mut self, gain: f32);
}

/// Filesystem holding tracks and cues.
///
/// Shared between the control loop (playlist building) and the render worker
/// (opening tracks), hence `Send + Sync`.
pub trait TrackSource: Send + Sync {
    /// Whether an absolute catalog path exists.
    fn exists(&self, path: &str) -> bool;

    /// File names (not paths) directly inside `dir`, in any order.
    fn list_dir(&self, dir: &str) -> Vec<String>;

    /// Whether the underlying storage is mounted and readable.
    fn is_available(&self) -> bool {
        true
    }
}

/// Key-value settings with durability on write
pub trait SettingsStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn put_string(&mut self, key: &str, value: &str) -> Result<()>;
    fn get_int(&self, key: &str) -> Option<i64>;
    fn put_int(&mut self, key: &str, value: i64) -> Result<()>;
}

bitflags! {
    /// Indicators shown next to the status lines
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u8 {
        const PLAYING = 1 << 0;
        const PAUSED = 1 << 1;
        const GAME = 1 << 2;
        const ANTI_REPEAT = 1 << 3;
        const VOLUME_LOCK = 1 << 4;
        const STORAGE_ERROR = 1 << 5;
    }
}

/// Everything the three-line status readout shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFrame {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub volume_percent: u8,
    pub flags: StatusFlags,
}

/// Three-line status readout
pub trait Display {
    fn render(&mut self, frame: &StatusFrame);
}
