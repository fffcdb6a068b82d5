//! Debounced volume persistence
//!
//! Volume buttons tend to be pressed in bursts. Each change restarts a short
//! quiet period, and the level is written once the buttons settle.

use tagtune_core::{Deadline, Millis, SettingsStore};
use tracing::{debug, warn};

use crate::settings::KEY_VOLUME;

/// Quiet period before a volume change is written
pub const DEFAULT_SAVE_DELAY_MS: u32 = 800;

/// Writes the volume level after it stops changing
#[derive(Debug, Clone)]
pub struct VolumePersister {
    delay_ms: u32,
    pending: Option<u8>,
    due: Deadline,
}

impl Default for VolumePersister {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY_MS)
    }
}

impl VolumePersister {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: None,
            due: Deadline::disarmed(),
        }
    }

    /// Record a new level; restarts the quiet period.
    pub fn note_change(&mut self, percent: u8, now: Millis) {
        self.pending = Some(percent.min(100));
        self.due.arm(now, self.delay_ms);
    }

    /// Write the pending level if the quiet period is over.
    ///
    /// Returns whether a write happened. A failed write is logged and
    /// retried after another quiet period.
    pub fn poll(&mut self, now: Millis, store: &mut dyn SettingsStore) -> bool {
        if !self.due.expired(now) {
            return false;
        }
        if self.write(store) {
            return true;
        }
        self.due.arm(now, self.delay_ms);
        false
    }

    /// Write the pending level right away (shutdown).
    pub fn flush(&mut self, store: &mut dyn SettingsStore) -> bool {
        self.write(store)
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    fn write(&mut self, store: &mut dyn SettingsStore) -> bool {
        let Some(percent) = self.pending else {
            return false;
        };
        match store.put_int(KEY_VOLUME, i64::from(percent)) {
            Ok(()) => {
                debug!("Saved volume: {}", percent);
                self.pending = None;
                self.due.clear();
                true
            }
            Err(e) => {
                warn!("Failed to save volume: {}", e);
                false
            }
        }
    }
}
