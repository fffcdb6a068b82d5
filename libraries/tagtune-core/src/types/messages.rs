//! Free-form cue messages keyed by purpose

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cue paths for device-level events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueMessages {
    /// Played instead of a blocked repeat start
    pub anti_repeat_warning: Option<String>,
    pub anti_repeat_on: Option<String>,
    pub anti_repeat_off: Option<String>,
    pub volume_lock_on: Option<String>,
    pub volume_lock_off: Option<String>,
    /// Played when a master card resolves a question
    pub master_card_used: Option<String>,
    /// Played when leaving a game for music mode
    pub music_mode_info: Option<String>,
    /// Entries with keys this firmware does not use
    pub extra: BTreeMap<String, String>,
}

impl CueMessages {
    /// Store a cue under its catalog key.
    pub fn insert(&mut self, key: &str, path: String) {
        let slot = match key {
            "antiRepeatWarning" => &mut self.anti_repeat_warning,
            "antiRepeatOn" => &mut self.anti_repeat_on,
            "antiRepeatOff" => &mut self.anti_repeat_off,
            "volumeLockOn" => &mut self.volume_lock_on,
            "volumeLockOff" => &mut self.volume_lock_off,
            "masterCardUsed" => &mut self.master_card_used,
            "musicModeInfo" => &mut self.music_mode_info,
            _ => {
                self.extra.insert(key.to_string(), path);
                return;
            }
        };
        *slot = Some(path);
    }

    pub fn anti_repeat_toggled(&self, enabled: bool) -> Option<&str> {
        if enabled {
            self.anti_repeat_on.as_deref()
        } else {
            self.anti_repeat_off.as_deref()
        }
    }

    pub fn volume_lock_toggled(&self, locked: bool) -> Option<&str> {
        if locked {
            self.volume_lock_on.as_deref()
        } else {
            self.volume_lock_off.as_deref()
        }
    }
}
