//! Volume control with a parental lock
//!
//! Volume range is clamped to 5-90% so the speaker is never silent by accident
//! nor painfully loud. Gain is linear in the percentage.

/// Lowest selectable level
pub const MIN_LEVEL: u8 = 5;

/// Highest selectable level
pub const MAX_LEVEL: u8 = 90;

/// Level on first boot
pub const DEFAULT_LEVEL: u8 = 40;

/// Change per button press
pub const STEP: u8 = 5;

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (MIN_LEVEL..=MAX_LEVEL)
    level: u8,

    /// Buttons ignored while locked
    locked: bool,
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Volume {
    /// Create a volume controller, clamping `level` into range.
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(MIN_LEVEL, MAX_LEVEL),
            locked: false,
        }
    }

    /// Restore from a stored percentage; anything outside 0-100 means
    /// "never saved" and gives the default.
    pub fn from_stored(stored: Option<i64>) -> Self {
        match stored.and_then(|v| u8::try_from(v).ok()).filter(|v| *v <= 100) {
            Some(level) => Self::new(level),
            None => Self::default(),
        }
    }

    /// Raise one step. Returns whether the level changed.
    pub fn step_up(&mut self) -> bool {
        self.set_level(self.level.saturating_add(STEP))
    }

    /// Lower one step. Returns whether the level changed.
    pub fn step_down(&mut self) -> bool {
        self.set_level(self.level.saturating_sub(STEP))
    }

    fn set_level(&mut self, level: u8) -> bool {
        if self.locked {
            return false;
        }
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        let changed = level != self.level;
        self.level = level;
        changed
    }

    /// Get current volume level (percent)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Linear gain multiplier for the output stage
    pub fn gain(&self) -> f32 {
        f32::from(self.level) / 100.0
    }

    /// Flip the lock, returning the new state.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamping() {
        assert_eq!(Volume::new(0).level(), MIN_LEVEL);
        assert_eq!(Volume::new(100).level(), MAX_LEVEL);
        assert_eq!(Volume::default().gain(), 0.4);
    }

    #[test]
    fn test_steps_stop_at_bounds() {
        let mut volume = Volume::new(85);
        assert!(volume.step_up());
        assert_eq!(volume.level(), 90);
        assert!(!volume.step_up());

        let mut volume = Volume::new(MIN_LEVEL);
        assert!(!volume.step_down());
    }

    #[test]
    fn test_lock_blocks_changes() {
        let mut volume = Volume::new(50);
        assert!(volume.toggle_lock());
        assert!(!volume.step_up());
        assert!(!volume.step_down());
        assert_eq!(volume.level(), 50);
        assert!(!volume.toggle_lock());
        assert!(volume.step_up());
    }

    #[test]
    fn test_from_stored() {
        assert_eq!(Volume::from_stored(Some(60)).level(), 60);
        assert_eq!(Volume::from_stored(Some(100)).level(), MAX_LEVEL);
        assert_eq!(Volume::from_stored(Some(-1)).level(), DEFAULT_LEVEL);
        assert_eq!(Volume::from_stored(Some(250)).level(), DEFAULT_LEVEL);
        assert_eq!(Volume::from_stored(None).level(), DEFAULT_LEVEL);
    }
}
