//! Anti-repeat gate
//!
//! Stops a child from starting the same track over and over: the third
//! consecutive start of one path is blocked. Starting any other path resets
//! the streak.

use tracing::info;

/// Consecutive starts of one path allowed before blocking
const MAX_STREAK: u32 = 2;

/// Outcome of asking the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Play the warning cue instead
    Block,
}

/// Streak counter over music starts
#[derive(Debug, Clone, Default)]
pub struct AntiRepeatGate {
    enabled: bool,
    last_path: Option<String>,
    streak: u32,
}

impl AntiRepeatGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Decide whether `path` may start, recording allowed starts.
    ///
    /// Blocked starts do not extend the streak.
    pub fn check(&mut self, path: &str) -> GateDecision {
        if self.last_path.as_deref() == Some(path) {
            if self.enabled && self.streak >= MAX_STREAK {
                info!("Anti-repeat: blocking start #{} of {}", self.streak + 1, path);
                return GateDecision::Block;
            }
            self.streak += 1;
        } else {
            self.last_path = Some(path.to_string());
            self.streak = 1;
        }
        GateDecision::Allow
    }

    /// Flip the gate; the streak starts over either way.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.last_path = None;
        self.streak = 0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
