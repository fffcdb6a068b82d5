//! Millisecond clock and wraparound-safe deadlines.
//!
//! The control loop runs on a free-running `u32` millisecond counter that wraps
//! after ~49 days. Deadlines are compared by signed difference so a deadline
//! armed just before the wrap still fires just after it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds on the monotonic control-loop clock
pub type Millis = u32;

/// True once `now` is at or past `deadline`, across counter wraparound.
pub fn deadline_reached(now: Millis, deadline: Millis) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Milliseconds elapsed since `since`.
pub fn elapsed(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// Source of the current time
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        // Truncation is the wrap we want.
        self.origin.elapsed().as_millis() as u32
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn starting_at(now: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(now)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u32) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}

/// An optional point in time at which something is due
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Millis>);

impl Deadline {
    /// A deadline that is not armed
    pub const fn disarmed() -> Self {
        Self(None)
    }

    /// Arm to fire `after_ms` from `now`.
    pub fn arm(&mut self, now: Millis, after_ms: u32) {
        self.0 = Some(now.wrapping_add(after_ms));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    /// True when armed and reached.
    pub fn expired(&self, now: Millis) -> bool {
        self.0.is_some_and(|due| deadline_reached(now, due))
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_reached_simple() {
        assert!(!deadline_reached(99, 100));
        assert!(deadline_reached(100, 100));
        assert!(deadline_reached(101, 100));
    }

    #[test]
    fn test_deadline_reached_across_wrap() {
        let due = u32::MAX - 5;
        assert!(!deadline_reached(u32::MAX - 10, due));
        // Counter wrapped to a small value: still past the deadline
        assert!(deadline_reached(4, due));
    }

    #[test]
    fn test_deadline_arm_and_expire() {
        let mut d = Deadline::disarmed();
        assert!(!d.expired(1_000));

        d.arm(u32::MAX - 100, 200);
        assert!(d.is_armed());
        assert!(!d.expired(u32::MAX - 1));
        assert!(d.expired(100));

        d.clear();
        assert!(!d.expired(100));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::starting_at(10);
        let other = clock.clone();
        clock.advance(15);
        assert_eq!(other.now_ms(), 25);
        other.set(3);
        assert_eq!(clock.now_ms(), 3);
    }

    #[test]
    fn test_elapsed_wraps() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
    }
}
