//! Tagtune - Game Rule Engine
//!
//! A timing-aware state machine that collects answer cards, evaluates the
//! question's rule and decides which cue plays next.
//!
//! ```text
//!  Idle ──start──> Intro ──idle──> Prompt ──idle──> Collect ──scan──> Feedback
//!                    │               ^                 │  ^              │
//!                    └──(no intro)───┘      timeout ───┘  └──(short)─────┤
//!                                                                        │
//!                                      Done <──(last correct)────────────┘
//! ```
//!
//! The engine is pure: it never touches the audio queue. Every input takes the
//! current time, and every method that may start audio returns the cue path to
//! enqueue. The control loop calls [`GameEngine::tick`] each iteration with
//! whether the renderer is idle; transitions that wait for a cue to finish
//! only happen on idle ticks.

mod engine;
pub mod rules;

pub use engine::{GameEngine, GameState, Verdict, DEFAULT_EARLY_SCAN_TTL_MS};
