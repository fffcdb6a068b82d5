//! Tagtune - Host Audio
//!
//! Host implementations of the playback seams:
//! - [`FsTrackSource`]: catalog paths resolved beneath a media directory
//! - [`SymphoniaOpener`] / [`SymphoniaSource`]: streaming decode of MP3 (and
//!   anything else Symphonia probes) to interleaved stereo f32
//! - [`SharedGain`] and [`SimulatedSpeaker`]: the volume knob and a
//!   real-time paced output stage

#![forbid(unsafe_code)]

mod decoder;
mod fs_source;
mod output;

pub use decoder::{SymphoniaOpener, SymphoniaSource};
pub use fs_source::FsTrackSource;
pub use output::{SharedGain, SimulatedSpeaker};
