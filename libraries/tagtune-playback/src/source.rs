//! Platform-agnostic audio source traits
//!
//! Abstracts decoding and output so the render worker runs the same on the
//! device, on a host and under test.

use crate::error::Result;

/// Sample rate assumed when a source does not report one
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// A decoded track being played
///
/// Implementors hand out interleaved stereo f32 samples in [-1.0, 1.0].
pub trait AudioSource: Send {
    /// Read the next chunk of samples.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of samples written to `buffer` (0 = end of track)
    /// * `Err(_)` - Decoding failed; the track is treated as finished
    fn read_samples(&mut self, buffer: &mut [f32]) -> Result<usize>;

    /// Frames per second of the samples handed out
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }
}

/// Opens tracks by catalog path
pub trait SourceOpener: Send {
    fn open(&self, path: &str) -> Result<Box<dyn AudioSource>>;
}

/// Destination of decoded samples
pub trait AudioSink: Send {
    /// A new track starts; following writes are at `sample_rate`.
    fn start_track(&mut self, _sample_rate: u32) {}

    fn write(&mut self, samples: &[f32]);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write(&mut self, _samples: &[f32]) {}
}
