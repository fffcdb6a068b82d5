//! Host output stage
//!
//! [`SharedGain`] is the volume knob the control loop turns; the
//! [`SimulatedSpeaker`] on the render thread reads it on every write.
//! Without a sound device the speaker only consumes samples at real-time
//! speed and tracks the level, so tracks take as long as they would on the
//! device.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tagtune_core::AudioOutput;
use tagtune_playback::{AudioSink, DEFAULT_SAMPLE_RATE};
use tracing::trace;

/// Linear gain shared between threads
#[derive(Debug, Clone)]
pub struct SharedGain(Arc<AtomicU32>);

impl SharedGain {
    pub fn new(gain: f32) -> Self {
        Self(Arc::new(AtomicU32::new(gain.clamp(0.0, 1.0).to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for SharedGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioOutput for SharedGain {
    fn set_gain(&mut self, gain: f32) {
        self.0
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

/// Real-time paced sink without a sound device
#[derive(Debug)]
pub struct SimulatedSpeaker {
    gain: SharedGain,
    paced: bool,
    sample_rate: u32,
    track_started: Instant,
    frames: u64,
    peak: f32,
}

impl SimulatedSpeaker {
    pub fn new(gain: SharedGain) -> Self {
        Self {
            gain,
            paced: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
            track_started: Instant::now(),
            frames: 0,
            peak: 0.0,
        }
    }

    /// Consume samples as fast as they come (tests, batch checks).
    pub fn unpaced(gain: SharedGain) -> Self {
        Self {
            paced: false,
            ..Self::new(gain)
        }
    }

    /// Stereo frames written since the current track started
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Loudest sample of the current track after gain
    pub fn peak(&self) -> f32 {
        self.peak
    }

    fn pace(&self) {
        let due = Duration::from_secs_f64(self.frames as f64 / f64::from(self.sample_rate.max(1)));
        let elapsed = self.track_started.elapsed();
        if due > elapsed {
            thread::sleep(due - elapsed);
        }
    }
}

impl AudioSink for SimulatedSpeaker {
    fn start_track(&mut self, sample_rate: u32) {
        trace!("Speaker: new track at {} Hz (previous peak {:.2})", sample_rate, self.peak);
        self.sample_rate = sample_rate;
        self.track_started = Instant::now();
        self.frames = 0;
        self.peak = 0.0;
    }

    fn write(&mut self, samples: &[f32]) {
        let gain = self.gain.get();
        let peak = samples
            .iter()
            .map(|s| (s * gain).abs())
            .fold(0.0_f32, f32::max);
        self.peak = self.peak.max(peak);
        self.frames += (samples.len() / 2) as u64;

        if self.paced {
            self.pace();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_shared_and_clamped() {
        let gain = SharedGain::new(0.4);
        let mut knob = gain.clone();
        knob.set_gain(0.65);
        assert!((gain.get() - 0.65).abs() < 1e-6);

        knob.set_gain(3.0);
        assert_eq!(gain.get(), 1.0);
    }

    #[test]
    fn test_speaker_applies_gain_to_peak() {
        let gain = SharedGain::new(0.5);
        let mut speaker = SimulatedSpeaker::unpaced(gain);
        speaker.start_track(8_000);
        speaker.write(&[0.8, -0.2, 0.1, 0.1]);

        assert_eq!(speaker.frames(), 2);
        assert!((speaker.peak() - 0.4).abs() < 1e-6);

        speaker.start_track(8_000);
        assert_eq!(speaker.frames(), 0);
    }

    #[test]
    fn test_paced_speaker_takes_real_time() {
        let mut speaker = SimulatedSpeaker::new(SharedGain::default());
        speaker.start_track(1_000);
        let start = Instant::now();
        // 50 frames at 1 kHz
        speaker.write(&[0.0; 100]);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
