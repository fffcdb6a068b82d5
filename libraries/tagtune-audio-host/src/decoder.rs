//! Streaming file decoding with Symphonia
//!
//! Packets are decoded on demand and converted to interleaved stereo f32:
//! mono is duplicated to both channels, extra channels are dropped, and every
//! sample format is normalized to [-1.0, 1.0].

use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tagtune_playback::{AudioSource, PlaybackError, Result, SourceOpener, DEFAULT_SAMPLE_RATE};
use tracing::{debug, warn};

use crate::fs_source::FsTrackSource;

/// Opens catalog paths beneath a media root
#[derive(Debug, Clone)]
pub struct SymphoniaOpener {
    tracks: FsTrackSource,
}

impl SymphoniaOpener {
    pub fn new(tracks: FsTrackSource) -> Self {
        Self { tracks }
    }
}

impl SourceOpener for SymphoniaOpener {
    fn open(&self, path: &str) -> Result<Box<dyn AudioSource>> {
        let file_path = self
            .tracks
            .resolve(path)
            .ok_or_else(|| PlaybackError::MissingFile(path.to_string()))?;
        Ok(Box::new(SymphoniaSource::open(&file_path)?))
    }
}

/// One track being decoded
pub struct SymphoniaSource {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    buffer: VecDeque<f32>,
    is_eof: bool,
}

impl SymphoniaSource {
    /// Probe `path` and prepare its default track. Only metadata is read.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to open file: {}", e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to probe file: {}", e)))?;
        let format_reader = probed.format;

        let track = format_reader
            .default_track()
            .ok_or_else(|| PlaybackError::AudioSource("No audio tracks found".into()))?;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to create decoder: {}", e)))?;

        debug!("Opened {} at {} Hz", path.display(), sample_rate);

        Ok(Self {
            format_reader,
            decoder,
            track_id,
            sample_rate,
            buffer: VecDeque::new(),
            is_eof: false,
        })
    }

    /// Decode the next packet into the buffer. `false` at end of stream.
    fn decode_next_packet(&mut self) -> Result<bool> {
        if self.is_eof {
            return Ok(false);
        }

        let packet = match self.format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.is_eof = true;
                return Ok(false);
            }
            Err(SymphoniaError::ResetRequired) => {
                self.is_eof = true;
                return Ok(false);
            }
            Err(e) => {
                return Err(PlaybackError::AudioSource(format!(
                    "Error reading packet: {}",
                    e
                )));
            }
        };

        if packet.track_id() != self.track_id {
            return Ok(true);
        }

        match self.decoder.decode(&packet) {
            Ok(decoded) => {
                append_stereo(&mut self.buffer, decoded);
                Ok(true)
            }
            // A corrupt frame is skipped, not fatal
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
                Ok(true)
            }
            Err(e) => Err(PlaybackError::AudioSource(format!("Decode error: {}", e))),
        }
    }
}

impl AudioSource for SymphoniaSource {
    fn read_samples(&mut self, output: &mut [f32]) -> Result<usize> {
        while self.buffer.len() < output.len() && self.decode_next_packet()? {}

        let n = self.buffer.len().min(output.len());
        for (slot, sample) in output.iter_mut().zip(self.buffer.drain(..n)) {
            *slot = sample;
        }
        Ok(n)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

// ===== Sample conversion =====

fn append_stereo(out: &mut VecDeque<f32>, decoded: AudioBufferRef<'_>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave(out, &buf, |s| s),
        AudioBufferRef::F64(buf) => interleave(out, &buf, |s| s as f32),
        AudioBufferRef::S8(buf) => interleave(out, &buf, |s| s as f32 / i8::MAX as f32),
        AudioBufferRef::S16(buf) => interleave(out, &buf, |s| s as f32 / i16::MAX as f32),
        AudioBufferRef::S24(buf) => interleave(out, &buf, |s| s.inner() as f32 / 8388607.0),
        AudioBufferRef::S32(buf) => interleave(out, &buf, |s| s as f32 / i32::MAX as f32),
        AudioBufferRef::U8(buf) => {
            interleave(out, &buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave(out, &buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave(out, &buf, |s| (s.inner() as f32 / 16777215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave(out, &buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}

fn interleave<T, F>(out: &mut VecDeque<f32>, buf: &AudioBuffer<T>, normalize: F)
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    if channels == 0 {
        return;
    }
    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    out.reserve(buf.frames() * 2);
    for (&l, &r) in left.iter().zip(right) {
        out.push_back(normalize(l));
        out.push_back(normalize(r));
    }
}
