//! Decoding real files through the worker seams

use std::path::Path;

use tagtune_audio_host::{FsTrackSource, SymphoniaOpener};
use tagtune_playback::{AudioSource, PlaybackError, SourceOpener};
use tempfile::TempDir;

// ===== Helpers =====

fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        for ch in 0..channels {
            let value = if ch == 0 { 16_384 } else { -8_192 };
            writer
                .write_sample(if i % 2 == 0 { value } else { 0i16 })
                .unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn read_all(opener: &SymphoniaOpener, path: &str) -> (Vec<f32>, u32) {
    let mut source = opener.open(path).unwrap();
    let rate = source.sample_rate();
    let mut all = Vec::new();
    let mut chunk = vec![0.0f32; 512];
    loop {
        let n = source.read_samples(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        all.extend_from_slice(&chunk[..n]);
    }
    (all, rate)
}

fn media() -> (TempDir, SymphoniaOpener) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("cues")).unwrap();
    let opener = SymphoniaOpener::new(FsTrackSource::new(dir.path()));
    (dir, opener)
}

// ===== Tests =====

#[test]
fn test_stereo_file_decodes_every_frame() {
    let (dir, opener) = media();
    write_wav(&dir.path().join("cues/stereo.wav"), 2, 8_000, 800);

    let (samples, rate) = read_all(&opener, "/cues/stereo.wav");

    assert_eq!(rate, 8_000);
    assert_eq!(samples.len(), 1_600);
    assert!((samples[0] - 0.5).abs() < 1e-3);
    assert!((samples[1] + 0.25).abs() < 1e-3);
}

#[test]
fn test_mono_file_is_duplicated_to_stereo() {
    let (dir, opener) = media();
    write_wav(&dir.path().join("cues/mono.wav"), 1, 11_025, 300);

    let (samples, rate) = read_all(&opener, "/cues/mono.wav");

    assert_eq!(rate, 11_025);
    assert_eq!(samples.len(), 600);
    assert_eq!(samples[0], samples[1]);
}

#[test]
fn test_missing_and_garbage_files_fail_to_open() {
    let (dir, opener) = media();
    std::fs::write(dir.path().join("cues/noise.mp3"), b"definitely not audio").unwrap();

    assert!(matches!(
        opener.open("/cues/none.mp3"),
        Err(PlaybackError::AudioSource(_))
    ));
    assert!(opener.open("/cues/noise.mp3").is_err());
    assert!(matches!(
        opener.open("/../outside.mp3"),
        Err(PlaybackError::MissingFile(_))
    ));
}
