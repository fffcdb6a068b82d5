//! Tagtune - Playback
//!
//! The two-executor playback model and the music-side playlist logic.
//!
//! This crate provides:
//! - **Command queue**: bounded (8), non-blocking control → worker channel
//! - **Render worker**: drains commands, decodes the active track, reports
//!   completion
//! - **Shared status**: single-writer flags split into control-side and
//!   worker-side handles
//! - **Active playlist**: folder/track-list building, wrapping navigation,
//!   end-of-playlist handling
//! - **Anti-repeat gate** and **volume** with parental lock
//!
//! # Architecture
//!
//! ```text
//! Control loop                          Render worker thread
//!      │  PlayFile / PlayCue / TogglePause   │
//!      │───────── command queue (8) ────────>│ drain all, then decode one frame
//!      │                                     │
//!      │<──── WorkerEvent (single slot) ─────│ track finished
//!      │                                     │
//!      │  writes: auto_advance, cursor,      │ writes: is_playing, is_paused,
//!      │          playlist_ended, requested  │         applied
//! ```
//!
//! Neither side blocks on the other. Every status field has exactly one
//! writer, enforced by which handle exposes the setter.
//!
//! # Example
//!
//! ```rust
//! use tagtune_playback::playback_core;
//!
//! let (mut control, _worker_ports) = playback_core();
//! control.play_file("/music/song.mp3").unwrap();
//! assert!(!control.is_render_idle()); // worker has not applied it yet
//! ```

mod anti_repeat;
mod command;
mod error;
mod playlist;
mod source;
mod status;
mod volume;
mod worker;

pub use anti_repeat::{AntiRepeatGate, GateDecision};
pub use command::{AudioCommand, CommandReceiver, CommandSender, EnqueueError};
pub use error::{PlaybackError, Result};
pub use playlist::{dirname, is_playable, join_path, ActivePlaylist, PLAYABLE_EXTENSION};
pub use source::{AudioSink, AudioSource, NullSink, SourceOpener, DEFAULT_SAMPLE_RATE};
pub use status::{
    playback_core, PlaybackControl, PlaybackSnapshot, StatusView, WorkerEvent, WorkerPorts,
};
pub use volume::Volume;
pub use worker::{RenderWorker, WorkerHandle};
