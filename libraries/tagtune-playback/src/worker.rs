//! Render Worker
//!
//! Owns the active audio source and runs on its own thread so decoding never
//! waits on the control loop.
//!
//! ## Iteration
//!
//! ```text
//! step():
//!   1. drain every queued command, in order
//!        PlayFile   -> stop current source, open new one
//!        PlayCue    -> same, but its end raises no WorkerEvent
//!        TogglePause -> flip is_paused
//!   2. if a source is active and not paused, decode one chunk to the sink
//!        end of track -> is_playing = false, maybe raise a WorkerEvent
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tagtune_core::TrackSource;
use tracing::{debug, error, info, warn};

use crate::command::{AudioCommand, Polled};
use crate::error::{PlaybackError, Result};
use crate::source::{AudioSink, AudioSource, SourceOpener};
use crate::status::{WorkerEvent, WorkerPorts};

/// Interleaved samples decoded per step (one MP3 frame, stereo)
const CHUNK_SAMPLES: usize = 1152 * 2;

/// Back-off when a step had nothing to do
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// The decode side of the playback core
pub struct RenderWorker {
    ports: WorkerPorts,
    opener: Box<dyn SourceOpener>,
    tracks: Arc<dyn TrackSource>,
    sink: Box<dyn AudioSink>,
    active: Option<Box<dyn AudioSource>>,
    active_path: Option<String>,
    active_is_cue: bool,
    buffer: Vec<f32>,
    closed: bool,
}

impl RenderWorker {
    pub fn new(
        ports: WorkerPorts,
        opener: Box<dyn SourceOpener>,
        tracks: Arc<dyn TrackSource>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            ports,
            opener,
            tracks,
            sink,
            active: None,
            active_path: None,
            active_is_cue: false,
            buffer: vec![0.0; CHUNK_SAMPLES],
            closed: false,
        }
    }

    /// Run one iteration. Returns whether any work was done.
    pub fn step(&mut self) -> bool {
        let worked = self.drain_commands();

        if self.ports.is_paused() {
            return worked;
        }
        let Some(source) = self.active.as_mut() else {
            return worked;
        };

        match source.read_samples(&mut self.buffer) {
            Ok(0) => self.finish_track(),
            Ok(n) => self.sink.write(&self.buffer[..n.min(CHUNK_SAMPLES)]),
            Err(e) => {
                warn!("Decode failed for {:?}: {}", self.active_path, e);
                self.finish_track();
            }
        }
        true
    }

    /// Path of the source being decoded
    pub fn active_path(&self) -> Option<&str> {
        self.active_path.as_deref()
    }

    /// Whether the control loop dropped its end of the queue
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Run the worker on a dedicated thread.
    pub fn spawn(mut self) -> Result<WorkerHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("render-worker".to_string())
            .spawn(move || {
                info!("Render worker started");
                while !shutdown_flag.load(Ordering::Acquire) && !self.closed {
                    if !self.step() {
                        thread::sleep(IDLE_SLEEP);
                    }
                }
                info!("Render worker stopped");
            })
            .map_err(PlaybackError::Spawn)?;

        Ok(WorkerHandle {
            shutdown,
            thread: Some(thread),
        })
    }

    // ===== Commands =====

    fn drain_commands(&mut self) -> bool {
        let mut worked = false;
        loop {
            match self.ports.commands.poll() {
                Polled::Command(cmd) => {
                    self.apply(cmd);
                    worked = true;
                }
                Polled::Empty => break,
                Polled::Closed => {
                    self.closed = true;
                    break;
                }
            }
        }
        worked
    }

    fn apply(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::PlayFile(path) => {
                if let Err(e) = self.start_track(&path) {
                    error!("Cannot play {}: {}", path, e);
                }
                self.ports.mark_applied();
            }
            AudioCommand::PlayCue(path) => {
                match self.start_track(&path) {
                    Ok(()) => self.active_is_cue = true,
                    Err(e) => error!("Cannot play cue {}: {}", path, e),
                }
                self.ports.mark_applied();
            }
            AudioCommand::TogglePause => {
                let paused = !self.ports.is_paused();
                self.ports.set_paused(paused);
                debug!("Paused: {}", paused);
            }
        }
    }

    fn start_track(&mut self, path: &str) -> Result<()> {
        if !self.tracks.exists(path) {
            return Err(PlaybackError::MissingFile(path.to_string()));
        }

        self.stop();
        self.ports.set_paused(false);

        let source = self.opener.open(path)?;
        self.sink.start_track(source.sample_rate());
        self.active = Some(source);
        self.active_path = Some(path.to_string());
        self.ports.set_playing(true);
        info!("Playing {}", path);
        Ok(())
    }

    fn stop(&mut self) {
        self.active = None;
        self.active_path = None;
        self.active_is_cue = false;
        self.ports.set_playing(false);
    }

    // ===== Completion =====

    fn finish_track(&mut self) {
        debug!("Finished {:?}", self.active_path);
        let was_cue = self.active_is_cue;
        self.stop();

        if was_cue || !self.ports.auto_advance() {
            return;
        }
        match self.ports.cursor() {
            (Some(index), len) if index + 1 < len => {
                self.ports
                    .raise(WorkerEvent::AdvanceRequested { index: index + 1 });
            }
            _ => self.ports.raise(WorkerEvent::PlaylistEnded),
        }
    }
}

/// Handle to a spawned render worker
pub struct WorkerHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Ask the worker to stop and wait for it.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Render worker panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
