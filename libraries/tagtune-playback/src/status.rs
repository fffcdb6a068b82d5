//! Shared playback status and worker events.
//!
//! Each field of [`Shared`] has exactly one writer:
//!
//! | Field              | Writer  |
//! |--------------------|---------|
//! | `is_playing`       | worker  |
//! | `is_paused`        | worker  |
//! | `applied`          | worker  |
//! | `requested`        | control |
//! | `auto_advance`     | control |
//! | `playlist_ended`   | control |
//! | `cursor_*`         | control |
//!
//! The setters live on [`PlaybackControl`] or on the worker's [`WorkerPorts`],
//! so a writer on the wrong side does not compile. Readers only poll.
//!
//! The `requested`/`applied` generation pair tells the control loop whether
//! the worker has picked up its latest `PlayFile`. Without it, a tick that runs
//! right after enqueueing would see "not playing" and think the cue finished.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tagtune_core::limits::COMMAND_QUEUE_CAPACITY;
use tracing::warn;

use crate::command::{command_queue, AudioCommand, CommandReceiver, CommandSender, EnqueueError};
use crate::playlist::ActivePlaylist;

const NO_INDEX: usize = usize::MAX;

/// Something the worker needs the control loop to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Track finished with auto-advance on; play this playlist index next
    AdvanceRequested { index: usize },
    /// Last playlist entry finished with auto-advance on
    PlaylistEnded,
}

#[derive(Debug)]
struct Shared {
    is_playing: AtomicBool,
    is_paused: AtomicBool,
    applied: AtomicU32,
    requested: AtomicU32,
    auto_advance: AtomicBool,
    playlist_ended: AtomicBool,
    cursor_index: AtomicUsize,
    cursor_len: AtomicUsize,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            is_playing: AtomicBool::new(false),
            is_paused: AtomicBool::new(false),
            applied: AtomicU32::new(0),
            requested: AtomicU32::new(0),
            auto_advance: AtomicBool::new(false),
            playlist_ended: AtomicBool::new(false),
            cursor_index: AtomicUsize::new(NO_INDEX),
            cursor_len: AtomicUsize::new(0),
        }
    }
}

impl Shared {
    fn snapshot(&self) -> PlaybackSnapshot {
        let is_playing = self.is_playing.load(Ordering::Acquire);
        let is_paused = self.is_paused.load(Ordering::Acquire);
        let applied = self.applied.load(Ordering::Acquire);
        let requested = self.requested.load(Ordering::Acquire);
        PlaybackSnapshot {
            is_playing,
            is_paused,
            render_idle: applied == requested && (!is_playing || is_paused),
            auto_advance: self.auto_advance.load(Ordering::Acquire),
            playlist_ended: self.playlist_ended.load(Ordering::Acquire),
        }
    }
}

/// Point-in-time copy of the status flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub is_paused: bool,
    /// Every play request applied and nothing audible
    pub render_idle: bool,
    pub auto_advance: bool,
    pub playlist_ended: bool,
}

impl PlaybackSnapshot {
    /// Audio is coming out of the speaker
    pub fn is_audible(&self) -> bool {
        self.is_playing && !self.is_paused
    }
}

/// Read-only view for displays and diagnostics
#[derive(Debug, Clone)]
pub struct StatusView {
    shared: Arc<Shared>,
}

impl StatusView {
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.snapshot()
    }
}

/// Build the queue, status and event slot shared by the two executors.
pub fn playback_core() -> (PlaybackControl, WorkerPorts) {
    let shared = Arc::new(Shared::default());
    let (commands, receiver) = command_queue(COMMAND_QUEUE_CAPACITY);
    let (event_tx, event_rx) = bounded(1);

    let control = PlaybackControl {
        commands,
        shared: Arc::clone(&shared),
        events: event_rx,
    };
    let ports = WorkerPorts {
        commands: receiver,
        shared,
        events: event_tx,
    };
    (control, ports)
}

// ===== Control side =====

/// Control-loop handle: sends commands, writes control-owned fields, consumes
/// worker events.
#[derive(Debug)]
pub struct PlaybackControl {
    commands: CommandSender,
    shared: Arc<Shared>,
    events: Receiver<WorkerEvent>,
}

impl PlaybackControl {
    /// Queue a command without blocking.
    pub fn enqueue(&mut self, cmd: AudioCommand) -> Result<(), EnqueueError> {
        let is_play = matches!(cmd, AudioCommand::PlayFile(_) | AudioCommand::PlayCue(_));
        if is_play {
            self.shared.requested.fetch_add(1, Ordering::AcqRel);
        }
        let result = self.commands.enqueue(cmd);
        if is_play && result.is_err() {
            self.shared.requested.fetch_sub(1, Ordering::AcqRel);
        }
        result
    }

    pub fn play_file(&mut self, path: &str) -> Result<(), EnqueueError> {
        self.enqueue(AudioCommand::PlayFile(path.to_string()))
    }

    /// Play a short announcement. When it ends the worker stays quiet
    /// instead of moving on in the playlist.
    pub fn play_cue(&mut self, path: &str) -> Result<(), EnqueueError> {
        self.enqueue(AudioCommand::PlayCue(path.to_string()))
    }

    pub fn toggle_pause(&mut self) -> Result<(), EnqueueError> {
        self.enqueue(AudioCommand::TogglePause)
    }

    /// Take the pending worker event, freeing the slot.
    pub fn poll_event(&mut self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Publish the playlist cursor and flags the worker reads on completion.
    pub fn sync_playlist(&mut self, playlist: &ActivePlaylist) {
        let s = &self.shared;
        s.cursor_len.store(playlist.len(), Ordering::Release);
        s.cursor_index
            .store(playlist.index().unwrap_or(NO_INDEX), Ordering::Release);
        s.auto_advance
            .store(playlist.auto_advance(), Ordering::Release);
        s.playlist_ended
            .store(playlist.is_ended(), Ordering::Release);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.snapshot()
    }

    pub fn is_render_idle(&self) -> bool {
        self.snapshot().render_idle
    }

    pub fn view(&self) -> StatusView {
        StatusView {
            shared: Arc::clone(&self.shared),
        }
    }
}

// ===== Worker side =====

/// Everything the render worker needs from the shared core
#[derive(Debug)]
pub struct WorkerPorts {
    pub(crate) commands: CommandReceiver,
    shared: Arc<Shared>,
    events: Sender<WorkerEvent>,
}

impl WorkerPorts {
    pub(crate) fn set_playing(&self, playing: bool) {
        self.shared.is_playing.store(playing, Ordering::Release);
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.shared.is_paused.store(paused, Ordering::Release);
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.shared.is_paused.load(Ordering::Acquire)
    }

    pub(crate) fn mark_applied(&self) {
        self.shared.applied.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn auto_advance(&self) -> bool {
        self.shared.auto_advance.load(Ordering::Acquire)
    }

    /// Current playlist index (if any) and length, as last published
    pub(crate) fn cursor(&self) -> (Option<usize>, usize) {
        let index = self.shared.cursor_index.load(Ordering::Acquire);
        let len = self.shared.cursor_len.load(Ordering::Acquire);
        ((index != NO_INDEX).then_some(index), len)
    }

    /// Fill the single event slot.
    ///
    /// Assumes the control loop drained the previous event; if it has not,
    /// the new one is dropped and logged.
    pub(crate) fn raise(&self, event: WorkerEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("Worker event slot still occupied, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}
