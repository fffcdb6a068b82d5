//! Control → worker command queue

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use thiserror::Error;
use tracing::{error, warn};

/// A request for the render worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCommand {
    /// Stop whatever plays and start this path
    PlayFile(String),
    /// Like `PlayFile`, but finishing it never advances the playlist
    PlayCue(String),
    /// Flip the paused flag
    TogglePause,
}

/// Why a command was not queued. The command is handed back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("command queue full, dropped {0:?}")]
    Full(AudioCommand),

    #[error("render worker gone, dropped {0:?}")]
    Disconnected(AudioCommand),
}

/// Sending half, owned by the control loop
#[derive(Debug)]
pub struct CommandSender {
    tx: Sender<AudioCommand>,
}

/// Receiving half, owned by the render worker
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<AudioCommand>,
}

pub(crate) fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = bounded(capacity);
    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    /// Queue a command without blocking.
    ///
    /// A full queue drops the command and logs it; callers do not retry.
    pub fn enqueue(&self, cmd: AudioCommand) -> Result<(), EnqueueError> {
        match self.tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => {
                warn!("Command queue full, dropping {:?}", cmd);
                Err(EnqueueError::Full(cmd))
            }
            Err(TrySendError::Disconnected(cmd)) => {
                error!("Render worker disconnected, dropping {:?}", cmd);
                Err(EnqueueError::Disconnected(cmd))
            }
        }
    }

    /// Commands waiting to be drained
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Outcome of polling the queue
pub(crate) enum Polled {
    Command(AudioCommand),
    Empty,
    Closed,
}

impl CommandReceiver {
    pub(crate) fn poll(&self) -> Polled {
        match self.rx.try_recv() {
            Ok(cmd) => Polled::Command(cmd),
            Err(TryRecvError::Empty) => Polled::Empty,
            Err(TryRecvError::Disconnected) => Polled::Closed,
        }
    }
}
