//! Console peripherals
//!
//! Stands in for the tag scanner and the buttons on a host. A reader thread
//! turns stdin lines into [`Input`]s and routes them to a [`ConsoleScanner`]
//! and [`ConsoleButtons`], which the control loop drains without blocking.
//!
//! ```text
//! play | next | prev | up | down | music   button presses
//! tag <uid>  or a bare hex uid            token presented
//! quit                                    end of input
//! ```

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tagtune_core::{ButtonAction, ButtonInput, TagScanner};
use tracing::{debug, warn};

use crate::error::Result;

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Button(ButtonAction),
    Tag(String),
}

/// Parse a console line. `None` for blank or unrecognised input.
pub fn parse_line(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let first = words.next()?.to_ascii_lowercase();

    let action = match first.as_str() {
        "play" | "pause" | "p" => ButtonAction::PlayPause,
        "next" | "n" => ButtonAction::Next,
        "prev" => ButtonAction::Prev,
        "up" | "+" => ButtonAction::VolumeUp,
        "down" | "-" => ButtonAction::VolumeDown,
        "music" | "m" => ButtonAction::MusicMode,
        "tag" => return words.next().map(|uid| Input::Tag(uid.to_string())),
        _ if first.chars().all(|c| c.is_ascii_hexdigit()) => {
            return Some(Input::Tag(first));
        }
        _ => return None,
    };
    Some(Input::Button(action))
}

/// Writing end of the console peripherals
#[derive(Debug, Clone)]
pub struct InputFeed {
    tags: Sender<String>,
    buttons: Sender<ButtonAction>,
    closed: Arc<AtomicBool>,
}

impl InputFeed {
    pub fn send(&self, input: Input) {
        let delivered = match input {
            Input::Button(action) => self.buttons.send(action).is_ok(),
            Input::Tag(uid) => self.tags.send(uid).is_ok(),
        };
        if !delivered {
            debug!("Input dropped after shutdown");
        }
    }

    /// No more input will arrive.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Tag scanner half
#[derive(Debug)]
pub struct ConsoleScanner {
    tags: Receiver<String>,
}

impl TagScanner for ConsoleScanner {
    fn poll_for_uid(&mut self) -> Option<String> {
        self.tags.try_recv().ok()
    }
}

/// Button half
#[derive(Debug)]
pub struct ConsoleButtons {
    buttons: Receiver<ButtonAction>,
}

impl ButtonInput for ConsoleButtons {
    fn poll_action(&mut self) -> Option<ButtonAction> {
        self.buttons.try_recv().ok()
    }
}

/// Set once input has ended
#[derive(Debug, Clone)]
pub struct InputClosed(Arc<AtomicBool>);

impl InputClosed {
    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Console peripherals wired together
#[derive(Debug)]
pub struct ConsolePeripherals {
    pub feed: InputFeed,
    pub scanner: ConsoleScanner,
    pub buttons: ConsoleButtons,
    pub closed: InputClosed,
}

impl ConsolePeripherals {
    /// Channels only; feed them by hand (tests, scripted input).
    pub fn new() -> Self {
        let (tag_tx, tag_rx) = unbounded();
        let (button_tx, button_rx) = unbounded();
        let closed = Arc::new(AtomicBool::new(false));
        Self {
            feed: InputFeed {
                tags: tag_tx,
                buttons: button_tx,
                closed: Arc::clone(&closed),
            },
            scanner: ConsoleScanner { tags: tag_rx },
            buttons: ConsoleButtons { buttons: button_rx },
            closed: InputClosed(closed),
        }
    }

    /// Start a reader thread feeding from stdin.
    pub fn from_stdin() -> Result<Self> {
        let peripherals = Self::new();
        let feed = peripherals.feed.clone();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    let line = line.trim();
                    if line.eq_ignore_ascii_case("quit") {
                        break;
                    }
                    match parse_line(line) {
                        Some(input) => feed.send(input),
                        None if line.is_empty() => {}
                        None => warn!("Unrecognised input: {}", line),
                    }
                }
                debug!("stdin closed");
                feed.close();
            })?;
        Ok(peripherals)
    }
}

impl Default for ConsolePeripherals {
    fn default() -> Self {
        Self::new()
    }
}
