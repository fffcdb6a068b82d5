use tagtune_core::{Display, StatusFlags, StatusFrame};
use tracing::info;

/// Status readout written to the log
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    frames: u64,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Display for ConsoleDisplay {
    fn render(&mut self, frame: &StatusFrame) {
        self.frames += 1;
        info!(
            target: "tagtune::display",
            "[{}] {} | {} | {} | vol {}%",
            indicators(frame.flags),
            frame.line1,
            frame.line2,
            frame.line3,
            frame.volume_percent
        );
    }
}

/// One character per indicator, `-` when off
pub fn indicators(flags: StatusFlags) -> String {
    [
        (StatusFlags::PLAYING, '>'),
        (StatusFlags::PAUSED, '='),
        (StatusFlags::GAME, 'G'),
        (StatusFlags::ANTI_REPEAT, 'R'),
        (StatusFlags::VOLUME_LOCK, 'L'),
        (StatusFlags::STORAGE_ERROR, '!'),
    ]
    .iter()
    .map(|(flag, c)| if flags.contains(*flag) { *c } else { '-' })
    .collect()
}
