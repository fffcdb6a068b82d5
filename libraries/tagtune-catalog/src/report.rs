//! Non-fatal findings collected while loading

use thiserror::Error;
use tracing::warn;

/// Something in the catalog was skipped, truncated or adjusted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    #[error("{what}: kept {limit}, dropped {dropped}")]
    Truncated {
        what: String,
        limit: usize,
        dropped: usize,
    },

    #[error("{section}[{index}] skipped: {reason}")]
    Skipped {
        section: &'static str,
        index: usize,
        reason: String,
    },

    #[error("duplicate card uid {0}, later entry ignored")]
    DuplicateUid(String),

    #[error("duplicate game id {0}, later entry ignored")]
    DuplicateGame(String),

    #[error("card {uid} has unknown role '{role}'")]
    UnknownRole { uid: String, role: String },

    #[error("music card {uid} has no usable play block")]
    Unplayable { uid: String },

    #[error("game {game} question {question}: unknown rule type '{rule_type}', using requireTags")]
    UnknownRuleType {
        game: String,
        question: usize,
        rule_type: String,
    },

    #[error("game {game} question {question}: {requested} cards requested, using {used}")]
    CardsClamped {
        game: String,
        question: usize,
        requested: i64,
        used: u8,
    },

    #[error("game {game}: maxRepeat {requested} out of range, using {used}")]
    RepeatClamped {
        game: String,
        requested: i64,
        used: u8,
    },

    #[error("path longer than {limit} bytes ignored: {path}")]
    PathTooLong { path: String, limit: usize },
}

/// Everything the loader had to work around
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Log and record a warning.
    pub(crate) fn push(&mut self, warning: LoadWarning) {
        warn!("Catalog: {}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Whether any collection was cut at a ceiling
    pub fn has_truncation(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LoadWarning::Truncated { .. }))
    }
}
