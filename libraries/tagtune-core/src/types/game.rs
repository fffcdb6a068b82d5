//! Game definitions and answer rules

use serde::{Deserialize, Serialize};

use crate::limits::MAX_PENDING;

/// A question-and-answer game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDef {
    pub id: String,
    pub title: String,
    pub audio: GameAudio,
    pub timing: GameTiming,
    pub questions: Vec<Question>,
}

impl GameDef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            audio: GameAudio::default(),
            timing: GameTiming::default(),
            questions: Vec::new(),
        }
    }
}

/// Game-wide cue paths; any of them may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAudio {
    pub intro: Option<String>,
    pub correct: Option<String>,
    pub wrong: Option<String>,
    pub done: Option<String>,
    pub next_card_for_answer: Option<String>,
    pub music_hint: Option<String>,
    pub idle_stop: Option<String>,
}

/// Timeouts and repeat policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTiming {
    /// Wait for the first card of an answer
    pub answer_timeout_ms: u32,
    /// Wait for each further card of a multi-card answer
    pub next_card_repeat_ms: u32,
    /// Re-prompts allowed before the game gives up (at least 1)
    pub max_repeat: u8,
}

impl Default for GameTiming {
    fn default() -> Self {
        Self {
            answer_timeout_ms: 25_000,
            next_card_repeat_ms: 18_000,
            max_repeat: 3,
        }
    }
}

impl GameTiming {
    /// `max_repeat`, never below 1
    pub fn max_repeat(&self) -> u8 {
        self.max_repeat.max(1)
    }

    /// "Need another card" reminders allowed before the prompt is replayed
    pub fn max_next_card_reminders(&self) -> u8 {
        self.max_repeat().saturating_sub(1).max(1)
    }
}

/// One question of a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub audio: QuestionAudio,
    pub rule: AnswerRule,
}

/// Per-question overrides of the game's correct/wrong cues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAudio {
    pub correct: Option<String>,
    pub wrong: Option<String>,
}

impl Question {
    /// Cue for a correct answer: question override, else the game's.
    pub fn correct_cue<'a>(&'a self, game: &'a GameDef) -> Option<&'a str> {
        self.audio
            .correct
            .as_deref()
            .or(game.audio.correct.as_deref())
    }

    /// Cue for a wrong answer: question override, else the game's.
    pub fn wrong_cue<'a>(&'a self, game: &'a GameDef) -> Option<&'a str> {
        self.audio.wrong.as_deref().or(game.audio.wrong.as_deref())
    }
}

/// How tags of the pending cards are matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
    /// At least one rule tag appears on the cards
    #[default]
    Any,
    /// Every rule tag appears on the cards
    All,
}

/// Predicate over the collected cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerRule {
    RequireTags {
        mode: TagMode,
        tags: Vec<String>,
        cards: u8,
    },
    Sum {
        equals: i32,
        cards: u8,
        required_tags: Vec<String>,
    },
}

impl AnswerRule {
    /// Cards required to evaluate, clamped to `1..=MAX_PENDING`.
    pub fn cards_required(&self) -> usize {
        let cards = match self {
            Self::RequireTags { cards, .. } | Self::Sum { cards, .. } => *cards,
        };
        (cards as usize).clamp(1, MAX_PENDING)
    }
}

/// An answer card collected for the current question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCard {
    pub uid: String,
    pub tags: Vec<String>,
    pub value: Option<i32>,
}

impl PendingCard {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
