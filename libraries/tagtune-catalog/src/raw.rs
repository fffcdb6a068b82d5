//! Serde view of the catalog document.
//!
//! Every field is optional or defaulted here; validation and ceilings are
//! applied when converting to core types.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCard {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub title: String,
    pub artist: Option<String>,
    pub play: Option<RawPlay>,
    #[serde(default)]
    pub tags: Vec<Value>,
    pub value: Option<i64>,
    pub game_id: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPlay {
    #[serde(default)]
    pub kind: String,
    pub file: Option<String>,
    pub folder: Option<String>,
    pub tracks: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawGame {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub audio: RawGameAudio,
    #[serde(default)]
    pub timing: RawTiming,
    #[serde(default)]
    pub questions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGameAudio {
    pub intro: Option<String>,
    pub correct: Option<String>,
    pub wrong: Option<String>,
    pub done: Option<String>,
    pub next_card_for_answer: Option<String>,
    pub music_hint: Option<String>,
    pub idle_stop: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTiming {
    pub answer_timeout_ms: Option<u64>,
    pub next_card_repeat_ms: Option<u64>,
    pub max_repeat: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(default)]
    pub prompt: String,
    pub audio: Option<RawQuestionAudio>,
    #[serde(default)]
    pub answer: RawAnswer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawQuestionAudio {
    pub correct: Option<String>,
    pub wrong: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAnswer {
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
    pub mode: Option<String>,
    #[serde(default)]
    pub tags: Vec<Value>,
    pub cards: Option<i64>,
    pub equals: Option<i64>,
}
