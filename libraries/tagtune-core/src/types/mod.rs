//! Catalog domain types

mod card;
mod game;
mod messages;
mod track;

pub use card::{normalize_uid, AnswerCard, CardEntry, CardRole, MusicPlay, ParentAction, MASTER_TAG};
pub use game::{AnswerRule, GameAudio, GameDef, GameTiming, PendingCard, Question, QuestionAudio, TagMode};
pub use messages::CueMessages;
pub use track::{normalize_path, PoolSlice, TrackItem, TrackPool};
