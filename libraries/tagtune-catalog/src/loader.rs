//! Conversion from the raw document to a validated catalog

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tagtune_core::limits::{
    MAX_CARDS, MAX_CARD_TAGS, MAX_GAMES, MAX_PATH_LEN, MAX_PENDING, MAX_POOL_TRACKS,
    MAX_QUESTIONS, MAX_RULE_TAGS,
};
use tagtune_core::{
    normalize_path, normalize_uid, AnswerCard, AnswerRule, CardEntry, CardRole, Catalog,
    CoreError, CueMessages, GameAudio, GameDef, GameTiming, MusicPlay, ParentAction, Question,
    QuestionAudio, TagMode, TrackItem,
};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::raw::{RawAnswer, RawCard, RawGame, RawPlay, RawQuestion};
use crate::report::{LoadReport, LoadWarning};

/// A freshly loaded catalog and what had to be adjusted to build it
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub report: LoadReport,
}

/// Read and load a catalog file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<LoadedCatalog> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loading catalog from {:?}", path);
    load_from_str(&text)
}

/// Load a catalog from JSON text.
pub fn load_from_str(text: &str) -> Result<LoadedCatalog> {
    let doc: Value = serde_json::from_str(text)?;
    load_from_value(doc)
}

/// Load a catalog from an already parsed document.
pub fn load_from_value(doc: Value) -> Result<LoadedCatalog> {
    let Value::Object(mut root) = doc else {
        return Err(CatalogError::NotAnObject);
    };

    let Some(Value::Array(cards)) = root.remove("cards") else {
        return Err(CatalogError::MissingSection("cards"));
    };

    let mut builder = Builder::default();
    builder.load_cards(cards);

    match root.remove("games") {
        Some(Value::Array(games)) => builder.load_games(games),
        Some(_) => builder.report.push(LoadWarning::Skipped {
            section: "games",
            index: 0,
            reason: "not an array".to_string(),
        }),
        None => {}
    }

    if let Some(messages) = root.remove("messages") {
        builder.load_messages(messages);
    }

    let Builder { catalog, report } = builder;
    info!(
        "Catalog loaded: {} cards, {} games, {} pool tracks, {} warnings",
        catalog.cards().len(),
        catalog.games().len(),
        catalog.pool().len(),
        report.warnings().len()
    );

    Ok(LoadedCatalog { catalog, report })
}

#[derive(Default)]
struct Builder {
    catalog: Catalog,
    report: LoadReport,
}

impl Builder {
    // ===== Cards =====

    fn load_cards(&mut self, cards: Vec<Value>) {
        let mut overflow = 0;

        for (index, value) in cards.into_iter().enumerate() {
            if self.catalog.cards().len() >= MAX_CARDS {
                overflow += 1;
                continue;
            }

            let raw: RawCard = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    self.skip("cards", index, e.to_string());
                    continue;
                }
            };

            let uid = normalize_uid(&raw.uid);
            if uid.is_empty() {
                self.skip("cards", index, "missing uid");
                continue;
            }
            if self.catalog.card(&uid).is_some() {
                self.report.push(LoadWarning::DuplicateUid(uid));
                continue;
            }

            let Some(card) = self.convert_card(index, uid, raw) else {
                continue;
            };

            match self.catalog.push_card(card) {
                Ok(()) => {}
                Err(CoreError::DuplicateUid(uid)) => {
                    self.report.push(LoadWarning::DuplicateUid(uid));
                }
                Err(e) => self.skip("cards", index, e.to_string()),
            }
        }

        if overflow > 0 {
            self.report.push(LoadWarning::Truncated {
                what: "cards".to_string(),
                limit: MAX_CARDS,
                dropped: overflow,
            });
        }
    }

    fn convert_card(&mut self, index: usize, uid: String, raw: RawCard) -> Option<CardEntry> {
        let role = match raw.role.trim() {
            "music" => CardRole::Music {
                play: self.convert_play(&uid, raw.play),
            },
            "answer" => CardRole::Answer(AnswerCard {
                tags: self.collect_tags(raw.tags, MAX_CARD_TAGS, || format!("card {uid} tags")),
                // Negative values mean "no value", as on older catalogs
                value: raw
                    .value
                    .and_then(|v| i32::try_from(v).ok())
                    .filter(|v| *v >= 0),
            }),
            "game_selector" => CardRole::GameSelector {
                game_id: raw.game_id.unwrap_or_default().trim().to_string(),
            },
            "parent" => {
                let action = raw.action.as_deref().and_then(ParentAction::parse);
                let Some(action) = action else {
                    self.skip(
                        "cards",
                        index,
                        format!("parent card {uid} has unknown action {:?}", raw.action),
                    );
                    return None;
                };
                CardRole::Parent { action }
            }
            other => {
                self.report.push(LoadWarning::UnknownRole {
                    uid,
                    role: other.to_string(),
                });
                return None;
            }
        };

        Some(CardEntry {
            uid,
            title: raw.title,
            artist: raw.artist.filter(|a| !a.is_empty()),
            role,
        })
    }

    fn convert_play(&mut self, uid: &str, play: Option<RawPlay>) -> MusicPlay {
        let play = play.unwrap_or_default();

        let resolved = match play.kind.trim() {
            "single" => play.file.as_deref().and_then(|f| self.path(f)).map(MusicPlay::Single),
            "album" | "playlist" => {
                if let Some(folder) = play.folder.as_deref().and_then(|f| self.path(f)) {
                    Some(MusicPlay::AlbumFolder(folder))
                } else {
                    play.tracks.and_then(|tracks| self.convert_tracks(tracks))
                }
            }
            _ => None,
        };

        resolved.unwrap_or_else(|| {
            self.report.push(LoadWarning::Unplayable {
                uid: uid.to_string(),
            });
            MusicPlay::Unplayable
        })
    }

    fn convert_tracks(&mut self, tracks: Vec<Value>) -> Option<MusicPlay> {
        let mut items = Vec::with_capacity(tracks.len());
        for track in tracks {
            let item = match track {
                Value::String(file) => self.path(&file).map(|file| TrackItem {
                    title: None,
                    artist: None,
                    file,
                }),
                Value::Object(obj) => {
                    let text = |key: &str| {
                        obj.get(key)
                            .and_then(Value::as_str)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                    };
                    let (title, artist) = (text("title"), text("artist"));
                    text("file")
                        .and_then(|f| self.path(&f))
                        .map(|file| TrackItem {
                            title,
                            artist,
                            file,
                        })
                }
                _ => None,
            };
            items.extend(item);
        }

        let (slice, dropped) = self.catalog.pool_mut().append_album(items);
        if dropped > 0 {
            self.report.push(LoadWarning::Truncated {
                what: "track pool".to_string(),
                limit: MAX_POOL_TRACKS,
                dropped,
            });
        }

        (!slice.is_empty()).then_some(MusicPlay::AlbumTracks(slice))
    }

    // ===== Games =====

    fn load_games(&mut self, games: Vec<Value>) {
        let mut overflow = 0;

        for (index, value) in games.into_iter().enumerate() {
            if self.catalog.games().len() >= MAX_GAMES {
                overflow += 1;
                continue;
            }

            let raw: RawGame = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    self.skip("games", index, e.to_string());
                    continue;
                }
            };

            let id = raw.id.trim().to_string();
            if id.is_empty() {
                self.skip("games", index, "missing id");
                continue;
            }

            let game = self.convert_game(id, raw);
            match self.catalog.push_game(game) {
                Ok(()) => {}
                Err(CoreError::DuplicateGame(id)) => {
                    self.report.push(LoadWarning::DuplicateGame(id));
                }
                Err(e) => self.skip("games", index, e.to_string()),
            }
        }

        if overflow > 0 {
            self.report.push(LoadWarning::Truncated {
                what: "games".to_string(),
                limit: MAX_GAMES,
                dropped: overflow,
            });
        }
    }

    fn convert_game(&mut self, id: String, raw: RawGame) -> GameDef {
        let audio = GameAudio {
            intro: self.cue(raw.audio.intro),
            correct: self.cue(raw.audio.correct),
            wrong: self.cue(raw.audio.wrong),
            done: self.cue(raw.audio.done),
            next_card_for_answer: self.cue(raw.audio.next_card_for_answer),
            music_hint: self.cue(raw.audio.music_hint),
            idle_stop: self.cue(raw.audio.idle_stop),
        };

        let defaults = GameTiming::default();
        let timing = GameTiming {
            answer_timeout_ms: raw
                .timing
                .answer_timeout_ms
                .map_or(defaults.answer_timeout_ms, clamp_u32),
            next_card_repeat_ms: raw
                .timing
                .next_card_repeat_ms
                .map_or(defaults.next_card_repeat_ms, clamp_u32),
            max_repeat: match raw.timing.max_repeat {
                Some(requested) => self.repeat_limit(&id, requested),
                None => defaults.max_repeat,
            },
        };

        let total = raw.questions.len();
        let mut questions = Vec::with_capacity(total.min(MAX_QUESTIONS));
        for (index, value) in raw.questions.into_iter().take(MAX_QUESTIONS).enumerate() {
            let raw_question: RawQuestion = match serde_json::from_value(value) {
                Ok(q) => q,
                Err(e) => {
                    self.skip("questions", index, format!("game {id}: {e}"));
                    continue;
                }
            };
            if let Some(question) = self.convert_question(&id, index, raw_question) {
                questions.push(question);
            }
        }
        if total > MAX_QUESTIONS {
            self.report.push(LoadWarning::Truncated {
                what: format!("game {id} questions"),
                limit: MAX_QUESTIONS,
                dropped: total - MAX_QUESTIONS,
            });
        }

        GameDef {
            id,
            title: raw.title,
            audio,
            timing,
            questions,
        }
    }

    fn repeat_limit(&mut self, game: &str, requested: i64) -> u8 {
        let used = requested.clamp(1, i64::from(u8::MAX));
        if used != requested {
            self.report.push(LoadWarning::RepeatClamped {
                game: game.to_string(),
                requested,
                used: used as u8,
            });
        }
        used as u8
    }

    fn convert_question(&mut self, game: &str, index: usize, raw: RawQuestion) -> Option<Question> {
        let Some(prompt) = self.path(&raw.prompt) else {
            self.skip("questions", index, format!("game {game}: missing prompt"));
            return None;
        };

        let audio = match raw.audio {
            Some(a) => QuestionAudio {
                correct: self.cue(a.correct),
                wrong: self.cue(a.wrong),
            },
            None => QuestionAudio::default(),
        };

        Some(Question {
            prompt,
            audio,
            rule: self.convert_rule(game, index, raw.answer),
        })
    }

    fn convert_rule(&mut self, game: &str, question: usize, raw: RawAnswer) -> AnswerRule {
        let requested = raw.cards.unwrap_or(1);
        let used = requested.clamp(1, MAX_PENDING as i64);
        if used != requested {
            self.report.push(LoadWarning::CardsClamped {
                game: game.to_string(),
                question,
                requested,
                used: used as u8,
            });
        }
        let cards = used as u8;

        let tags = self.collect_tags(raw.tags, MAX_RULE_TAGS, || {
            format!("game {game} question {question} rule tags")
        });

        match raw.rule_type.as_deref().map(str::trim).unwrap_or("requireTags") {
            "requireTags" => AnswerRule::RequireTags {
                mode: parse_mode(raw.mode.as_deref()),
                tags,
                cards,
            },
            "sum" => AnswerRule::Sum {
                equals: raw
                    .equals
                    .unwrap_or(0)
                    .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
                cards,
                required_tags: tags,
            },
            other => {
                self.report.push(LoadWarning::UnknownRuleType {
                    game: game.to_string(),
                    question,
                    rule_type: other.to_string(),
                });
                AnswerRule::RequireTags {
                    mode: TagMode::Any,
                    tags: Vec::new(),
                    cards,
                }
            }
        }
    }

    // ===== Messages =====

    fn load_messages(&mut self, messages: Value) {
        let Value::Object(map) = messages else {
            self.skip("messages", 0, "not an object");
            return;
        };
        let messages = self.convert_messages(map);
        self.catalog.set_messages(messages);
    }

    fn convert_messages(&mut self, map: Map<String, Value>) -> CueMessages {
        let mut messages = CueMessages::default();
        for (index, (key, value)) in map.into_iter().enumerate() {
            match value.as_str().and_then(|p| self.path(p)) {
                Some(path) => messages.insert(&key, path),
                None => self.skip("messages", index, format!("'{key}' is not a usable path")),
            }
        }
        messages
    }

    // ===== Helpers =====

    fn collect_tags(
        &mut self,
        values: Vec<Value>,
        limit: usize,
        what: impl FnOnce() -> String,
    ) -> Vec<String> {
        let mut tags: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect();

        if tags.len() > limit {
            let dropped = tags.len() - limit;
            tags.truncate(limit);
            self.report.push(LoadWarning::Truncated {
                what: what(),
                limit,
                dropped,
            });
        }
        tags
    }

    fn path(&mut self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let path = normalize_path(raw);
        if path.len() > MAX_PATH_LEN {
            self.report.push(LoadWarning::PathTooLong {
                path,
                limit: MAX_PATH_LEN,
            });
            return None;
        }
        Some(path)
    }

    fn cue(&mut self, raw: Option<String>) -> Option<String> {
        raw.and_then(|p| self.path(&p))
    }

    fn skip(&mut self, section: &'static str, index: usize, reason: impl Into<String>) {
        self.report.push(LoadWarning::Skipped {
            section,
            index,
            reason: reason.into(),
        });
    }
}

fn parse_mode(mode: Option<&str>) -> TagMode {
    match mode.map(str::trim) {
        Some(m) if m.eq_ignore_ascii_case("all") => TagMode::All,
        _ => TagMode::Any,
    }
}

fn clamp_u32(ms: u64) -> u32 {
    u32::try_from(ms).unwrap_or(u32::MAX)
}
