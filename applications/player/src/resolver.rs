//! Card resolver
//!
//! Turns a scanned uid into what the controller should do with it. The
//! resolver only reads the catalog; every state change happens in the
//! controller.

use std::sync::Arc;

use tagtune_core::{AnswerCard, CardEntry, CardRole, Catalog, GameDef, MusicPlay, ParentAction};
use tracing::{debug, warn};

/// Outcome of resolving a scan
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// No card with this uid
    Unknown(String),
    /// Start (or restart) a game
    StartGame(Arc<GameDef>),
    /// Selector pointing at a game the catalog does not have
    UnknownGame(String),
    /// Hand an answer to the game engine
    Answer { uid: String, answer: AnswerCard },
    /// Flip a parental flag
    Parent(ParentAction),
    /// Select music
    Music(MusicPlay),
    /// Music card while a game runs
    MusicHint,
}

/// Looks cards up in the loaded catalog
#[derive(Debug, Clone)]
pub struct CardResolver {
    catalog: Arc<Catalog>,
}

impl CardResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Case-insensitive lookup.
    pub fn resolve(&self, uid: &str) -> Option<&CardEntry> {
        self.catalog.card(uid)
    }

    /// Decide what a scan of `uid` does given whether a game is selected.
    pub fn dispatch(&self, uid: &str, game_active: bool) -> Dispatch {
        let Some(card) = self.resolve(uid) else {
            warn!("Unknown UID: {}", uid);
            return Dispatch::Unknown(uid.to_string());
        };
        debug!("Card {} ({})", card.uid, card.label());

        match &card.role {
            CardRole::GameSelector { game_id } => match self.catalog.game(game_id) {
                Some(game) => Dispatch::StartGame(Arc::clone(game)),
                None => {
                    warn!("Card {} selects unknown game {}", card.uid, game_id);
                    Dispatch::UnknownGame(game_id.clone())
                }
            },
            CardRole::Answer(answer) => Dispatch::Answer {
                uid: card.uid.clone(),
                answer: answer.clone(),
            },
            CardRole::Parent { action } => Dispatch::Parent(*action),
            CardRole::Music { .. } if game_active => Dispatch::MusicHint,
            CardRole::Music { play } => Dispatch::Music(play.clone()),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}
