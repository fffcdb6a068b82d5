//! The loaded catalog of cards and games.
//!
//! A catalog is assembled once by a loader and then shared read-only
//! (`Arc<Catalog>`) for the rest of the session. Card lookup goes through an
//! uppercase index so scans resolve regardless of how the uid was written.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::limits::{MAX_CARDS, MAX_GAMES};
use crate::types::{normalize_uid, CardEntry, CueMessages, GameDef, TrackPool};

/// Cards, games, album tracks and device messages
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: Vec<CardEntry>,
    index: HashMap<String, usize>,
    games: Vec<Arc<GameDef>>,
    pool: TrackPool,
    messages: CueMessages,
}

impl Catalog {
    // ===== Assembly =====

    /// Add a card. Fails when the uid is taken or the card ceiling is reached.
    pub fn push_card(&mut self, mut card: CardEntry) -> Result<()> {
        card.uid = normalize_uid(&card.uid);
        if self.index.contains_key(&card.uid) {
            return Err(CoreError::DuplicateUid(card.uid));
        }
        if self.cards.len() >= MAX_CARDS {
            return Err(CoreError::CapacityExceeded {
                what: "cards",
                limit: MAX_CARDS,
            });
        }
        self.index.insert(card.uid.clone(), self.cards.len());
        self.cards.push(card);
        Ok(())
    }

    /// Add a game. Fails when the id is taken or the game ceiling is reached.
    pub fn push_game(&mut self, game: GameDef) -> Result<()> {
        if self.games.iter().any(|g| g.id == game.id) {
            return Err(CoreError::DuplicateGame(game.id));
        }
        if self.games.len() >= MAX_GAMES {
            return Err(CoreError::CapacityExceeded {
                what: "games",
                limit: MAX_GAMES,
            });
        }
        self.games.push(Arc::new(game));
        Ok(())
    }

    pub fn pool_mut(&mut self) -> &mut TrackPool {
        &mut self.pool
    }

    pub fn set_messages(&mut self, messages: CueMessages) {
        self.messages = messages;
    }

    // ===== Lookup =====

    /// Resolve a scanned uid, ignoring case.
    pub fn card(&self, uid: &str) -> Option<&CardEntry> {
        self.index
            .get(&normalize_uid(uid))
            .and_then(|&i| self.cards.get(i))
    }

    pub fn game(&self, id: &str) -> Option<&Arc<GameDef>> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn cards(&self) -> &[CardEntry] {
        &self.cards
    }

    pub fn games(&self) -> &[Arc<GameDef>] {
        &self.games
    }

    pub fn pool(&self) -> &TrackPool {
        &self.pool
    }

    pub fn messages(&self) -> &CueMessages {
        &self.messages
    }
}
