//! Game state machine

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tagtune_core::clock::elapsed;
use tagtune_core::{AnswerCard, Deadline, GameDef, Millis, PendingCard, Question};
use tracing::{debug, info, warn};

use crate::rules;

/// How long an answer scanned outside `Collect` stays usable
pub const DEFAULT_EARLY_SCAN_TTL_MS: u32 = 5_000;

/// Where the game is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// No game
    Idle,
    /// Intro cue playing
    Intro,
    /// Question prompt playing
    Prompt,
    /// Waiting for answer cards
    Collect,
    /// A cue about the answer (or a notice) is playing
    Feedback,
    /// All questions answered
    Done,
}

/// Result of evaluating the collected cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

/// What to do once a music-hint notice finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterNotice {
    ReplayPrompt,
    Collect,
    /// Finish the feedback the notice interrupted
    Resume,
}

/// An answer scanned while not collecting
#[derive(Debug, Clone)]
struct BufferedScan {
    uid: String,
    answer: AnswerCard,
    at: Millis,
}

/// The game rule engine
#[derive(Debug)]
pub struct GameEngine {
    game: Option<Arc<GameDef>>,
    state: GameState,
    /// Shuffled question indices
    order: Vec<usize>,
    /// Position in `order`
    position: usize,
    pending: Vec<PendingCard>,
    verdict: Option<Verdict>,
    deadline: Deadline,
    /// Re-prompts caused by inactivity on the current question
    repeat_count: u8,
    /// "Need another card" reminders since the last card
    next_card_reminders: u8,
    notice: Option<AfterNotice>,
    /// Return to idle once the current cue finishes
    stop_after_cue: bool,
    early_scan: Option<BufferedScan>,
    early_scan_ttl_ms: u32,
    master_cue: Option<String>,
    rng: StdRng,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl GameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a fixed shuffle seed
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            game: None,
            state: GameState::Idle,
            order: Vec::new(),
            position: 0,
            pending: Vec::new(),
            verdict: None,
            deadline: Deadline::disarmed(),
            repeat_count: 0,
            next_card_reminders: 0,
            notice: None,
            stop_after_cue: false,
            early_scan: None,
            early_scan_ttl_ms: DEFAULT_EARLY_SCAN_TTL_MS,
            master_cue: None,
            rng,
        }
    }

    /// Cue played when a master card resolves a question.
    pub fn set_master_cue(&mut self, cue: Option<String>) {
        self.master_cue = cue;
    }

    pub fn set_early_scan_ttl(&mut self, ttl_ms: u32) {
        self.early_scan_ttl_ms = ttl_ms;
    }

    // ===== Lifecycle =====

    /// Start `game` from scratch, replacing any running game.
    pub fn start(&mut self, game: Arc<GameDef>, now: Millis) -> Option<String> {
        self.reset();

        self.order = (0..game.questions.len()).collect();
        self.order.shuffle(&mut self.rng);
        self.game = Some(Arc::clone(&game));

        if game.questions.is_empty() {
            warn!("Game {} has no questions", game.id);
            self.state = GameState::Done;
            return game.audio.done.clone();
        }

        if let Some(intro) = &game.audio.intro {
            info!("Game start (intro): {}", game.id);
            self.state = GameState::Intro;
            return Some(intro.clone());
        }

        info!("Game start (no intro): {}", game.id);
        debug!("Question order {:?} at {}", self.order, now);
        self.play_current_prompt()
    }

    /// Leave the game and drop all runtime state.
    pub fn stop(&mut self) {
        if self.game.is_some() {
            info!("Game stopped");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.game = None;
        self.state = GameState::Idle;
        self.order.clear();
        self.position = 0;
        self.clear_pending();
        self.verdict = None;
        self.repeat_count = 0;
        self.notice = None;
        self.stop_after_cue = false;
        self.early_scan = None;
    }

    // ===== Inputs =====

    /// An answer card was scanned.
    ///
    /// Collected while in `Collect`; buffered while the game is busy in any
    /// other state; ignored without a game.
    pub fn on_answer(&mut self, uid: &str, answer: &AnswerCard, now: Millis) -> Option<String> {
        if !self.is_running() {
            debug!("Answer card {} ignored, no game running", uid);
            return None;
        }

        if self.state != GameState::Collect {
            let scan = BufferedScan {
                uid: uid.to_string(),
                answer: answer.clone(),
                at: now,
            };
            if let Some(previous) = self.early_scan.replace(scan) {
                debug!("Early scan {} replaced by {}", previous.uid, uid);
            } else {
                debug!("Early scan {} buffered", uid);
            }
            return None;
        }

        self.collect(uid, answer, now)
    }

    /// A music card was scanned while the game runs: play the hint.
    pub fn on_music_scan(&mut self) -> Option<String> {
        if !self.is_running() || self.stop_after_cue {
            return None;
        }
        let hint = self.game.as_ref()?.audio.music_hint.clone();
        let Some(hint) = hint else {
            debug!("Music card ignored, game has no hint cue");
            return None;
        };

        let after = match self.state {
            GameState::Collect if !self.pending.is_empty() => AfterNotice::Collect,
            GameState::Feedback => self.notice.unwrap_or(AfterNotice::Resume),
            _ => AfterNotice::ReplayPrompt,
        };
        self.notice = Some(after);
        self.state = GameState::Feedback;
        Some(hint)
    }

    /// Advance timers and cue-driven transitions.
    ///
    /// Does nothing while audio is still rendering.
    pub fn tick(&mut self, now: Millis, render_idle: bool) -> Option<String> {
        if !render_idle {
            return None;
        }
        let game = Arc::clone(self.game.as_ref()?);

        if self.stop_after_cue {
            self.stop();
            return None;
        }

        match self.state {
            GameState::Idle | GameState::Done => None,
            GameState::Intro => self.play_current_prompt(),
            GameState::Prompt => {
                self.clear_pending();
                self.enter_collect(now)
            }
            GameState::Collect => self.check_timeouts(&game, now),
            GameState::Feedback => self.finish_feedback(&game, now),
        }
    }

    // ===== Collecting =====

    fn collect(&mut self, uid: &str, answer: &AnswerCard, now: Millis) -> Option<String> {
        let game = Arc::clone(self.game.as_ref()?);
        let question = self.current_question(&game)?;

        if answer.is_master() {
            info!("Master card {} used", uid);
            self.clear_pending();
            self.verdict = Some(Verdict::Correct);
            self.state = GameState::Feedback;
            return self
                .master_cue
                .clone()
                .or_else(|| question.correct_cue(&game).map(str::to_string));
        }

        let need = question.rule.cards_required();
        if self.pending.len() >= need {
            return None;
        }

        let card = PendingCard {
            uid: uid.to_string(),
            tags: answer.tags.clone(),
            value: answer.value,
        };
        let contributes = rules::card_can_contribute(&question.rule, &card);
        self.pending.push(card);
        debug!("Collected answer {}/{}", self.pending.len(), need);

        if self.pending.len() < need {
            if !contributes {
                info!("Card {} cannot complete the answer", uid);
                self.clear_pending();
                self.verdict = Some(Verdict::Wrong);
                self.state = GameState::Feedback;
                return question.wrong_cue(&game).map(str::to_string);
            }

            self.next_card_reminders = 0;
            self.deadline.arm(now, game.timing.next_card_repeat_ms);
            let cue = game.audio.next_card_for_answer.clone();
            if cue.is_some() {
                self.state = GameState::Feedback;
            }
            return cue;
        }

        let verdict = if rules::evaluate(&question.rule, &self.pending) {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };
        info!("Answer {:?}", verdict);
        self.verdict = Some(verdict);
        self.deadline.clear();
        self.state = GameState::Feedback;
        match verdict {
            Verdict::Correct => question.correct_cue(&game),
            Verdict::Wrong => question.wrong_cue(&game),
        }
        .map(str::to_string)
    }

    fn enter_collect(&mut self, now: Millis) -> Option<String> {
        self.state = GameState::Collect;
        debug!("Collecting answers");

        let scan = self.early_scan.take()?;
        if elapsed(now, scan.at) > self.early_scan_ttl_ms {
            debug!("Early scan {} expired", scan.uid);
            return None;
        }
        debug!("Replaying early scan {}", scan.uid);
        self.collect(&scan.uid, &scan.answer, now)
    }

    fn check_timeouts(&mut self, game: &GameDef, now: Millis) -> Option<String> {
        let question = self.current_question(game)?;
        let need = question.rule.cards_required();
        let timing = game.timing;

        if !self.deadline.is_armed() {
            if self.pending.is_empty() {
                self.deadline.arm(now, timing.answer_timeout_ms);
            } else if self.pending.len() < need {
                self.deadline.arm(now, timing.next_card_repeat_ms);
            }
        }
        if !self.deadline.expired(now) {
            return None;
        }

        if !self.pending.is_empty() && self.pending.len() < need {
            if self.next_card_reminders >= timing.max_next_card_reminders() {
                self.repeat_count += 1;
                info!(
                    "No further card, repeating question ({}/{})",
                    self.repeat_count,
                    timing.max_repeat()
                );
                self.clear_pending();
                if self.repeat_count >= timing.max_repeat() {
                    return self.abort(game);
                }
                self.state = GameState::Prompt;
                return Some(question.prompt.clone());
            }

            self.next_card_reminders += 1;
            self.deadline.arm(now, timing.next_card_repeat_ms);
            let cue = game.audio.next_card_for_answer.clone();
            if cue.is_some() {
                self.state = GameState::Feedback;
            }
            return cue;
        }

        if self.pending.is_empty() {
            self.repeat_count += 1;
            if self.repeat_count >= timing.max_repeat() {
                return self.abort(game);
            }
            info!(
                "No answer, repeating prompt ({}/{})",
                self.repeat_count,
                timing.max_repeat()
            );
            self.deadline.clear();
            self.state = GameState::Prompt;
            return Some(question.prompt.clone());
        }

        None
    }

    /// Give up on an unattended game.
    fn abort(&mut self, game: &GameDef) -> Option<String> {
        info!("Game {} stopped after inactivity", game.id);
        match &game.audio.idle_stop {
            Some(cue) => {
                self.stop_after_cue = true;
                self.notice = None;
                self.state = GameState::Feedback;
                Some(cue.clone())
            }
            None => {
                self.stop();
                None
            }
        }
    }

    // ===== Feedback =====

    fn finish_feedback(&mut self, game: &GameDef, now: Millis) -> Option<String> {
        if let Some(after) = self.notice.take() {
            match after {
                AfterNotice::ReplayPrompt => {
                    let question = self.current_question(game)?;
                    self.state = GameState::Prompt;
                    return Some(question.prompt.clone());
                }
                AfterNotice::Collect => return self.enter_collect(now),
                AfterNotice::Resume => {}
            }
        }

        let need = self
            .current_question(game)
            .map_or(1, |q| q.rule.cards_required());
        if self.verdict.is_none() && !self.pending.is_empty() && self.pending.len() < need {
            return self.enter_collect(now);
        }

        match self.verdict.take() {
            Some(Verdict::Correct) => {
                self.position += 1;
                self.clear_pending();
                if self.position >= self.order.len() {
                    info!("Game {} done", game.id);
                    self.state = GameState::Done;
                    return game.audio.done.clone();
                }
                self.play_current_prompt()
            }
            Some(Verdict::Wrong) | None => self.play_current_prompt(),
        }
    }

    fn play_current_prompt(&mut self) -> Option<String> {
        self.repeat_count = 0;
        self.clear_pending();
        self.verdict = None;

        let game = Arc::clone(self.game.as_ref()?);
        let Some(question) = self.current_question(&game) else {
            self.state = GameState::Done;
            return None;
        };
        debug!("Question {}/{}", self.position + 1, self.order.len());
        self.state = GameState::Prompt;
        Some(question.prompt.clone())
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        self.deadline.clear();
        self.next_card_reminders = 0;
    }

    fn current_question<'a>(&self, game: &'a GameDef) -> Option<&'a Question> {
        self.order
            .get(self.position)
            .and_then(|&i| game.questions.get(i))
    }

    // ===== Accessors =====

    pub fn state(&self) -> GameState {
        self.state
    }

    /// A game is active and not finished
    pub fn is_running(&self) -> bool {
        self.game.is_some() && !matches!(self.state, GameState::Idle | GameState::Done)
    }

    pub fn game(&self) -> Option<&Arc<GameDef>> {
        self.game.as_ref()
    }

    pub fn pending(&self) -> &[PendingCard] {
        &self.pending
    }

    /// 1-based number of the current question
    pub fn question_number(&self) -> usize {
        self.position + 1
    }

    pub fn question_count(&self) -> usize {
        self.order.len()
    }

    /// Prompt path of the current question
    pub fn current_prompt(&self) -> Option<&str> {
        let game = self.game.as_ref()?;
        self.current_question(game).map(|q| q.prompt.as_str())
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }
}
