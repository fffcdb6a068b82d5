//! Control loop
//!
//! One cooperative executor that owns every piece of device state except the
//! render worker's. Each [`Controller::tick`]:
//!
//! ```text
//! 1. buttons          -> play/pause, next/prev, volume, music mode
//! 2. game tick        -> cue transitions once audio is idle
//! 3. worker events    -> auto-advance / playlist end (music mode only)
//! 4. volume           -> debounced save
//! 5. tag scanner      -> at most every rfid_poll_ms
//! 6. display          -> on change, or every display_refresh_ms
//! ```
//!
//! Nothing here blocks: commands go to the worker through the bounded queue
//! and a full queue drops the command with a warning.

use std::path::Path;
use std::sync::Arc;

use tagtune_core::clock::elapsed;
use tagtune_core::{
    AudioOutput, ButtonAction, ButtonInput, Catalog, Deadline, Display, Millis, MusicPlay,
    ParentAction, SettingsStore, StatusFlags, StatusFrame, TagScanner, TrackSource,
};
use tagtune_game::{GameEngine, GameState};
use tagtune_playback::{
    ActivePlaylist, AntiRepeatGate, GateDecision, PlaybackControl, WorkerEvent, Volume,
};
use tagtune_storage::{VolumePersister, KEY_LAST_PATH, KEY_VOLUME};
use tracing::{debug, info, warn};

use crate::boot;
use crate::error::Result;
use crate::resolver::{CardResolver, Dispatch};

/// How long a transient notice stays on the third status line
const NOTICE_MS: u32 = 1_500;

/// Loop timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub rfid_poll_ms: u32,
    pub volume_save_delay_ms: u32,
    pub early_scan_ttl_ms: u32,
    pub display_refresh_ms: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rfid_poll_ms: 25,
            volume_save_delay_ms: 800,
            early_scan_ttl_ms: 5_000,
            display_refresh_ms: 1_000,
        }
    }
}

/// Peripherals and platform services the controller drives
pub struct Devices {
    pub scanner: Box<dyn TagScanner>,
    pub buttons: Box<dyn ButtonInput>,
    pub display: Box<dyn Display>,
    pub output: Box<dyn AudioOutput>,
    pub settings: Box<dyn SettingsStore>,
    pub tracks: Arc<dyn TrackSource>,
}

/// The device's control loop
pub struct Controller {
    resolver: CardResolver,
    playback: PlaybackControl,
    game: GameEngine,
    playlist: ActivePlaylist,
    gate: AntiRepeatGate,
    volume: Volume,
    persister: VolumePersister,
    last_path: Option<String>,
    devices: Devices,
    options: ControllerOptions,
    last_scan_poll: Option<Millis>,
    notice: Option<String>,
    notice_until: Deadline,
    last_frame: Option<StatusFrame>,
    next_refresh: Deadline,
}

impl Controller {
    /// Build the controller and restore persisted volume and last track.
    pub fn new(
        catalog: Arc<Catalog>,
        playback: PlaybackControl,
        mut devices: Devices,
        options: ControllerOptions,
    ) -> Self {
        let volume = Volume::from_stored(devices.settings.get_int(KEY_VOLUME));
        devices.output.set_gain(volume.gain());
        info!("Loaded volume: {}%", volume.level());

        let last_path = devices
            .settings
            .get_string(KEY_LAST_PATH)
            .filter(|p| !p.is_empty());
        if let Some(path) = &last_path {
            info!("Loaded last track: {}", path);
        }

        let mut game = GameEngine::new();
        game.set_early_scan_ttl(options.early_scan_ttl_ms);
        game.set_master_cue(catalog.messages().master_card_used.clone());

        Self {
            resolver: CardResolver::new(catalog),
            playback,
            game,
            playlist: ActivePlaylist::default(),
            gate: AntiRepeatGate::new(false),
            volume,
            persister: VolumePersister::new(options.volume_save_delay_ms),
            last_path,
            devices,
            options,
            last_scan_poll: None,
            notice: None,
            notice_until: Deadline::disarmed(),
            last_frame: None,
            next_refresh: Deadline::disarmed(),
        }
    }

    /// Replace the shuffle source (tests).
    pub fn with_game_engine(mut self, mut game: GameEngine) -> Self {
        game.set_early_scan_ttl(self.options.early_scan_ttl_ms);
        game.set_master_cue(self.catalog().messages().master_card_used.clone());
        self.game = game;
        self
    }

    /// One iteration of the control loop.
    pub fn tick(&mut self, now: Millis) {
        while let Some(action) = self.devices.buttons.poll_action() {
            self.handle_button(action, now);
        }

        let render_idle = self.playback.is_render_idle();
        if let Some(cue) = self.game.tick(now, render_idle) {
            self.play_cue(&cue);
        }

        while let Some(event) = self.playback.poll_event() {
            self.handle_worker_event(event);
        }

        self.persister.poll(now, self.devices.settings.as_mut());

        let poll_due = match self.last_scan_poll {
            Some(last) => elapsed(now, last) >= self.options.rfid_poll_ms,
            None => true,
        };
        if poll_due {
            self.last_scan_poll = Some(now);
            if let Some(uid) = self.devices.scanner.poll_for_uid() {
                self.handle_scan(&uid, now);
            }
        }

        self.refresh_display(now);
    }

    /// Load the catalog at `path` and swap it in, dropping the running game
    /// and playlist. On error the current catalog stays in place.
    pub fn reload_catalog(&mut self, path: &Path) -> Result<()> {
        let loaded = match boot::load_catalog(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Catalog reload failed, keeping current: {}", e);
                return Err(e);
            }
        };
        let catalog = Arc::new(loaded.catalog);
        self.game.stop();
        self.game
            .set_master_cue(catalog.messages().master_card_used.clone());
        self.playlist.clear();
        self.playback.sync_playlist(&self.playlist);
        self.resolver = CardResolver::new(catalog);
        info!("Catalog replaced");
        Ok(())
    }

    /// Write anything still pending before power-off.
    pub fn shutdown(&mut self) {
        self.persister.flush(self.devices.settings.as_mut());
    }

    // ===== Scans =====

    fn handle_scan(&mut self, uid: &str, now: Millis) {
        // A finished game stays attached until a selector or the music button
        let game_attached = self.game.game().is_some();
        match self.resolver.dispatch(uid, game_attached) {
            Dispatch::Unknown(_) => {}
            Dispatch::UnknownGame(_) => self.game.stop(),
            Dispatch::StartGame(game) => {
                info!("GAME SELECT: {}", game.id);
                self.playlist.clear();
                self.playback.sync_playlist(&self.playlist);
                if let Some(cue) = self.game.start(game, now) {
                    self.play_cue(&cue);
                }
            }
            Dispatch::Answer { uid, answer } => {
                if let Some(cue) = self.game.on_answer(&uid, &answer, now) {
                    self.play_cue(&cue);
                }
            }
            Dispatch::Parent(action) => self.handle_parent(action),
            Dispatch::MusicHint => {
                if let Some(cue) = self.game.on_music_scan() {
                    self.play_cue(&cue);
                }
            }
            Dispatch::Music(play) => self.select_music(play),
        }
    }

    fn select_music(&mut self, play: MusicPlay) {
        let tracks = Arc::clone(&self.devices.tracks);
        let first = match play {
            MusicPlay::Single(path) => self.playlist.select_single(tracks.as_ref(), &path),
            MusicPlay::AlbumFolder(folder) => self.playlist.select_folder(tracks.as_ref(), &folder),
            MusicPlay::AlbumTracks(slice) => {
                let catalog = Arc::clone(self.resolver.catalog());
                self.playlist.select_tracks(catalog.pool().slice(slice))
            }
            MusicPlay::Unplayable => {
                warn!("Music card missing play info");
                None
            }
        };

        match first {
            Some(path) => self.start_music(&path),
            None => self.playback.sync_playlist(&self.playlist),
        }
    }

    fn handle_parent(&mut self, action: ParentAction) {
        let catalog = Arc::clone(self.resolver.catalog());
        let messages = catalog.messages();
        let cue = match action {
            ParentAction::ToggleAntiRepeat => {
                let enabled = self.gate.toggle();
                info!("Anti-repeat {}", if enabled { "on" } else { "off" });
                self.show_notice(if enabled { "Anti-repeat on" } else { "Anti-repeat off" });
                messages.anti_repeat_toggled(enabled)
            }
            ParentAction::ToggleVolumeLock => {
                let locked = self.volume.toggle_lock();
                info!("Volume lock {}", if locked { "on" } else { "off" });
                self.show_notice(if locked { "Volume locked" } else { "Volume unlocked" });
                messages.volume_lock_toggled(locked)
            }
        };
        if let Some(cue) = cue {
            self.play_cue(cue);
        }
    }

    // ===== Buttons =====

    fn handle_button(&mut self, action: ButtonAction, now: Millis) {
        debug!("BTN: {:?}", action);
        match action {
            ButtonAction::PlayPause => self.play_pause(),
            ButtonAction::Next => {
                if let Some(path) = self.playlist.next() {
                    self.start_music(&path);
                }
            }
            ButtonAction::Prev => {
                if let Some(path) = self.playlist.prev() {
                    self.start_music(&path);
                }
            }
            ButtonAction::VolumeUp => self.change_volume(true, now),
            ButtonAction::VolumeDown => self.change_volume(false, now),
            ButtonAction::MusicMode => {
                info!("MODE: MUSIC");
                if self.game.game().is_some() {
                    self.game.stop();
                    let catalog = Arc::clone(self.resolver.catalog());
                    if let Some(cue) = &catalog.messages().music_mode_info {
                        self.play_cue(cue);
                    }
                }
            }
        }
    }

    fn play_pause(&mut self) {
        if self.playback.snapshot().is_playing {
            if let Err(e) = self.playback.toggle_pause() {
                warn!("Pause dropped: {}", e);
            }
            return;
        }
        if self.game.game().is_some() {
            debug!("Play ignored while a game is selected");
            return;
        }

        if self.playlist.is_ended() {
            if let Some(path) = self.playlist.restart() {
                self.start_music(&path);
                return;
            }
        }

        match self.last_path.clone() {
            Some(path) => {
                if self.playlist.is_empty() {
                    self.playlist
                        .select_single(self.devices.tracks.as_ref(), &path);
                }
                self.start_music(&path);
            }
            None => {
                info!("Nothing to play");
                self.show_notice("Nothing to play");
            }
        }
    }

    fn change_volume(&mut self, up: bool, now: Millis) {
        if self.volume.is_locked() {
            debug!("Volume locked");
            self.show_notice("Volume locked");
            return;
        }
        let changed = if up {
            self.volume.step_up()
        } else {
            self.volume.step_down()
        };
        if changed {
            self.devices.output.set_gain(self.volume.gain());
            self.persister.note_change(self.volume.level(), now);
            info!("Volume: {}%", self.volume.level());
        }
    }

    // ===== Worker events =====

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        if self.game.game().is_some() {
            debug!("Ignoring {:?} during a game", event);
            return;
        }
        match event {
            WorkerEvent::AdvanceRequested { index } => {
                if let Some(path) = self.playlist.jump(index) {
                    self.start_music(&path);
                }
            }
            WorkerEvent::PlaylistEnded => {
                info!("Playlist ended");
                self.playlist.mark_ended();
                self.playback.sync_playlist(&self.playlist);
            }
        }
    }

    // ===== Output =====

    /// Start a music track: passes the anti-repeat gate and is remembered.
    fn start_music(&mut self, path: &str) {
        if self.gate.check(path) == GateDecision::Block {
            let catalog = Arc::clone(self.resolver.catalog());
            if let Some(cue) = &catalog.messages().anti_repeat_warning {
                self.play_cue(cue);
            }
            return;
        }

        self.playback.sync_playlist(&self.playlist);
        if let Err(e) = self.playback.play_file(path) {
            warn!("Play dropped: {}", e);
            return;
        }
        info!("Play: {}", path);

        self.last_path = Some(path.to_string());
        if let Err(e) = self.devices.settings.put_string(KEY_LAST_PATH, path) {
            warn!("Failed to save last track: {}", e);
        }
    }

    /// Play a game cue or notice; no gate, not remembered, and its end
    /// does not move the playlist on.
    fn play_cue(&mut self, path: &str) {
        debug!("Cue: {}", path);
        if let Err(e) = self.playback.play_cue(path) {
            warn!("Cue dropped: {}", e);
        }
    }

    fn show_notice(&mut self, text: &str) {
        self.notice = Some(text.to_string());
        self.notice_until.clear();
    }

    // ===== Display =====

    fn refresh_display(&mut self, now: Millis) {
        if self.notice.is_some() {
            if !self.notice_until.is_armed() {
                self.notice_until.arm(now, NOTICE_MS);
            } else if self.notice_until.expired(now) {
                self.notice = None;
                self.notice_until.clear();
            }
        }

        let frame = self.status_frame();
        let changed = self.last_frame.as_ref() != Some(&frame);
        if changed || self.next_refresh.expired(now) || !self.next_refresh.is_armed() {
            self.devices.display.render(&frame);
            self.last_frame = Some(frame);
            self.next_refresh.arm(now, self.options.display_refresh_ms);
        }
    }

    /// What the status readout shows right now
    pub fn status_frame(&self) -> StatusFrame {
        let snap = self.playback.snapshot();
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::PLAYING, snap.is_audible());
        flags.set(StatusFlags::PAUSED, snap.is_playing && snap.is_paused);
        flags.set(StatusFlags::GAME, self.game.game().is_some());
        flags.set(StatusFlags::ANTI_REPEAT, self.gate.is_enabled());
        flags.set(StatusFlags::VOLUME_LOCK, self.volume.is_locked());

        let (line1, line2, mut line3) = match self.game.game() {
            Some(game) => (
                game.title.clone(),
                format!(
                    "Question {}/{}",
                    self.game.question_number().min(self.game.question_count()),
                    self.game.question_count()
                ),
                game_state_label(self.game.state()).to_string(),
            ),
            None => {
                let track = match (self.playlist.index(), self.playlist.current()) {
                    (Some(i), Some(path)) => {
                        format!("{}/{} {}", i + 1, self.playlist.len(), file_name(path))
                    }
                    _ => "-".to_string(),
                };
                let state = if snap.is_playing && snap.is_paused {
                    "Paused"
                } else if snap.is_playing {
                    "Playing"
                } else if self.playlist.is_ended() {
                    "Ended"
                } else {
                    "Stopped"
                };
                ("Music".to_string(), track, state.to_string())
            }
        };
        if let Some(notice) = &self.notice {
            line3 = notice.clone();
        }

        StatusFrame {
            line1,
            line2,
            line3,
            volume_percent: self.volume.level(),
            flags,
        }
    }

    // ===== Accessors =====

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.resolver.catalog()
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn playlist(&self) -> &ActivePlaylist {
        &self.playlist
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn anti_repeat_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub fn last_path(&self) -> Option<&str> {
        self.last_path.as_deref()
    }

    pub fn playback(&self) -> &PlaybackControl {
        &self.playback
    }
}

fn game_state_label(state: GameState) -> &'static str {
    match state {
        GameState::Idle => "Idle",
        GameState::Intro => "Intro",
        GameState::Prompt => "Listen",
        GameState::Collect => "Your answer?",
        GameState::Feedback => "...",
        GameState::Done => "Well done!",
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_device_timings() {
        let options = ControllerOptions::default();
        assert_eq!(options.rfid_poll_ms, 25);
        assert_eq!(options.volume_save_delay_ms, 800);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/music/rain.mp3"), "rain.mp3");
        assert_eq!(file_name("rain.mp3"), "rain.mp3");
    }

    #[test]
    fn test_collect_state_asks_for_answer() {
        assert_eq!(game_state_label(GameState::Collect), "Your answer?");
        assert_eq!(game_state_label(GameState::Done), "Well done!");
    }
}
