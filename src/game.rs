//! Game wiring
//!
//! Owns the session and connects it to the flag client, storage,
//! telemetry and the overlay. The host calls [`Game::frame`] once per
//! display refresh and forwards input through [`Game::handle_action`].
//! Network work (initialize, identify, refresh) stays with the host;
//! the game only reads the cached snapshot.

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::bridge::SettingsBridge;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::flags::{FlagClient, FlagSource, Subscription, UserContext};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform;
use crate::profile::PlayerProfile;
use crate::renderer::{self, DrawCommand};
use crate::sim::{self, GameEvent, GamePhase, Session, TickInput};
use crate::telemetry::{self, SessionRecord, TelemetryEvent, TelemetrySink};
use crate::ui::{Overlay, status};

/// Side-effect collaborators handed to the game
pub struct Services {
    pub store: Box<dyn KeyValueStore>,
    pub telemetry: Box<dyn TelemetrySink>,
    pub overlay: Box<dyn Overlay>,
}

pub struct Game<S: FlagSource> {
    session: Session,
    bridge: SettingsBridge,
    flags: Rc<FlagClient<S>>,
    changes: Subscription,
    store: Box<dyn KeyValueStore>,
    telemetry: Box<dyn TelemetrySink>,
    overlay: Box<dyn Overlay>,
    high_score: HighScore,
    profile: Option<PlayerProfile>,
    session_id: String,
    run_started_ms: f64,
    /// Input collected since the last frame
    pending: TickInput,
    refresh_requested: bool,
}

impl<S: FlagSource> Game<S> {
    pub fn new(config: &GameConfig, flags: Rc<FlagClient<S>>, services: Services, now_ms: f64) -> Self {
        let Services {
            store,
            mut telemetry,
            mut overlay,
        } = services;

        let seed = config.seed.unwrap_or_else(platform::run_seed);
        let mut session = Session::new(seed, config.tuning.clone(), config.canvas.width);

        let high_score = HighScore::load(&*store);
        session.high_score = high_score.best();
        let profile = PlayerProfile::load(&*store);

        let bridge = SettingsBridge::new(flags.snapshot());
        let changes = flags.on_change();
        bridge.apply(&mut session, &mut *overlay);

        let mut rng = Pcg32::seed_from_u64(seed.rotate_left(32));
        let session_id = telemetry::session_id(now_ms, &mut rng);
        telemetry.emit(TelemetryEvent::SessionStarted {
            session_id: session_id.clone(),
            user_agent: platform::environment().user_agent,
        });

        overlay.show_score(0);
        overlay.show_high_score(high_score.best());
        overlay.show_status(status::READY);
        overlay.show_restart(false);
        overlay.show_welcome(profile.as_ref().map(|p| p.name.as_str()));

        log::info!(
            "Game ready: session {}, seed {}, high score {}",
            session_id,
            seed,
            high_score.best()
        );

        Self {
            session,
            bridge,
            flags,
            changes,
            store,
            telemetry,
            overlay,
            high_score,
            profile,
            session_id,
            run_started_ms: now_ms,
            pending: TickInput::default(),
            refresh_requested: false,
        }
    }

    /// The single jump/start/restart action
    pub fn handle_action(&mut self, now_ms: f64) {
        match self.session.phase {
            GamePhase::Idle => {
                self.start(now_ms);
            }
            GamePhase::GameOver => {
                self.restart(now_ms);
            }
            GamePhase::Running => self.pending.jump = true,
            GamePhase::Paused => {
                self.resume();
            }
        }
    }

    /// Begin a run with whatever snapshot is resolved right now
    pub fn start(&mut self, now_ms: f64) -> bool {
        if !self.session.start() {
            return false;
        }
        // Drop the Started event; the host already knows
        self.session.drain_events();
        self.pending = TickInput::default();
        self.run_started_ms = now_ms;

        self.bridge.apply(&mut self.session, &mut *self.overlay);
        self.telemetry.emit(TelemetryEvent::GameStarted {
            session_id: self.session_id.clone(),
            snapshot: (**self.bridge.snapshot()).clone(),
        });

        self.overlay.hide_start_overlays();
        self.overlay.show_score(0);
        self.overlay.show_status(status::RUNNING);
        self.overlay.show_restart(false);
        true
    }

    /// Start a new run and ask the host for a flag refresh.
    /// The run does not wait for the refresh.
    pub fn restart(&mut self, now_ms: f64) -> bool {
        if self.session.phase == GamePhase::Running {
            return false;
        }
        self.refresh_requested = true;
        self.start(now_ms)
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.session.pause();
        if paused {
            self.overlay.show_status(status::PAUSED);
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.session.resume();
        if resumed {
            self.overlay.show_status(status::RUNNING);
        }
        resumed
    }

    /// Queue a pause toggle for the next frame
    pub fn toggle_pause(&mut self) {
        self.pending.pause = true;
    }

    /// True once whenever the host should run [`FlagClient::refresh`]
    pub fn wants_refresh(&mut self) -> bool {
        let restart = std::mem::take(&mut self.refresh_requested);
        let stream = self.flags.take_refetch_request();
        restart || stream
    }

    /// One display frame: apply flag changes, tick, react to events.
    ///
    /// Returns whether a run is still in progress. An `Err` means the
    /// session was halted and the loop should stop.
    pub fn frame(&mut self, now_ms: f64) -> Result<bool, GameError> {
        self.sync_flags();

        if matches!(self.session.phase, GamePhase::Running | GamePhase::Paused) {
            let input = std::mem::take(&mut self.pending);
            let was_paused = self.session.phase == GamePhase::Paused;

            if let Err(e) = sim::tick(&mut self.session, &input) {
                self.session.halt(&e);
                self.process_events(now_ms);
                self.overlay.show_status(status::HALTED);
                return Err(e.into());
            }

            match (was_paused, self.session.phase) {
                (false, GamePhase::Paused) => self.overlay.show_status(status::PAUSED),
                (true, GamePhase::Running) => self.overlay.show_status(status::RUNNING),
                _ => {}
            }
            self.process_events(now_ms);
            self.overlay.show_score(self.session.score);
        }

        Ok(matches!(
            self.session.phase,
            GamePhase::Running | GamePhase::Paused
        ))
    }

    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        renderer::scene(&self.session)
    }

    /// Name entry. Stores the profile and returns the context the host
    /// should pass to [`FlagClient::identify`].
    pub fn register_player(&mut self, name: &str, now_ms: f64) -> UserContext {
        let env = platform::environment();
        let previous = PlayerProfile::load(&*self.store);
        let returning = previous.is_some();

        let mut rng = Pcg32::seed_from_u64(now_ms.to_bits());
        let mut ctx = UserContext::named(&mut rng, name, &env, now_ms, !returning);
        // Same player keeps the same targeting key
        if let Some(p) = previous
            .as_ref()
            .filter(|p| !p.key.is_empty() && p.name.eq_ignore_ascii_case(ctx.name.as_str()))
        {
            ctx.key = p.key.clone();
        }

        self.profile = Some(PlayerProfile::register(
            &*self.store,
            &ctx.name,
            &ctx.key,
            now_ms,
        ));
        self.telemetry.emit(TelemetryEvent::PlayerIdentified {
            key: ctx.key.clone(),
            name: ctx.name.clone(),
            returning,
        });
        self.overlay.hide_start_overlays();
        log::info!("Player registered: {} ({})", ctx.name, ctx.key);
        ctx
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn bridge(&self) -> &SettingsBridge {
        &self.bridge
    }

    pub fn flags(&self) -> &Rc<FlagClient<S>> {
        &self.flags
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    /// Swap in the newest snapshot, if any arrived
    fn sync_flags(&mut self) {
        self.flags.pump();
        let Some(latest) = self.changes.latest() else {
            return;
        };

        let previous = self.bridge.snapshot().clone();
        if !self.bridge.replace(latest) {
            return;
        }
        for (key, old, new) in previous.diff(self.bridge.snapshot()) {
            self.telemetry.emit(TelemetryEvent::FlagChanged {
                key: key.as_str().to_string(),
                old: old.to_string(),
                new: new.to_string(),
            });
        }
        self.bridge.apply(&mut self.session, &mut *self.overlay);
    }

    fn process_events(&mut self, now_ms: f64) {
        for event in self.session.drain_events() {
            let GameEvent::GameOver {
                score,
                frames,
                new_high_score,
            } = event
            else {
                continue;
            };

            if self.high_score.record(score) {
                self.high_score.save(&*self.store);
            }
            if let Some(profile) = self.profile.as_mut() {
                profile.record_game(now_ms);
                profile.save(&*self.store);
            }

            self.telemetry.emit(TelemetryEvent::GameEnded(SessionRecord {
                session_id: self.session_id.clone(),
                score,
                frames,
                duration_ms: now_ms - self.run_started_ms,
                new_high_score,
                snapshot: (**self.bridge.snapshot()).clone(),
            }));

            self.overlay.show_high_score(self.high_score.best());
            self.overlay.show_status(if new_high_score {
                status::NEW_HIGH_SCORE
            } else {
                status::GAME_OVER
            });
            self.overlay.show_restart(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::config::FlagServiceConfig;
    use crate::flags::{FlagKey, FlagUpdate, StaticFlagSource};
    use crate::persistence::{HIGH_SCORE_KEY, MemoryStore};
    use crate::sim::{Obstacle, ObstacleKind};
    use crate::telemetry::RecordingSink;
    use crate::ui::RecordingOverlay;

    struct Harness {
        game: Game<StaticFlagSource>,
        store: Rc<MemoryStore>,
        sink: RecordingSink,
        overlay: Rc<RefCell<RecordingOverlay>>,
    }

    fn harness_with(store: Rc<MemoryStore>, source: StaticFlagSource) -> Harness {
        let config = GameConfig {
            seed: Some(7),
            ..Default::default()
        };
        let flags = Rc::new(FlagClient::new(source, FlagServiceConfig::default()));
        pollster::block_on(flags.initialize(None));

        let sink = RecordingSink::new();
        let overlay = Rc::new(RefCell::new(RecordingOverlay::default()));
        let game = Game::new(
            &config,
            flags,
            Services {
                store: Box::new(store.clone()),
                telemetry: Box::new(sink.clone()),
                overlay: Box::new(overlay.clone()),
            },
            1_000.0,
        );
        Harness {
            game,
            store,
            sink,
            overlay,
        }
    }

    fn harness() -> Harness {
        harness_with(Rc::new(MemoryStore::new()), StaticFlagSource::default())
    }

    /// Put an obstacle right on top of the player
    fn crash(game: &mut Game<StaticFlagSource>) {
        let x = game.session.player.pos.x;
        game.session
            .obstacles
            .push(Obstacle::new(ObstacleKind::High, x));
    }

    #[test]
    fn test_new_shows_ready_state() {
        let h = harness();
        let overlay = h.overlay.borrow();
        assert_eq!(overlay.status, status::READY);
        assert_eq!(overlay.welcome, Some(None));
        assert!(!overlay.restart_visible);
        assert_eq!(h.sink.count("session_started"), 1);
        assert_eq!(h.game.session().phase, GamePhase::Idle);
    }

    #[test]
    fn test_high_score_persisted_once() {
        let mut h = harness();
        h.game.start(1_000.0);
        for i in 0..20 {
            h.game.frame(1_000.0 + i as f64 * 16.0).unwrap();
        }
        let score = h.game.session().score;
        assert_eq!(score, 20);

        crash(&mut h.game);
        assert!(!h.game.frame(2_000.0).unwrap());
        let writes = h.store.write_count();
        assert_eq!(h.store.get(HIGH_SCORE_KEY).unwrap(), Some("20".to_string()));

        // Repeated game-over calls do nothing
        h.game.session.game_over();
        h.game.frame(2_016.0).unwrap();
        assert_eq!(h.store.write_count(), writes);
        assert_eq!(h.sink.count("game_ended"), 1);

        let overlay = h.overlay.borrow();
        assert_eq!(overlay.status, status::NEW_HIGH_SCORE);
        assert_eq!(overlay.high_score, 20);
        assert!(overlay.restart_visible);
    }

    #[test]
    fn test_lower_score_keeps_stored_best() {
        let store = Rc::new(MemoryStore::new());
        store.set(HIGH_SCORE_KEY, "500").unwrap();
        let mut h = harness_with(store, StaticFlagSource::default());
        assert_eq!(h.game.session().high_score, 500);

        h.game.start(0.0);
        h.game.frame(16.0).unwrap();
        crash(&mut h.game);
        h.game.frame(32.0).unwrap();

        assert_eq!(h.store.get(HIGH_SCORE_KEY).unwrap(), Some("500".to_string()));
        assert_eq!(h.overlay.borrow().status, status::GAME_OVER);
    }

    #[test]
    fn test_flag_change_applies_mid_run() {
        let source = StaticFlagSource::default();
        let mut h = harness_with(Rc::new(MemoryStore::new()), source);
        h.game.start(0.0);
        h.game.frame(16.0).unwrap();

        assert!(h.game.flags().source().push_update(FlagUpdate::Patch {
            key: FlagKey::DinoColor.as_str().to_string(),
            value: "blue".to_string(),
        }));
        assert!(h.game.frame(32.0).unwrap());

        assert_eq!(h.game.session().phase, GamePhase::Running);
        assert_eq!(h.game.session().player.skin.hex(), "#1976d2");
        assert_eq!(h.sink.count("flag_changed"), 1);
        assert_eq!(
            h.overlay.borrow().flags.as_ref().map(|f| f.dino_color.clone()),
            Some("blue".to_string())
        );
    }

    #[test]
    fn test_start_with_unreachable_flags() {
        let mut h = harness_with(Rc::new(MemoryStore::new()), StaticFlagSource::failing());
        assert!(h.game.flags().is_initialized());
        assert!(h.game.start(0.0));
        assert!(h.game.frame(16.0).unwrap());
        assert_eq!(h.game.session().difficulty.obstacle_speed, 5.0);
    }

    #[test]
    fn test_action_cycle() {
        let mut h = harness();
        h.game.handle_action(0.0);
        assert_eq!(h.game.session().phase, GamePhase::Running);
        assert!(h.overlay.borrow().start_overlays_hidden);

        h.game.handle_action(16.0);
        h.game.frame(16.0).unwrap();
        assert!(h.game.session().player.airborne);

        crash(&mut h.game);
        h.game.session.player.reset();
        h.game.frame(32.0).unwrap();
        assert_eq!(h.game.session().phase, GamePhase::GameOver);
        assert!(!h.game.wants_refresh());

        h.game.handle_action(48.0);
        assert_eq!(h.game.session().phase, GamePhase::Running);
        assert_eq!(h.game.session().score, 0);
        assert!(h.game.wants_refresh());
        assert!(!h.game.wants_refresh());
        assert_eq!(h.sink.count("game_started"), 2);
    }

    #[test]
    fn test_pause_toggle_stops_scoring() {
        let mut h = harness();
        h.game.start(0.0);
        h.game.frame(16.0).unwrap();
        h.game.toggle_pause();
        assert!(h.game.frame(32.0).unwrap());
        assert_eq!(h.game.session().phase, GamePhase::Paused);
        assert_eq!(h.overlay.borrow().status, status::PAUSED);

        let score = h.game.session().score;
        h.game.frame(48.0).unwrap();
        assert_eq!(h.game.session().score, score);

        h.game.handle_action(64.0);
        assert_eq!(h.game.session().phase, GamePhase::Running);
    }

    #[test]
    fn test_nan_halts_session() {
        let mut h = harness();
        h.game.start(0.0);
        h.game.session.player.velocity = f32::NAN;
        let err = h.game.frame(16.0).unwrap_err();
        assert!(matches!(err, GameError::Tick(_)));
        assert_eq!(h.game.session().phase, GamePhase::GameOver);
        assert_eq!(h.overlay.borrow().status, status::HALTED);
    }

    #[test]
    fn test_register_player_keeps_key() {
        let mut h = harness();
        let first = h.game.register_player("Ada Lovelace", 1_000.0);
        assert_eq!(first.key, "ada-lovelace-1000");
        assert_eq!(first.email, "ada.lovelace@dino-run.game");

        let again = h.game.register_player("Ada Lovelace", 5_000.0);
        assert_eq!(again.key, first.key);
        assert_eq!(h.game.profile().map(|p| p.sessions), Some(2));
        assert_eq!(h.sink.count("player_identified"), 2);

        // Profile counts finished games
        h.game.start(6_000.0);
        crash(&mut h.game);
        h.game.frame(6_016.0).unwrap();
        assert_eq!(h.game.profile().map(|p| p.sessions), Some(3));
        assert_eq!(
            PlayerProfile::load(&*h.store).map(|p| p.sessions),
            Some(3)
        );
    }

    #[test]
    fn test_returning_player_sees_quick_start() {
        let store = Rc::new(MemoryStore::new());
        PlayerProfile::register(&*store, "Grace", "grace-1", 0.0);
        let h = harness_with(store, StaticFlagSource::default());
        assert_eq!(
            h.overlay.borrow().welcome,
            Some(Some("Grace".to_string()))
        );
    }

    #[test]
    fn test_draw_commands_follow_session() {
        let mut h = harness();
        h.game.start(0.0);
        h.game.frame(16.0).unwrap();
        let commands = h.game.draw_commands();
        assert!(matches!(commands[0], DrawCommand::Clear { .. }));
        assert!(commands.iter().any(|c| c.color() == Some(h.game.session().player.skin.hex())));
    }
}
