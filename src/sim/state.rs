//! Session state and phase machine
//!
//! One `Session` lives for the whole page; `start()` resets it for each run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Cloud, Ground, Obstacle, Player};
use crate::consts::INITIAL_CLOUDS;
use crate::error::TickError;
use crate::settings::{DifficultyProfile, ObstacleStyle, Weather};
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for the first start
    #[default]
    Idle,
    Running,
    Paused,
    /// Run ended, waiting for restart
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// Things that happened during a tick, for the host to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    GameOver {
        score: u64,
        frames: u64,
        new_high_score: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub phase: GamePhase,
    pub score: u64,
    /// Best score, mirrored from storage
    pub high_score: u64,
    pub speed_multiplier: f32,
    pub frame_count: u64,
    pub player: Player,
    /// Spawn order
    pub obstacles: Vec<Obstacle>,
    pub clouds: Vec<Cloud>,
    pub ground: Ground,
    /// Active difficulty parameters (set by the bridge)
    pub difficulty: DifficultyProfile,
    pub obstacle_style: ObstacleStyle,
    pub weather: Weather,
    pub tuning: Tuning,
    /// Width of the playfield; clouds enter here
    pub width: f32,
    pub last_obstacle_frame: u64,
    pub last_cloud_frame: u64,
    /// Frames that must pass before the next cloud
    pub next_cloud_interval: f32,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, width: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let ground = Ground::new(&mut rng, width, &tuning);
        let mut session = Self {
            phase: GamePhase::Idle,
            score: 0,
            high_score: 0,
            speed_multiplier: 1.0,
            frame_count: 0,
            player: Player::default(),
            obstacles: Vec::new(),
            clouds: Vec::new(),
            ground,
            difficulty: DifficultyProfile::default(),
            obstacle_style: ObstacleStyle::default(),
            weather: Weather::default(),
            tuning,
            width,
            last_obstacle_frame: 0,
            last_cloud_frame: 0,
            next_cloud_interval: 0.0,
            rng,
            events: Vec::new(),
        };
        session.scatter_clouds();
        session.roll_cloud_interval();
        session
    }

    /// Begin a run. No-op while already running.
    pub fn start(&mut self) -> bool {
        if self.phase == GamePhase::Running {
            return false;
        }
        self.score = 0;
        self.frame_count = 0;
        self.speed_multiplier = 1.0;
        self.obstacles.clear();
        self.last_obstacle_frame = 0;
        self.last_cloud_frame = 0;
        self.scatter_clouds();
        self.roll_cloud_interval();
        self.player.reset();

        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Started);
        log::info!("Run started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        true
    }

    /// End the run. Only the first call per run has any effect.
    pub fn game_over(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Running | GamePhase::Paused) {
            return false;
        }
        self.phase = GamePhase::GameOver;

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        log::info!(
            "Game over: score {} after {} frames{}",
            self.score,
            self.frame_count,
            if new_high_score { " (new high score)" } else { "" }
        );
        self.events.push(GameEvent::GameOver {
            score: self.score,
            frames: self.frame_count,
            new_high_score,
        });
        true
    }

    /// Stop the run after the simulation became unusable
    pub fn halt(&mut self, reason: &TickError) {
        log::error!("Halting session: {}", reason);
        self.game_over();
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Initial clouds anywhere across the sky
    fn scatter_clouds(&mut self) {
        self.clouds.clear();
        for _ in 0..INITIAL_CLOUDS {
            let x = self.rng.random::<f32>() * self.width;
            self.clouds.push(Cloud::spawn(&mut self.rng, x, &self.tuning));
        }
    }

    pub(crate) fn roll_cloud_interval(&mut self) {
        self.next_cloud_interval = self.tuning.cloud_interval_min as f32
            + self.rng.random::<f32>() * self.tuning.cloud_interval_jitter as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CANVAS_WIDTH;
    use crate::sim::entities::ObstacleKind;

    fn session() -> Session {
        Session::new(42, Tuning::default(), CANVAS_WIDTH)
    }

    #[test]
    fn test_phase_transitions() {
        let mut s = session();
        assert_eq!(s.phase, GamePhase::Idle);
        assert!(!s.pause());
        assert!(s.start());
        assert!(!s.start());
        assert!(s.pause());
        assert_eq!(s.phase, GamePhase::Paused);
        assert!(s.resume());
        assert!(s.game_over());
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(!s.resume());
        assert!(s.start());
        assert_eq!(s.phase, GamePhase::Running);
    }

    #[test]
    fn test_start_resets_run() {
        let mut s = session();
        s.start();
        s.score = 500;
        s.frame_count = 300;
        s.obstacles.push(Obstacle::new(ObstacleKind::Low, 100.0));
        s.game_over();

        s.start();
        assert_eq!(s.score, 0);
        assert_eq!(s.frame_count, 0);
        assert!(s.obstacles.is_empty());
        assert_eq!(s.clouds.len(), INITIAL_CLOUDS);
    }

    #[test]
    fn test_game_over_is_idempotent() {
        let mut s = session();
        s.high_score = 10;
        s.start();
        s.score = 25;
        assert!(s.game_over());
        assert!(!s.game_over());
        assert_eq!(s.high_score, 25);

        let events = s.drain_events();
        let overs: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(
            overs,
            vec![&GameEvent::GameOver {
                score: 25,
                frames: 0,
                new_high_score: true
            }]
        );
    }

    #[test]
    fn test_cloud_interval_in_range() {
        let mut s = session();
        for _ in 0..50 {
            s.roll_cloud_interval();
            assert!(s.next_cloud_interval >= 200.0 && s.next_cloud_interval <= 300.0);
        }
    }
}
