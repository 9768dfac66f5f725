//! Dino Run - an endless runner driven by remote feature flags
//!
//! Core modules:
//! - `sim`: Frame-locked simulation (entities, collisions, session state machine)
//! - `flags`: Remote configuration client (fetch, cache, stream changes)
//! - `bridge`: Maps flag snapshots onto gameplay parameters and cosmetics
//! - `game`: Wires session, flags, storage, telemetry and overlay together
//! - `renderer`: 2D draw command generation and the canvas backend
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `tuning`: Data-driven game balance

pub mod bridge;
pub mod config;
pub mod error;
pub mod flags;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod queue;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod telemetry;
pub mod tuning;
pub mod ui;

pub use bridge::SettingsBridge;
pub use config::GameConfig;
pub use error::GameError;
pub use game::Game;
pub use highscores::HighScore;
pub use settings::{Difficulty, DifficultyProfile, DinoColor, ObstacleStyle, Weather};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Render surface dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 150.0;

    /// Ground strip (top edge and thickness)
    pub const GROUND_Y: f32 = 130.0;
    pub const GROUND_HEIGHT: f32 = 20.0;

    /// Player defaults - standing on the ground (130 - 20)
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_GROUND_Y: f32 = 110.0;
    pub const PLAYER_WIDTH: f32 = 20.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;

    /// Obstacles enter at the right edge
    pub const OBSTACLE_SPAWN_X: f32 = 800.0;
    /// Logo tile size; high obstacles stack two
    pub const LOGO_SIZE: f32 = 30.0;

    /// Clouds drift in the top band
    pub const CLOUD_MIN_Y: f32 = 20.0;
    pub const CLOUD_Y_RANGE: f32 = 50.0;
    pub const INITIAL_CLOUDS: usize = 3;

    /// Walk cycle advance per grounded frame
    pub const WALK_ANIMATION_SPEED: f32 = 0.3;

    /// Version reported in user contexts and telemetry
    pub const GAME_VERSION: &str = "1.0.0";
}
