//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per displayed frame
//! - Seeded RNG only
//! - Entities kept in spawn order
//! - No rendering, network or platform dependencies

pub mod collision;
pub mod entities;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use entities::{Cloud, Ground, GroundSegment, Obstacle, ObstacleKind, Player};
pub use state::{GameEvent, GamePhase, Session};
pub use tick::{TickInput, tick};
