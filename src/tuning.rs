//! Data-driven game balance
//!
//! Every tuning constant of the simulation lives here so that a config file
//! can override it. Defaults reproduce the shipped feel at `medium`.

use serde::{Deserialize, Serialize};

/// Offsets of the two collision boxes relative to the player's position.
///
/// The head box sits forward and above the torso because the drawn head
/// overhangs the body on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxTuning {
    /// Torso box starts this far below the player's top edge
    pub body_top_inset: f32,
    /// Head box left edge, measured back from the player's right edge
    pub head_back: f32,
    /// Head box right edge, measured forward from the player's right edge
    pub head_forward: f32,
    /// Head box top edge above the player's top edge
    pub head_above: f32,
    /// Head box bottom edge below the player's top edge
    pub head_below: f32,
}

impl Default for HitboxTuning {
    fn default() -> Self {
        Self {
            body_top_inset: 5.0,
            head_back: 6.0,
            head_forward: 10.0,
            head_above: 8.0,
            head_below: 4.0,
        }
    }
}

/// Simulation tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration per frame²
    pub gravity: f32,
    /// Launch velocity is `jump_strength / jump_divisor`
    pub jump_divisor: f32,
    /// How far above the ground the player may be and still jump
    pub jump_epsilon: f32,
    /// Score at which the speed multiplier has grown by `speed_ramp_factor`
    pub speed_ramp_score: f32,
    pub speed_ramp_factor: f32,
    /// Probability that a spawned obstacle is a single (low) logo
    pub low_obstacle_chance: f32,
    /// Frames between clouds: `cloud_interval_min + U[0, cloud_interval_jitter)`
    pub cloud_interval_min: u32,
    pub cloud_interval_jitter: u32,
    /// Cloud drift in px/frame at speed multiplier 1, whatever the difficulty
    pub cloud_speed: f32,
    /// Horizontal distance between ground pattern segments
    pub ground_segment_spacing: f32,
    /// Pattern extends this far past both screen edges
    pub ground_margin: f32,
    pub hitbox: HitboxTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            jump_divisor: 6.0,
            jump_epsilon: 5.0,
            speed_ramp_score: 1000.0,
            speed_ramp_factor: 0.5,
            low_obstacle_chance: 0.6,
            cloud_interval_min: 200,
            cloud_interval_jitter: 100,
            cloud_speed: 0.5,
            ground_segment_spacing: 10.0,
            ground_margin: 50.0,
            hitbox: HitboxTuning::default(),
        }
    }
}

impl Tuning {
    /// Speed multiplier for a given score: `1 + (score / ramp) * factor`
    pub fn speed_multiplier(&self, score: u64) -> f32 {
        1.0 + (score as f32 / self.speed_ramp_score) * self.speed_ramp_factor
    }
}
