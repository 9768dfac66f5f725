//! Player, obstacles, clouds and the ground strip

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::settings::DinoColor;
use crate::tuning::{HitboxTuning, Tuning};

/// The dinosaur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (negative is up)
    pub velocity: f32,
    pub airborne: bool,
    pub jump_strength: f32,
    pub ground_y: f32,
    pub skin: DinoColor,
    /// Walk cycle phase, only advances on the ground
    pub animation_frame: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, PLAYER_GROUND_Y),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            velocity: 0.0,
            airborne: false,
            jump_strength: 90.0,
            ground_y: PLAYER_GROUND_Y,
            skin: DinoColor::default(),
            animation_frame: 0.0,
        }
    }
}

impl Player {
    /// Integrate gravity and land on the ground
    pub fn update(&mut self, tuning: &Tuning) {
        if self.airborne || self.pos.y < self.ground_y {
            self.velocity += tuning.gravity;
            self.pos.y += self.velocity;

            if self.pos.y >= self.ground_y {
                self.pos.y = self.ground_y;
                self.velocity = 0.0;
                self.airborne = false;
            }
        }

        if !self.airborne {
            self.animation_frame += WALK_ANIMATION_SPEED;
        }
    }

    /// Grounded, within a small tolerance
    pub fn can_jump(&self, tuning: &Tuning) -> bool {
        self.pos.y >= self.ground_y - tuning.jump_epsilon
    }

    /// Launch if grounded. Returns true if the jump happened.
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if !self.can_jump(tuning) {
            return false;
        }
        self.velocity = -self.jump_strength / tuning.jump_divisor;
        self.airborne = true;
        true
    }

    /// Back on the ground, at rest. Skin and jump strength are kept.
    pub fn reset(&mut self) {
        self.pos.y = self.ground_y;
        self.velocity = 0.0;
        self.airborne = false;
    }

    /// Torso box
    pub fn body_box(&self, hitbox: &HitboxTuning) -> Aabb {
        Aabb::new(
            Vec2::new(self.pos.x, self.pos.y + hitbox.body_top_inset),
            self.pos + self.size,
        )
    }

    /// Head box, forward of and above the torso
    pub fn head_box(&self, hitbox: &HitboxTuning) -> Aabb {
        let front = self.pos.x + self.size.x;
        Aabb::new(
            Vec2::new(front - hitbox.head_back, self.pos.y - hitbox.head_above),
            Vec2::new(front + hitbox.head_forward, self.pos.y + hitbox.head_below),
        )
    }

    pub fn collides_with(&self, obstacle: &Obstacle, hitbox: &HitboxTuning) -> bool {
        let bounds = obstacle.bounds();
        let body = self.body_box(hitbox).overlaps(&bounds);
        let head = self.head_box(hitbox).overlaps(&bounds);
        body || head
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// One logo tall, can be jumped
    Low,
    /// Two stacked logos
    High,
}

impl ObstacleKind {
    pub fn logo_count(&self) -> usize {
        match self {
            ObstacleKind::Low => 1,
            ObstacleKind::High => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ObstacleKind,
    /// Fraction of the scroll speed this entity moves at
    pub speed_contribution: f32,
}

impl Obstacle {
    /// A new obstacle standing on the ground at `x`
    pub fn new(kind: ObstacleKind, x: f32) -> Self {
        let height = LOGO_SIZE * kind.logo_count() as f32;
        Self {
            pos: Vec2::new(x, GROUND_Y - height),
            size: Vec2::new(LOGO_SIZE, height),
            kind,
            speed_contribution: 1.0,
        }
    }

    /// Random kind, entering at the right edge
    pub fn spawn<R: Rng>(rng: &mut R, tuning: &Tuning) -> Self {
        let kind = if rng.random::<f32>() < tuning.low_obstacle_chance {
            ObstacleKind::Low
        } else {
            ObstacleKind::High
        };
        Self::new(kind, OBSTACLE_SPAWN_X)
    }

    pub fn update(&mut self, speed: f32) {
        self.pos.x -= speed * self.speed_contribution;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size)
    }
}

/// Background decoration, no collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed_contribution: f32,
    pub opacity: f32,
}

impl Cloud {
    pub fn spawn<R: Rng>(rng: &mut R, x: f32, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(x, CLOUD_MIN_Y + rng.random::<f32>() * CLOUD_Y_RANGE),
            size: Vec2::new(
                30.0 + rng.random::<f32>() * 20.0,
                15.0 + rng.random::<f32>() * 10.0,
            ),
            speed_contribution: tuning.cloud_speed,
            opacity: 0.7,
        }
    }

    pub fn update(&mut self, speed: f32) {
        self.pos.x -= speed * self.speed_contribution;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// One bump of the ground pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSegment {
    pub x: f32,
    pub height: f32,
}

/// Scrolling ground strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub segments: Vec<GroundSegment>,
}

impl Ground {
    pub fn new<R: Rng>(rng: &mut R, width: f32, tuning: &Tuning) -> Self {
        let mut ground = Self {
            y: GROUND_Y,
            width,
            height: GROUND_HEIGHT,
            segments: Vec::new(),
        };
        ground.fill(rng, tuning);
        ground
    }

    /// Scroll the pattern, dropping segments past the left margin and
    /// appending until the right margin is covered again
    pub fn update<R: Rng>(&mut self, speed: f32, rng: &mut R, tuning: &Tuning) {
        for segment in &mut self.segments {
            segment.x -= speed;
        }
        self.segments.retain(|s| s.x > -tuning.ground_margin);
        self.fill(rng, tuning);
    }

    fn fill<R: Rng>(&mut self, rng: &mut R, tuning: &Tuning) {
        let limit = self.width + tuning.ground_margin;
        let spacing = tuning.ground_segment_spacing.max(1.0);
        loop {
            let next_x = match self.segments.last() {
                Some(last) if last.x >= limit => break,
                Some(last) => last.x + spacing,
                None => 0.0,
            };
            self.segments.push(GroundSegment {
                x: next_x,
                height: 2.0 + rng.random::<f32>() * 3.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_jump_arc_lands_on_ground() {
        let tuning = Tuning::default();
        let mut player = Player::default();
        assert!(player.jump(&tuning));
        assert_eq!(player.velocity, -15.0);

        // Mid-air jumps are ignored
        player.update(&tuning);
        player.update(&tuning);
        assert!(!player.jump(&tuning));

        for _ in 0..100 {
            player.update(&tuning);
        }
        assert_eq!(player.pos.y, PLAYER_GROUND_Y);
        assert_eq!(player.velocity, 0.0);
        assert!(!player.airborne);
    }

    #[test]
    fn test_walk_animation_only_on_ground() {
        let tuning = Tuning::default();
        let mut player = Player::default();
        player.update(&tuning);
        assert!((player.animation_frame - WALK_ANIMATION_SPEED).abs() < 1e-6);
        player.jump(&tuning);
        player.update(&tuning);
        assert!((player.animation_frame - WALK_ANIMATION_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_head_only_collision() {
        let hitbox = HitboxTuning::default();
        let player = Player::default();
        // Head box: x 64..80, y 102..114. Torso box: x 50..70, y 115..130.
        let mut obstacle = Obstacle::new(ObstacleKind::Low, 0.0);
        obstacle.pos = Vec2::new(72.0, 90.0);
        obstacle.size = Vec2::new(5.0, 15.0);

        assert!(!player.body_box(&hitbox).overlaps(&obstacle.bounds()));
        assert!(player.head_box(&hitbox).overlaps(&obstacle.bounds()));
        assert!(player.collides_with(&obstacle, &hitbox));
    }

    #[test]
    fn test_obstacle_geometry() {
        let low = Obstacle::new(ObstacleKind::Low, OBSTACLE_SPAWN_X);
        assert_eq!(low.pos, Vec2::new(800.0, 100.0));
        assert_eq!(low.size, Vec2::new(30.0, 30.0));
        let high = Obstacle::new(ObstacleKind::High, OBSTACLE_SPAWN_X);
        assert_eq!(high.pos.y, 70.0);
        assert_eq!(high.size.y, 60.0);
    }

    #[test]
    fn test_off_screen_boundary() {
        let mut obstacle = Obstacle::new(ObstacleKind::Low, -30.0);
        assert!(!obstacle.is_off_screen());
        obstacle.update(0.5);
        assert!(obstacle.is_off_screen());
    }

    proptest! {
        #[test]
        fn ground_always_tiles(seed in any::<u64>(), speeds in prop::collection::vec(0.0f32..20.0, 1..200)) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut ground = Ground::new(&mut rng, CANVAS_WIDTH, &tuning);
            for speed in speeds {
                ground.update(speed, &mut rng, &tuning);
                let first = ground.segments[0].x;
                let last = ground.segments[ground.segments.len() - 1].x;
                prop_assert!(first <= 0.0);
                prop_assert!(last >= CANVAS_WIDTH);
                for pair in ground.segments.windows(2) {
                    prop_assert!((pair[1].x - pair[0].x - tuning.ground_segment_spacing).abs() < 0.05);
                }
            }
        }
    }
}
