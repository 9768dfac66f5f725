//! Frame-locked simulation tick
//!
//! Called once per display refresh. Nothing here touches the network,
//! the DOM or the clock.

use super::entities::{Cloud, Obstacle};
use super::state::{GamePhase, Session};
use crate::error::TickError;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (space/tap)
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one frame
pub fn tick(session: &mut Session, input: &TickInput) -> Result<(), TickError> {
    if input.pause {
        match session.phase {
            GamePhase::Running => {
                session.pause();
                return Ok(());
            }
            GamePhase::Paused => {
                session.resume();
            }
            _ => {}
        }
    }

    if session.phase != GamePhase::Running {
        return Ok(());
    }

    session.speed_multiplier = session.tuning.speed_multiplier(session.score);

    if input.jump {
        session.player.jump(&session.tuning);
    }
    session.player.update(&session.tuning);

    let since_obstacle = session.frame_count.saturating_sub(session.last_obstacle_frame);
    if since_obstacle > u64::from(session.difficulty.obstacle_frequency) {
        let obstacle = Obstacle::spawn(&mut session.rng, &session.tuning);
        session.obstacles.push(obstacle);
        session.last_obstacle_frame = session.frame_count;
    }

    let since_cloud = session.frame_count.saturating_sub(session.last_cloud_frame);
    if since_cloud as f32 > session.next_cloud_interval {
        let cloud = Cloud::spawn(&mut session.rng, session.width, &session.tuning);
        session.clouds.push(cloud);
        session.last_cloud_frame = session.frame_count;
        session.roll_cloud_interval();
    }

    let speed = session.difficulty.obstacle_speed * session.speed_multiplier;
    for obstacle in &mut session.obstacles {
        obstacle.update(speed);
    }
    for cloud in &mut session.clouds {
        cloud.update(session.speed_multiplier);
    }
    session
        .ground
        .update(speed, &mut session.rng, &session.tuning);

    session.obstacles.retain(|o| !o.is_off_screen());
    session.clouds.retain(|c| !c.is_off_screen());

    check_finite(session)?;

    let hitbox = &session.tuning.hitbox;
    if session
        .obstacles
        .iter()
        .any(|o| session.player.collides_with(o, hitbox))
    {
        session.game_over();
        return Ok(());
    }

    session.score += session.speed_multiplier.floor() as u64;
    session.frame_count += 1;
    Ok(())
}

fn check_finite(session: &Session) -> Result<(), TickError> {
    let non_finite = |entity, field| Err(TickError::NonFinite { entity, field });

    if !session.speed_multiplier.is_finite() {
        return non_finite("session", "speed_multiplier");
    }
    if !session.player.pos.y.is_finite() {
        return non_finite("player", "y");
    }
    if !session.player.velocity.is_finite() {
        return non_finite("player", "velocity");
    }
    if session.obstacles.iter().any(|o| !o.pos.x.is_finite()) {
        return non_finite("obstacle", "x");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CANVAS_WIDTH;
    use crate::settings::Difficulty;
    use crate::sim::GameEvent;
    use crate::sim::entities::ObstacleKind;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn running() -> Session {
        let mut session = Session::new(7, Tuning::default(), CANVAS_WIDTH);
        session.start();
        session.drain_events();
        session
    }

    /// No obstacles ever spawn
    fn clear_road() -> Session {
        let mut session = running();
        session.difficulty.obstacle_frequency = u32::MAX;
        session
    }

    #[test]
    fn test_score_equals_frames_below_ramp() {
        let mut session = clear_road();
        for _ in 0..500 {
            tick(&mut session, &TickInput::default()).unwrap();
        }
        assert_eq!(session.score, 500);
        assert_eq!(session.frame_count, 500);
    }

    #[test]
    fn test_score_ramp_floors_multiplier() {
        let mut session = clear_road();
        session.score = 1000;
        tick(&mut session, &TickInput::default()).unwrap();
        assert!((session.speed_multiplier - 1.5).abs() < 1e-6);
        assert_eq!(session.score, 1001);

        session.score = 2000;
        tick(&mut session, &TickInput::default()).unwrap();
        assert_eq!(session.score, 2002);
    }

    #[test]
    fn test_spawn_after_frequency() {
        let mut session = running();
        let frequency = session.difficulty.obstacle_frequency;
        session.frame_count = u64::from(frequency);
        tick(&mut session, &TickInput::default()).unwrap();
        assert!(session.obstacles.is_empty());

        let mut session = running();
        session.frame_count = u64::from(frequency) + 1;
        tick(&mut session, &TickInput::default()).unwrap();
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.last_obstacle_frame, u64::from(frequency) + 1);
    }

    #[test]
    fn test_off_screen_obstacles_culled() {
        let mut session = clear_road();
        // Medium speed is 5 px per frame
        let mut leaving = Obstacle::new(ObstacleKind::Low, -30.0);
        leaving.pos.x = -26.0;
        let mut staying = Obstacle::new(ObstacleKind::Low, 0.0);
        staying.pos.x = -24.0;
        session.obstacles = vec![leaving, staying];

        tick(&mut session, &TickInput::default()).unwrap();
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles[0].pos.x, -29.0);
    }

    #[test]
    fn test_head_only_hit_ends_run() {
        let mut session = clear_road();
        let mut obstacle = Obstacle::new(ObstacleKind::Low, 0.0);
        // Lands at x 72..77, y 90..105 after this frame's scroll
        obstacle.pos = Vec2::new(77.0, 90.0);
        obstacle.size = Vec2::new(5.0, 15.0);
        session.obstacles.push(obstacle);

        tick(&mut session, &TickInput::default()).unwrap();
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.score, 0);
        assert_eq!(session.frame_count, 0);
        assert!(matches!(
            session.drain_events().as_slice(),
            [GameEvent::GameOver { score: 0, .. }]
        ));
    }

    #[test]
    fn test_jump_clears_low_obstacle() {
        let mut session = clear_road();
        session.obstacles.push(Obstacle::new(ObstacleKind::Low, 150.0));
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut session, &jump).unwrap();
        for _ in 0..40 {
            tick(&mut session, &TickInput::default()).unwrap();
        }
        assert_eq!(session.phase, GamePhase::Running);
        assert!(session.obstacles.is_empty());
        assert!(!session.player.airborne);
    }

    #[test]
    fn test_pause_freezes_tick() {
        let mut session = clear_road();
        tick(&mut session, &TickInput::default()).unwrap();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut session, &pause).unwrap();
        assert_eq!(session.phase, GamePhase::Paused);

        for _ in 0..10 {
            tick(&mut session, &TickInput::default()).unwrap();
        }
        assert_eq!(session.frame_count, 1);

        tick(&mut session, &pause).unwrap();
        assert_eq!(session.phase, GamePhase::Running);
        assert_eq!(session.frame_count, 2);
    }

    #[test]
    fn test_non_finite_state_is_error() {
        let mut session = clear_road();
        session.player.velocity = f32::NAN;
        session.player.airborne = true;
        assert_eq!(
            tick(&mut session, &TickInput::default()),
            Err(TickError::NonFinite {
                entity: "player",
                field: "y"
            })
        );
    }

    #[test]
    fn test_cloud_drift_ignores_difficulty() {
        for difficulty in Difficulty::ALL {
            let mut session = clear_road();
            session.difficulty = difficulty.profile();
            session.difficulty.obstacle_frequency = u32::MAX;
            let before = session.clouds[0].pos.x;
            tick(&mut session, &TickInput::default()).unwrap();
            assert!((before - session.clouds[0].pos.x - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cloud_drift_follows_multiplier() {
        let mut session = clear_road();
        session.difficulty = Difficulty::Hard.profile();
        session.difficulty.obstacle_frequency = u32::MAX;
        session.score = 2000;
        let before = session.clouds[0].pos.x;
        tick(&mut session, &TickInput::default()).unwrap();
        assert!((before - session.clouds[0].pos.x - 1.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn obstacles_culled_only_when_gone(x in -40i32..800) {
            let x = x as f32;
            let mut session = clear_road();
            let mut obstacle = Obstacle::new(ObstacleKind::High, 0.0);
            // Keep it out of the player's way
            obstacle.pos.y = -500.0;
            obstacle.pos.x = x + 5.0;
            session.obstacles.push(obstacle);
            tick(&mut session, &TickInput::default()).unwrap();
            let still_there = session.obstacles.len() == 1;
            prop_assert_eq!(still_there, x + 30.0 >= 0.0);
        }
    }
}
