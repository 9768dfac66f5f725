//! Flag snapshot -> gameplay parameters
//!
//! Holds the snapshot in force and pushes it into the session (difficulty,
//! skin, obstacle style, weather) and the overlay (theme, flag panel).
//! Applying the same snapshot again changes nothing.

use std::rc::Rc;

use crate::flags::ConfigurationSnapshot;
use crate::settings::{Difficulty, DinoColor, ObstacleStyle, Weather};
use crate::sim::Session;
use crate::ui::Overlay;

#[derive(Debug, Clone, Default)]
pub struct SettingsBridge {
    snapshot: Rc<ConfigurationSnapshot>,
}

impl SettingsBridge {
    pub fn new(snapshot: Rc<ConfigurationSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Rc<ConfigurationSnapshot> {
        &self.snapshot
    }

    /// Swap in a new snapshot. Returns false if the values are unchanged.
    pub fn replace(&mut self, next: Rc<ConfigurationSnapshot>) -> bool {
        if *self.snapshot == *next {
            return false;
        }
        self.snapshot = next;
        true
    }

    /// Speed, spawn frequency and jump strength
    pub fn apply_difficulty(snapshot: &ConfigurationSnapshot, session: &mut Session) {
        let profile = Difficulty::resolve(&snapshot.difficulty).profile();
        session.difficulty = profile;
        session.player.jump_strength = profile.jump_height;
    }

    /// Skin, obstacle look and background theme
    pub fn apply_cosmetics(
        snapshot: &ConfigurationSnapshot,
        session: &mut Session,
        overlay: &mut dyn Overlay,
    ) {
        session.player.skin = DinoColor::resolve(&snapshot.dino_color);
        session.obstacle_style = ObstacleStyle::resolve(&snapshot.obstacle_style);
        session.weather = Weather::resolve(&snapshot.weather);

        overlay.show_theme(session.weather);
        overlay.show_flags(snapshot);
    }

    /// Push the current snapshot everywhere
    pub fn apply(&self, session: &mut Session, overlay: &mut dyn Overlay) {
        Self::apply_difficulty(&self.snapshot, session);
        Self::apply_cosmetics(&self.snapshot, session, overlay);
    }
}
