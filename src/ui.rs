//! HUD and overlay surface
//!
//! The game drives the page through this trait only. The browser build
//! implements it over the DOM; headless runs and tests use the doubles below.

use crate::flags::ConfigurationSnapshot;
use crate::settings::Weather;

/// Status line texts
pub mod status {
    pub const READY: &str = "Press SPACE or tap to start";
    pub const RUNNING: &str = "Running! Jump to avoid obstacles!";
    pub const PAUSED: &str = "Paused - Press SPACE to continue";
    pub const GAME_OVER: &str = "Game Over! Press SPACE or click restart to play again!";
    pub const NEW_HIGH_SCORE: &str = "New High Score! Press SPACE to play again!";
    pub const HALTED: &str = "Something went wrong. Reload to play again.";
}

/// Everything the game shows outside the canvas
pub trait Overlay {
    fn show_score(&mut self, score: u64);
    fn show_high_score(&mut self, best: u64);
    fn show_status(&mut self, status: &str);
    fn show_restart(&mut self, visible: bool);
    /// Theme class on the render surface
    fn show_theme(&mut self, weather: Weather);
    /// Raw flag values panel
    fn show_flags(&mut self, snapshot: &ConfigurationSnapshot);
    /// Name entry for first-time players, quick start for returning ones
    fn show_welcome(&mut self, returning: Option<&str>);
    fn hide_start_overlays(&mut self);
}

/// Overlay that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOverlay;

impl Overlay for NullOverlay {
    fn show_score(&mut self, _score: u64) {}
    fn show_high_score(&mut self, _best: u64) {}
    fn show_status(&mut self, _status: &str) {}
    fn show_restart(&mut self, _visible: bool) {}
    fn show_theme(&mut self, _weather: Weather) {}
    fn show_flags(&mut self, _snapshot: &ConfigurationSnapshot) {}
    fn show_welcome(&mut self, _returning: Option<&str>) {}
    fn hide_start_overlays(&mut self) {}
}

/// Overlay that remembers the last value shown in each slot
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingOverlay {
    pub score: u64,
    pub high_score: u64,
    pub status: String,
    pub restart_visible: bool,
    pub theme: Option<Weather>,
    pub flags: Option<ConfigurationSnapshot>,
    /// `Some(None)` for the first-time prompt, `Some(Some(name))` for a returning player
    pub welcome: Option<Option<String>>,
    pub start_overlays_hidden: bool,
}

impl Overlay for RecordingOverlay {
    fn show_score(&mut self, score: u64) {
        self.score = score;
    }

    fn show_high_score(&mut self, best: u64) {
        self.high_score = best;
    }

    fn show_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn show_restart(&mut self, visible: bool) {
        self.restart_visible = visible;
    }

    fn show_theme(&mut self, weather: Weather) {
        self.theme = Some(weather);
    }

    fn show_flags(&mut self, snapshot: &ConfigurationSnapshot) {
        self.flags = Some(snapshot.clone());
    }

    fn show_welcome(&mut self, returning: Option<&str>) {
        self.welcome = Some(returning.map(str::to_string));
        self.start_overlays_hidden = false;
    }

    fn hide_start_overlays(&mut self) {
        self.start_overlays_hidden = true;
    }
}

impl<O: Overlay + ?Sized> Overlay for std::rc::Rc<std::cell::RefCell<O>> {
    fn show_score(&mut self, score: u64) {
        self.borrow_mut().show_score(score);
    }

    fn show_high_score(&mut self, best: u64) {
        self.borrow_mut().show_high_score(best);
    }

    fn show_status(&mut self, status: &str) {
        self.borrow_mut().show_status(status);
    }

    fn show_restart(&mut self, visible: bool) {
        self.borrow_mut().show_restart(visible);
    }

    fn show_theme(&mut self, weather: Weather) {
        self.borrow_mut().show_theme(weather);
    }

    fn show_flags(&mut self, snapshot: &ConfigurationSnapshot) {
        self.borrow_mut().show_flags(snapshot);
    }

    fn show_welcome(&mut self, returning: Option<&str>) {
        self.borrow_mut().show_welcome(returning);
    }

    fn hide_start_overlays(&mut self) {
        self.borrow_mut().hide_start_overlays();
    }
}
