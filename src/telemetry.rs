//! Fire-and-forget gameplay events
//!
//! The game emits and moves on; a sink can never fail the caller.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::flags::ConfigurationSnapshot;

/// End-of-run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub score: u64,
    pub frames: u64,
    pub duration_ms: f64,
    pub new_high_score: bool,
    /// Flags in force when the run ended
    pub snapshot: ConfigurationSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    SessionStarted {
        session_id: String,
        user_agent: String,
    },
    GameStarted {
        session_id: String,
        snapshot: ConfigurationSnapshot,
    },
    GameEnded(SessionRecord),
    FlagChanged {
        key: String,
        old: String,
        new: String,
    },
    PlayerIdentified {
        key: String,
        name: String,
        returning: bool,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::SessionStarted { .. } => "session_started",
            TelemetryEvent::GameStarted { .. } => "game_started",
            TelemetryEvent::GameEnded(_) => "game_ended",
            TelemetryEvent::FlagChanged { .. } => "flag_changed",
            TelemetryEvent::PlayerIdentified { .. } => "player_identified",
        }
    }
}

pub trait TelemetrySink {
    fn emit(&mut self, event: TelemetryEvent);
}

/// Writes events to the log as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&mut self, event: TelemetryEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("[telemetry] {}", json),
            Err(e) => log::debug!("Dropping {} event: {}", event.name(), e),
        }
    }
}

/// Keeps every event; clones share one buffer
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<TelemetryEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }
}

impl TelemetrySink for RecordingSink {
    fn emit(&mut self, event: TelemetryEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Page-load id: `dino_<ms>_<9 base36 chars>`
pub fn session_id<R: Rng>(now_ms: f64, rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from_digit(rng.random_range(0..36u32), 36).unwrap_or('0'))
        .collect();
    format!("dino_{}_{}", now_ms as u64, suffix)
}
