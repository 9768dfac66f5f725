//! Player profile
//!
//! Persisted as JSON under `dinoRunPlayerData`. Written on name entry and
//! once per finished game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PLAYER_PROFILE_KEY};

fn timestamp(now_ms: f64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    /// Flag-targeting key the player was registered with
    #[serde(default)]
    pub key: String,
    pub first_visit: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    #[serde(default)]
    pub sessions: u32,
}

impl PlayerProfile {
    /// Load the stored profile; corrupt records are treated as absent
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let raw = match store.get(PLAYER_PROFILE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Player profile unavailable: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!("Ignoring corrupt player profile: {}", e);
                None
            }
        }
    }

    pub fn has_played_before(store: &dyn KeyValueStore) -> bool {
        Self::load(store).is_some()
    }

    /// Create or update the profile after name entry.
    /// Keeps the first visit and counts this as another session.
    pub fn register(store: &dyn KeyValueStore, name: &str, key: &str, now_ms: f64) -> Self {
        let now = timestamp(now_ms);
        let profile = match Self::load(store) {
            Some(existing) => Self {
                name: name.to_string(),
                key: key.to_string(),
                first_visit: existing.first_visit,
                last_visit: now,
                sessions: existing.sessions + 1,
            },
            None => Self {
                name: name.to_string(),
                key: key.to_string(),
                first_visit: now,
                last_visit: now,
                sessions: 1,
            },
        };
        profile.save(store);
        profile
    }

    /// Count a finished game
    pub fn record_game(&mut self, now_ms: f64) {
        self.sessions += 1;
        self.last_visit = timestamp(now_ms);
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(PLAYER_PROFILE_KEY, &json) {
                    log::warn!("Failed to save player profile: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to encode player profile: {}", e),
        }
    }
}
