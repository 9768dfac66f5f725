//! Resolved flag values

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw flag values keyed by flag name, as delivered by a source
pub type FlagValues = HashMap<String, String>;

/// The four remote flags the game reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    DinoColor,
    Difficulty,
    Weather,
    ObstacleType,
}

impl FlagKey {
    pub const ALL: [FlagKey; 4] = [
        FlagKey::DinoColor,
        FlagKey::Difficulty,
        FlagKey::Weather,
        FlagKey::ObstacleType,
    ];

    /// Flag name on the remote service
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKey::DinoColor => "dino-color",
            FlagKey::Difficulty => "game-difficulty",
            FlagKey::Weather => "weather-background",
            FlagKey::ObstacleType => "obstacle-type",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dino-color" => Some(FlagKey::DinoColor),
            "game-difficulty" => Some(FlagKey::Difficulty),
            "weather-background" => Some(FlagKey::Weather),
            "obstacle-type" => Some(FlagKey::ObstacleType),
            _ => None,
        }
    }

    /// Value used when the service has nothing for this flag
    pub fn default_value(&self) -> &'static str {
        match self {
            FlagKey::DinoColor => "green",
            FlagKey::Difficulty => "medium",
            FlagKey::Weather => "spring",
            FlagKey::ObstacleType => "logos",
        }
    }
}

/// A complete, consistent set of flag values.
///
/// Always holds a value for every key. Replaced as a whole, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    pub dino_color: String,
    pub difficulty: String,
    pub weather: String,
    pub obstacle_style: String,
}

impl Default for ConfigurationSnapshot {
    fn default() -> Self {
        Self {
            dino_color: FlagKey::DinoColor.default_value().to_string(),
            difficulty: FlagKey::Difficulty.default_value().to_string(),
            weather: FlagKey::Weather.default_value().to_string(),
            obstacle_style: FlagKey::ObstacleType.default_value().to_string(),
        }
    }
}

impl ConfigurationSnapshot {
    /// Build from raw values, filling anything missing with its default
    pub fn from_values(values: &FlagValues) -> Self {
        let pick = |key: FlagKey| {
            values
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| key.default_value().to_string())
        };
        Self {
            dino_color: pick(FlagKey::DinoColor),
            difficulty: pick(FlagKey::Difficulty),
            weather: pick(FlagKey::Weather),
            obstacle_style: pick(FlagKey::ObstacleType),
        }
    }

    pub fn get(&self, key: FlagKey) -> &str {
        match key {
            FlagKey::DinoColor => &self.dino_color,
            FlagKey::Difficulty => &self.difficulty,
            FlagKey::Weather => &self.weather,
            FlagKey::ObstacleType => &self.obstacle_style,
        }
    }

    /// Keys whose values differ, with (old, new)
    pub fn diff<'a>(&'a self, other: &'a Self) -> Vec<(FlagKey, &'a str, &'a str)> {
        FlagKey::ALL
            .iter()
            .filter(|key| self.get(**key) != other.get(**key))
            .map(|key| (*key, self.get(*key), other.get(*key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let snapshot = ConfigurationSnapshot::default();
        assert_eq!(snapshot.get(FlagKey::DinoColor), "green");
        assert_eq!(snapshot.get(FlagKey::Difficulty), "medium");
        assert_eq!(snapshot.get(FlagKey::Weather), "spring");
        assert_eq!(snapshot.get(FlagKey::ObstacleType), "logos");
    }

    #[test]
    fn test_from_partial_values() {
        let values = FlagValues::from([
            ("dino-color".to_string(), "blue".to_string()),
            ("unrelated-flag".to_string(), "x".to_string()),
        ]);
        let snapshot = ConfigurationSnapshot::from_values(&values);
        assert_eq!(snapshot.dino_color, "blue");
        assert_eq!(snapshot.difficulty, "medium");
    }

    #[test]
    fn test_diff_lists_changed_keys() {
        let old = ConfigurationSnapshot::default();
        let new = ConfigurationSnapshot {
            weather: "winter".to_string(),
            ..Default::default()
        };
        assert_eq!(
            old.diff(&new),
            vec![(FlagKey::Weather, "spring", "winter")]
        );
        assert!(new.diff(&new).is_empty());
    }
}
