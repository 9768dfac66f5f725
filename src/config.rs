//! Game configuration
//!
//! Loaded from JSON. Every field has a default so a partial (or missing)
//! file still yields a playable game.

use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Placeholder ids shipped in sample configs
const PLACEHOLDER_IDS: [&str; 2] = ["YOUR_CLIENT_SIDE_ID_HERE", "YOUR_REAL_CLIENT_SIDE_ID_HERE"];

/// Render surface settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// DOM id of the canvas element
    pub element_id: String,
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            element_id: "gameCanvas".to_string(),
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Remote flag service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagServiceConfig {
    /// Client-side environment id (32 characters)
    pub client_side_id: String,
    pub base_url: String,
    pub stream_url: String,
    /// Subscribe to the change stream after the first fetch
    pub streaming: bool,
    pub init_timeout_ms: u32,
    pub identify_timeout_ms: u32,
}

impl Default for FlagServiceConfig {
    fn default() -> Self {
        Self {
            client_side_id: PLACEHOLDER_IDS[0].to_string(),
            base_url: "https://clientsdk.launchdarkly.com".to_string(),
            stream_url: "https://clientstream.launchdarkly.com".to_string(),
            streaming: true,
            init_timeout_ms: 10_000,
            identify_timeout_ms: 5_000,
        }
    }
}

impl FlagServiceConfig {
    /// Check the client-side id looks real. Logs why when it does not.
    pub fn validate(&self) -> bool {
        let id = self.client_side_id.trim();
        if id.is_empty() || PLACEHOLDER_IDS.contains(&id) {
            log::warn!("Flag service client id not configured ({:?})", id);
            return false;
        }
        if id.len() != 32 {
            log::warn!(
                "Flag service client id should be 32 characters, got {}",
                id.len()
            );
            return false;
        }
        true
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas: CanvasConfig,
    pub flags: FlagServiceConfig,
    pub tuning: Tuning,
    /// Fixed RNG seed; wall clock when absent
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Config from the path in `DINO_RUN_CONFIG`, defaults otherwise
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("DINO_RUN_CONFIG") else {
            log::info!("Using default config");
            return Self::default();
        };
        match Self::from_path(std::path::Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, path);
                Self::default()
            }
        }
    }

    /// Config from the inline `#dino-run-config` JSON script element (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("dino-run-config"))
            .and_then(|el| el.text_content());

        match json {
            Some(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from page");
                    config
                }
                Err(e) => {
                    log::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.canvas.width, 800.0);
        assert_eq!(config.canvas.height, 150.0);
    }

    #[test]
    fn test_nested_override() {
        let config = GameConfig::from_json(
            r#"{ "flags": { "streaming": false }, "tuning": { "gravity": 0.5 }, "seed": 7 }"#,
        )
        .unwrap();
        assert!(!config.flags.streaming);
        assert_eq!(config.flags.init_timeout_ms, 10_000);
        assert_eq!(config.tuning.gravity, 0.5);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_validate_client_id() {
        let mut flags = FlagServiceConfig::default();
        assert!(!flags.validate());
        flags.client_side_id = "abc".to_string();
        assert!(!flags.validate());
        flags.client_side_id = "0123456789abcdef0123456789abcdef".to_string();
        assert!(flags.validate());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            GameConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
