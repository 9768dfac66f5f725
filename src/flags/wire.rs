//! Flag service payloads
//!
//! The evaluation endpoint and the `put` stream event carry a map of
//! flag name to `{ "value": ..., "version": ... }`. `patch` and `delete`
//! carry a single key. Only string values are meaningful to the game;
//! anything else is dropped so the default stays in force.

use serde::Deserialize;
use serde_json::Value;

use super::snapshot::FlagValues;
use crate::error::FlagSourceError;

/// One change delivered by a streaming source
#[derive(Debug, Clone, PartialEq)]
pub enum FlagUpdate {
    /// Full replacement of every value
    Replace(FlagValues),
    Patch { key: String, value: String },
    /// Revert one key to its default
    Delete { key: String },
    /// Values changed server-side; fetch again
    Refetch,
}

#[derive(Debug, Deserialize)]
struct Evaluation {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct PatchEvent {
    key: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct DeleteEvent {
    key: String,
}

/// Parse an evaluation map (fetch response or `put` event)
pub fn parse_evaluations(body: &str) -> Result<FlagValues, FlagSourceError> {
    let raw: std::collections::HashMap<String, Evaluation> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, eval)| match eval.value {
            Value::String(value) => Some((key, value)),
            other => {
                log::warn!("Ignoring non-string value for {}: {}", key, other);
                None
            }
        })
        .collect())
}

/// Parse a named stream event into an update.
/// Returns `Ok(None)` for events that carry nothing usable.
pub fn parse_event(event: &str, data: &str) -> Result<Option<FlagUpdate>, FlagSourceError> {
    match event {
        "put" => Ok(Some(FlagUpdate::Replace(parse_evaluations(data)?))),
        "patch" => {
            let patch: PatchEvent = serde_json::from_str(data)?;
            match patch.value {
                Value::String(value) => Ok(Some(FlagUpdate::Patch {
                    key: patch.key,
                    value,
                })),
                other => {
                    log::warn!("Ignoring non-string patch for {}: {}", patch.key, other);
                    Ok(None)
                }
            }
        }
        "delete" => {
            let delete: DeleteEvent = serde_json::from_str(data)?;
            Ok(Some(FlagUpdate::Delete { key: delete.key }))
        }
        "ping" => Ok(Some(FlagUpdate::Refetch)),
        other => {
            log::debug!("Unhandled stream event {:?}", other);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluations_drop_non_strings() {
        let values = parse_evaluations(
            r#"{
                "dino-color": { "value": "blue", "variation": 1, "version": 4 },
                "game-difficulty": { "value": 3 },
                "weather-background": { "value": "winter" }
            }"#,
        )
        .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["dino-color"], "blue");
        assert!(!values.contains_key("game-difficulty"));
    }

    #[test]
    fn test_stream_events() {
        assert_eq!(
            parse_event("patch", r#"{"key":"dino-color","value":"red","version":9}"#).unwrap(),
            Some(FlagUpdate::Patch {
                key: "dino-color".to_string(),
                value: "red".to_string()
            })
        );
        assert_eq!(
            parse_event("delete", r#"{"key":"obstacle-type","version":2}"#).unwrap(),
            Some(FlagUpdate::Delete {
                key: "obstacle-type".to_string()
            })
        );
        assert_eq!(parse_event("ping", "").unwrap(), Some(FlagUpdate::Refetch));
        assert_eq!(
            parse_event("patch", r#"{"key":"dino-color","value":true}"#).unwrap(),
            None
        );
        assert_eq!(parse_event("heartbeat", "{}").unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_error() {
        assert!(matches!(
            parse_evaluations("<html>"),
            Err(FlagSourceError::Malformed(_))
        ));
    }
}
