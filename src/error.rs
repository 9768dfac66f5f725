//! Error types
//!
//! Only render-target and tick failures reach the host. Flag, storage and
//! config errors are logged where they happen and replaced by defaults.

use thiserror::Error;

/// Failures talking to the remote flag service
#[derive(Debug, Error)]
pub enum FlagSourceError {
    #[error("flag service is not available: {0}")]
    Unavailable(String),
    #[error("flag request timed out after {0} ms")]
    Timeout(u32),
    #[error("flag service answered with HTTP {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed flag payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failures of the key-value store backing high scores and profiles
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation state became unusable mid-frame
#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("non-finite {field} on {entity}")]
    NonFinite {
        entity: &'static str,
        field: &'static str,
    },
}

/// Errors surfaced to the host page
#[derive(Debug, Error)]
pub enum GameError {
    #[error("render target #{0} not found")]
    RenderTargetMissing(String),
    #[error("2D drawing context unavailable on #{0}")]
    ContextUnavailable(String),
    #[error("session halted: {0}")]
    Tick(#[from] TickError),
}
