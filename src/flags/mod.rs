//! Remote configuration client
//!
//! - `snapshot`: the four game flags and their resolved values
//! - `context`: who the flags are evaluated for
//! - `source`: transport seam plus in-memory/file sources
//! - `wire`: service payload parsing
//! - `client`: caching, fallback and change fan-out
//! - `remote`: browser HTTP/SSE transport

pub mod client;
pub mod context;
#[cfg(target_arch = "wasm32")]
pub mod remote;
pub mod snapshot;
pub mod source;
pub mod wire;

pub use client::{FlagClient, Subscription};
pub use context::UserContext;
#[cfg(target_arch = "wasm32")]
pub use remote::RemoteFlagSource;
pub use snapshot::{ConfigurationSnapshot, FlagKey, FlagValues};
#[cfg(not(target_arch = "wasm32"))]
pub use source::FileFlagSource;
pub use source::{FlagSource, OfflineFlagSource, StaticFlagSource};
pub use wire::FlagUpdate;
