//! Where flag values come from
//!
//! `FlagSource` is the seam between the client's caching/fallback logic
//! and the transport. The browser build talks HTTP and SSE
//! (`remote::RemoteFlagSource`); tests and the native build use the
//! sources below.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use super::context::UserContext;
use super::snapshot::FlagValues;
use super::wire::FlagUpdate;
use crate::error::FlagSourceError;
use crate::queue::EventQueue;

pub trait FlagSource {
    /// Evaluate every flag for `ctx`. Must give up after `timeout_ms`.
    fn fetch(
        &self,
        ctx: &UserContext,
        timeout_ms: u32,
    ) -> impl Future<Output = Result<FlagValues, FlagSourceError>>;

    /// Start delivering changes for `ctx` into `updates`, replacing any
    /// previous subscription. Sources without a change feed return an error.
    fn stream(
        &self,
        _ctx: &UserContext,
        _updates: Rc<EventQueue<FlagUpdate>>,
    ) -> Result<(), FlagSourceError> {
        Err(FlagSourceError::Unavailable(
            "source has no change stream".to_string(),
        ))
    }
}

impl<S: FlagSource> FlagSource for Rc<S> {
    fn fetch(
        &self,
        ctx: &UserContext,
        timeout_ms: u32,
    ) -> impl Future<Output = Result<FlagValues, FlagSourceError>> {
        (**self).fetch(ctx, timeout_ms)
    }

    fn stream(
        &self,
        ctx: &UserContext,
        updates: Rc<EventQueue<FlagUpdate>>,
    ) -> Result<(), FlagSourceError> {
        (**self).stream(ctx, updates)
    }
}

/// Source with no backing service; every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFlagSource;

impl FlagSource for OfflineFlagSource {
    async fn fetch(&self, _ctx: &UserContext, _timeout_ms: u32) -> Result<FlagValues, FlagSourceError> {
        Err(FlagSourceError::Unavailable("offline".to_string()))
    }
}

/// In-memory source with a controllable change feed
#[derive(Debug, Default)]
pub struct StaticFlagSource {
    values: RefCell<FlagValues>,
    failing: Cell<bool>,
    fetches: Cell<usize>,
    subscriber: RefCell<Option<Rc<EventQueue<FlagUpdate>>>>,
}

impl StaticFlagSource {
    pub fn new(values: FlagValues) -> Self {
        Self {
            values: RefCell::new(values),
            ..Default::default()
        }
    }

    /// A source whose every request fails with a network error
    pub fn failing() -> Self {
        let source = Self::default();
        source.failing.set(true);
        source
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Change what the next fetch returns
    pub fn set_value(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Deliver an update to the current subscriber.
    /// Returns false when nothing is subscribed.
    pub fn push_update(&self, update: FlagUpdate) -> bool {
        match self.subscriber.borrow().as_ref() {
            Some(queue) => {
                queue.push(update);
                true
            }
            None => false,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl FlagSource for StaticFlagSource {
    async fn fetch(&self, _ctx: &UserContext, _timeout_ms: u32) -> Result<FlagValues, FlagSourceError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.failing.get() {
            return Err(FlagSourceError::Network("connection refused".to_string()));
        }
        Ok(self.values.borrow().clone())
    }

    fn stream(
        &self,
        _ctx: &UserContext,
        updates: Rc<EventQueue<FlagUpdate>>,
    ) -> Result<(), FlagSourceError> {
        if self.failing.get() {
            return Err(FlagSourceError::Network("connection refused".to_string()));
        }
        *self.subscriber.borrow_mut() = Some(updates);
        Ok(())
    }
}

/// Flat `{ "flag-name": "value" }` JSON file (native only)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileFlagSource {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileFlagSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source for the path in `DINO_RUN_FLAGS`, if set
    pub fn from_env() -> Option<Self> {
        std::env::var("DINO_RUN_FLAGS").ok().map(Self::new)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FlagSource for FileFlagSource {
    async fn fetch(&self, _ctx: &UserContext, _timeout_ms: u32) -> Result<FlagValues, FlagSourceError> {
        let body = std::fs::read_to_string(&self.path)
            .map_err(|e| FlagSourceError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let raw: std::collections::HashMap<String, serde_json::Value> = serde_json::from_str(&body)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Environment;

    fn ctx() -> UserContext {
        let mut rng = rand_pcg::Pcg32::new(0, 0);
        UserContext::named(&mut rng, "Test", &Environment::default(), 0.0, true)
    }

    #[test]
    fn test_static_source_fetch_and_fail() {
        let source = StaticFlagSource::new(FlagValues::from([(
            "dino-color".to_string(),
            "red".to_string(),
        )]));
        let values = pollster::block_on(source.fetch(&ctx(), 100)).unwrap();
        assert_eq!(values["dino-color"], "red");

        source.set_failing(true);
        assert!(pollster::block_on(source.fetch(&ctx(), 100)).is_err());
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn test_push_without_subscriber() {
        let source = StaticFlagSource::default();
        assert!(!source.push_update(FlagUpdate::Refetch));
        let queue = Rc::new(EventQueue::new());
        source.stream(&ctx(), queue.clone()).unwrap();
        assert!(source.push_update(FlagUpdate::Refetch));
        assert_eq!(queue.drain(), vec![FlagUpdate::Refetch]);
    }

    #[test]
    fn test_offline_source_never_streams() {
        let queue = Rc::new(EventQueue::new());
        assert!(OfflineFlagSource.stream(&ctx(), queue).is_err());
        assert!(pollster::block_on(OfflineFlagSource.fetch(&ctx(), 100)).is_err());
    }
}
