//! Caching flag client
//!
//! Reads are synchronous and always answer (last known value or the
//! caller's fallback). Network work is async and never fails outward:
//! errors are logged and the cached snapshot stays in force.
//!
//! Changes reach the game through [`Subscription`]s that the frame loop
//! polls. Every change swaps a whole [`ConfigurationSnapshot`], so a
//! reader never sees a mix of old and new values.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tokio::sync::Mutex;

use super::context::UserContext;
use super::snapshot::{ConfigurationSnapshot, FlagKey, FlagValues};
use super::source::FlagSource;
use super::wire::FlagUpdate;
use crate::config::FlagServiceConfig;
use crate::platform;
use crate::queue::EventQueue;

type SnapshotQueue = EventQueue<Rc<ConfigurationSnapshot>>;

/// Receiving end of change notifications
#[derive(Debug)]
pub struct Subscription {
    queue: Rc<SnapshotQueue>,
}

impl Subscription {
    /// Newest snapshot published since the last poll, if any
    pub fn latest(&self) -> Option<Rc<ConfigurationSnapshot>> {
        self.queue.latest()
    }

    /// Every snapshot published since the last poll, oldest first
    pub fn drain(&self) -> Vec<Rc<ConfigurationSnapshot>> {
        self.queue.drain()
    }
}

pub struct FlagClient<S: FlagSource> {
    source: S,
    config: FlagServiceConfig,
    values: RefCell<FlagValues>,
    snapshot: RefCell<Rc<ConfigurationSnapshot>>,
    user: RefCell<Option<UserContext>>,
    initialized: Cell<bool>,
    refetch_requested: Cell<bool>,
    /// Held for the duration of initialize/identify/refresh
    flight: Mutex<()>,
    updates: Rc<EventQueue<FlagUpdate>>,
    subscribers: RefCell<Vec<Weak<SnapshotQueue>>>,
}

impl<S: FlagSource> FlagClient<S> {
    pub fn new(source: S, config: FlagServiceConfig) -> Self {
        Self {
            source,
            config,
            values: RefCell::new(FlagValues::new()),
            snapshot: RefCell::new(Rc::new(ConfigurationSnapshot::default())),
            user: RefCell::new(None),
            initialized: Cell::new(false),
            refetch_requested: Cell::new(false),
            flight: Mutex::new(()),
            updates: Rc::new(EventQueue::new()),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// First evaluation. Anonymous when `user` is `None`.
    ///
    /// Always completes; on failure the defaults stay in force.
    pub async fn initialize(&self, user: Option<UserContext>) {
        let _guard = self.flight.lock().await;
        let ctx = user.unwrap_or_else(|| {
            let mut rng = Pcg32::seed_from_u64(platform::run_seed());
            UserContext::anonymous(&mut rng, &platform::environment(), platform::now_ms())
        });
        log::info!("Initializing flags for {}", ctx.key);

        match self.source.fetch(&ctx, self.config.init_timeout_ms).await {
            Ok(values) => {
                log::info!("Flags initialized ({} values)", values.len());
                self.publish(values);
            }
            Err(e) => log::warn!("Flag initialization failed, using defaults: {}", e),
        }
        self.subscribe(&ctx);
        *self.user.borrow_mut() = Some(ctx);
        self.initialized.set(true);
    }

    /// Switch the targeting context. Waits for any in-flight call first.
    pub async fn identify(&self, user: UserContext) {
        let _guard = self.flight.lock().await;
        log::info!("Identifying as {}", user.key);

        let result = self.source.fetch(&user, self.config.identify_timeout_ms).await;
        // Anything still queued was evaluated for the previous context
        let stale = self.updates.drain();
        if !stale.is_empty() {
            log::debug!("Dropped {} stream updates from the previous context", stale.len());
        }

        match result {
            Ok(values) => {
                self.publish(values);
            }
            Err(e) => log::warn!("Identify failed, keeping current flags: {}", e),
        }
        self.subscribe(&user);
        *self.user.borrow_mut() = Some(user);
    }

    /// Re-evaluate for the current context
    pub async fn refresh(&self) {
        let _guard = self.flight.lock().await;
        let Some(ctx) = self.user.borrow().clone() else {
            log::debug!("Refresh skipped, client not initialized");
            return;
        };
        match self.source.fetch(&ctx, self.config.identify_timeout_ms).await {
            Ok(values) => {
                self.publish(values);
            }
            Err(e) => log::warn!("Flag refresh failed, keeping current flags: {}", e),
        }
    }

    /// Current value of `name`, or `fallback` when the service has none
    pub fn get_value(&self, name: &str, fallback: &str) -> String {
        self.values
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// One of the game's own flags, with its documented default
    pub fn flag(&self, key: FlagKey) -> String {
        self.get_value(key.as_str(), key.default_value())
    }

    pub fn snapshot(&self) -> Rc<ConfigurationSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Register for change notifications
    pub fn on_change(&self) -> Subscription {
        let queue = Rc::new(SnapshotQueue::new());
        self.subscribers.borrow_mut().push(Rc::downgrade(&queue));
        Subscription { queue }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn current_user(&self) -> Option<UserContext> {
        self.user.borrow().clone()
    }

    /// True once after a stream asked for a re-fetch.
    /// The host answers by running [`FlagClient::refresh`].
    pub fn take_refetch_request(&self) -> bool {
        self.refetch_requested.replace(false)
    }

    /// Apply stream updates received since the last call.
    ///
    /// All pending updates fold into one snapshot swap. Returns true if
    /// the snapshot changed.
    pub fn pump(&self) -> bool {
        let updates = self.updates.drain();
        if updates.is_empty() {
            return false;
        }

        let mut values = self.values.borrow().clone();
        for update in updates {
            match update {
                FlagUpdate::Replace(all) => values = all,
                FlagUpdate::Patch { key, value } => {
                    values.insert(key, value);
                }
                FlagUpdate::Delete { key } => {
                    values.remove(&key);
                }
                FlagUpdate::Refetch => self.refetch_requested.set(true),
            }
        }
        self.publish(values)
    }

    /// Force a flag value locally
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn set_flag(&self, key: FlagKey, value: &str) -> bool {
        let mut values = self.values.borrow().clone();
        values.insert(key.as_str().to_string(), value.to_string());
        self.publish(values)
    }

    fn subscribe(&self, ctx: &UserContext) {
        if !self.config.streaming {
            return;
        }
        if let Err(e) = self.source.stream(ctx, self.updates.clone()) {
            log::info!("Flag streaming unavailable: {}", e);
        }
    }

    /// Store new values and, if the resolved snapshot moved, swap it and
    /// notify subscribers
    fn publish(&self, values: FlagValues) -> bool {
        let next = ConfigurationSnapshot::from_values(&values);
        *self.values.borrow_mut() = values;

        let current = self.snapshot();
        if *current == next {
            return false;
        }
        for (key, old, new) in current.diff(&next) {
            log::info!("Flag {} changed: {} -> {}", key.as_str(), old, new);
        }

        let next = Rc::new(next);
        *self.snapshot.borrow_mut() = next.clone();
        self.subscribers.borrow_mut().retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.push(next.clone());
                true
            }
            None => false,
        });
        true
    }
}

impl<S: FlagSource> std::fmt::Debug for FlagClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagClient")
            .field("initialized", &self.initialized.get())
            .field("snapshot", &self.snapshot.borrow())
            .finish_non_exhaustive()
    }
}
