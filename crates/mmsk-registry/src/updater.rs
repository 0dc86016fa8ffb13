//! Periodically refreshed cache of a single external data source.
//!
//! Readers never block on the network: they see the last successful value,
//! or nothing before the first success. A failed fetch keeps the previous
//! value and is only recorded for observability.

use crate::error::RegistryResult;
use chrono::{DateTime, Utc};
use mmsk_telemetry::Metrics;
use parking_lot::RwLock;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Boxed future for dyn-compatible async functions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Interval used in place of a zero refresh interval.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

type FetchFn<T> = Box<dyn Fn() -> BoxFuture<'static, RegistryResult<T>> + Send + Sync>;

/// Result of one refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New value stored.
    Updated,
    /// A previous fetch was still outstanding; nothing started.
    Overlapped,
    /// Fetch failed; previous value retained.
    Failed,
    /// Fixed-value updater; there is nothing to fetch.
    Skipped,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::Overlapped => "overlapped",
            RefreshOutcome::Failed => "failed",
            RefreshOutcome::Skipped => "skipped",
        }
    }
}

/// Last recorded fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Point-in-time view of an updater for status reporting.
#[derive(Debug, Clone)]
pub struct UpdaterStatus {
    pub name: String,
    pub loaded: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<UpdateFailure>,
    pub refreshing: bool,
}

struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: Instant,
    stored_at_utc: DateTime<Utc>,
}

/// Releases the in-flight flag when dropped, including when the fetch
/// future is cancelled mid-await.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cache updater for one data source.
pub struct Updater<T> {
    name: String,
    interval: Duration,
    fetch: Option<FetchFn<T>>,
    cache: RwLock<Option<CacheEntry<T>>>,
    last_error: RwLock<Option<UpdateFailure>>,
    in_flight: AtomicBool,
}

impl<T> std::fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("loaded", &self.cache.read().is_some())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Updater<T> {
    /// Create an updater that calls `fetch` every `interval`.
    pub fn new<F, Fut>(name: impl Into<String>, interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RegistryResult<T>> + Send + 'static,
    {
        let name = name.into();
        let interval = if interval.is_zero() {
            warn!(
                updater = %name,
                interval_ms = MIN_REFRESH_INTERVAL.as_millis() as u64,
                "Zero refresh interval, using minimum"
            );
            MIN_REFRESH_INTERVAL
        } else {
            interval
        };

        Self {
            name,
            interval,
            fetch: Some(Box::new(move || Box::pin(fetch()))),
            cache: RwLock::new(None),
            last_error: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create an updater holding `value` with no fetch function.
    pub fn fixed(name: impl Into<String>, value: T) -> Self {
        let updater = Self {
            name: name.into(),
            interval: Duration::MAX,
            fetch: None,
            cache: RwLock::new(None),
            last_error: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        };
        updater.store(value);
        updater
    }

    /// Create a fixed updater that has never loaded.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interval: Duration::MAX,
            fetch: None,
            cache: RwLock::new(None),
            last_error: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last successful value.
    pub fn cached(&self) -> Option<Arc<T>> {
        self.cache.read().as_ref().map(|entry| Arc::clone(&entry.value))
    }

    /// Last successful value together with its age.
    pub fn cached_with_age(&self) -> Option<(Arc<T>, Duration)> {
        self.cache
            .read()
            .as_ref()
            .map(|entry| (Arc::clone(&entry.value), entry.stored_at.elapsed()))
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.cache.read().as_ref().map(|entry| entry.stored_at_utc)
    }

    pub fn last_error(&self) -> Option<UpdateFailure> {
        self.last_error.read().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn status(&self) -> UpdaterStatus {
        UpdaterStatus {
            name: self.name.clone(),
            loaded: self.cache.read().is_some(),
            last_success: self.last_success(),
            last_error: self.last_error(),
            refreshing: self.is_refreshing(),
        }
    }

    /// Replace the cached value wholesale.
    pub fn store(&self, value: T) {
        let now = Utc::now();
        *self.cache.write() = Some(CacheEntry {
            value: Arc::new(value),
            stored_at: Instant::now(),
            stored_at_utc: now,
        });
        Metrics::updater_success(&self.name, now.timestamp() as f64);
    }

    /// Run one fetch unless another is still outstanding.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(fetch) = self.fetch.as_ref() else {
            return RefreshOutcome::Skipped;
        };

        let outcome = match InFlightGuard::acquire(&self.in_flight) {
            None => {
                debug!(updater = %self.name, "Previous refresh still in flight, skipping");
                RefreshOutcome::Overlapped
            }
            Some(_guard) => match fetch().await {
                Ok(value) => {
                    self.store(value);
                    *self.last_error.write() = None;
                    debug!(updater = %self.name, "Cache refreshed");
                    RefreshOutcome::Updated
                }
                Err(e) => {
                    warn!(
                        updater = %self.name,
                        error = %e,
                        "Cache refresh failed, keeping last good value"
                    );
                    *self.last_error.write() = Some(UpdateFailure {
                        message: e.to_string(),
                        at: Utc::now(),
                    });
                    RefreshOutcome::Failed
                }
            },
        };

        Metrics::updater_refresh(&self.name, outcome.as_str());
        outcome
    }

    /// Start the refresh loop on the current runtime.
    ///
    /// The first tick fires immediately. Fetches run inline, one at a time: a
    /// fetch that outlasts the interval delays the next tick rather than
    /// overlapping it. Cancelling `cancel` drops an outstanding fetch.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let updater = Arc::clone(self);

        tokio::spawn(async move {
            if updater.fetch.is_none() {
                return;
            }

            info!(
                updater = %updater.name,
                interval_ms = updater.interval.as_millis() as u64,
                "Updater started"
            );

            let mut ticker = tokio::time::interval(updater.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = updater.refresh() => {}
                }
            }

            info!(updater = %updater.name, "Updater stopped");
        })
    }
}
