//! Background expiry for [`ExpiringLruCache`].
//!
//! [`MonitoredCache`] shares an expiring cache behind `Arc<Mutex<_>>` and can
//! run a tokio task that calls [`expire`](ExpiringLruCache::expire) on a fixed
//! interval. The first sweep happens one interval after [`monitor`] is
//! called; missed ticks are delayed rather than replayed in a burst.
//!
//! ```text
//!   monitor(period)
//!        │
//!        ▼
//!   ┌──────────────────────────── tokio task ────────────────────────────┐
//!   │ loop {                                                             │
//!   │   select! { cancelled => return Ok(()), tick => {} }               │
//!   │   lock cache; expire()                                             │
//!   │     Ok(n)  → did_expire(&cache, &report)   (default: debug! event) │
//!   │     Err(e) → did_error(&e, &cache)                                 │
//!   │                true  → warn!, keep going                           │
//!   │                false → error!, return Err(e)                       │
//!   │                panic → error!, return Err(e)                       │
//!   │ }                                                                  │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one monitor runs per cache: calling [`monitor`] again cancels the
//! previous task. Cancellation takes effect at the next await point; a sweep
//! already holding the lock finishes first.
//!
//! [`monitor`]: MonitoredCache::monitor

use std::fmt;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::{CacheError, ConfigError};
use crate::index::hash::HashIndex;
use crate::index::traits::KeyIndex;
use crate::policy::expiring::{ExpiringLruCache, ExpiryOptions};

/// Timing of one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireReport {
    pub begin: Instant,
    pub elapsed: Duration,
    pub expired: usize,
}

/// Called after every successful sweep.
pub type ExpireCallback<K, V, I> =
    Box<dyn Fn(&ExpiringLruCache<K, V, I>, &ExpireReport) + Send + Sync>;

/// Called when a sweep fails. Return `true` to keep the monitor running.
pub type ErrorCallback<K, V, I> =
    Box<dyn Fn(&CacheError, &ExpiringLruCache<K, V, I>) -> bool + Send + Sync>;

/// Hooks for a monitor run.
pub struct MonitorOptions<K, V, I: KeyIndex<K> = HashIndex<K>> {
    did_expire: Option<ExpireCallback<K, V, I>>,
    did_error: Option<ErrorCallback<K, V, I>>,
}

impl<K, V, I: KeyIndex<K>> MonitorOptions<K, V, I> {
    pub fn new() -> Self {
        Self {
            did_expire: None,
            did_error: None,
        }
    }

    /// Replaces the default `debug!` event emitted after each sweep.
    pub fn on_expire<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ExpiringLruCache<K, V, I>, &ExpireReport) + Send + Sync + 'static,
    {
        self.did_expire = Some(Box::new(callback));
        self
    }

    /// Installs an error handler. Without one, the first error stops the
    /// monitor.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CacheError, &ExpiringLruCache<K, V, I>) -> bool + Send + Sync + 'static,
    {
        self.did_error = Some(Box::new(callback));
        self
    }
}

impl<K, V, I: KeyIndex<K>> Default for MonitorOptions<K, V, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, I: KeyIndex<K>> fmt::Debug for MonitorOptions<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorOptions")
            .field("did_expire", &self.did_expire.is_some())
            .field("did_error", &self.did_error.is_some())
            .finish()
    }
}

/// Handle to a running monitor task.
#[derive(Debug)]
pub struct MonitorHandle {
    token: CancellationToken,
    task: JoinHandle<Result<(), CacheError>>,
}

impl MonitorHandle {
    /// Stops the monitor. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `true` once cancelled by a caller, by a newer monitor, or by an
    /// unhandled sweep error.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the task to end.
    ///
    /// Returns the error that stopped the monitor, or `Ok(())` after a
    /// cancellation. A panic inside `did_expire` is resumed here.
    pub async fn join(self) -> Result<(), CacheError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(_) => Ok(()),
        }
    }
}

/// Expiring cache shared with an optional background sweeper.
pub struct MonitoredCache<K, V, I: KeyIndex<K> = HashIndex<K>> {
    cache: Arc<Mutex<ExpiringLruCache<K, V, I>>>,
    active: Mutex<Option<CancellationToken>>,
}

impl<K: Eq + Hash + Clone, V> MonitoredCache<K, V> {
    pub fn with_options(capacity: usize, options: ExpiryOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(ExpiringLruCache::with_options(capacity, options)?))
    }
}

impl<K, V, I: KeyIndex<K>> MonitoredCache<K, V, I> {
    pub fn new(cache: ExpiringLruCache<K, V, I>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            active: Mutex::new(None),
        }
    }

    /// Shared handle to the underlying cache.
    pub fn shared(&self) -> Arc<Mutex<ExpiringLruCache<K, V, I>>> {
        Arc::clone(&self.cache)
    }

    pub fn with<R>(&self, f: impl FnOnce(&ExpiringLruCache<K, V, I>) -> R) -> R {
        f(&*self.cache.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ExpiringLruCache<K, V, I>) -> R) -> R {
        f(&mut *self.cache.lock())
    }

    /// Runs one sweep now, serialized with the monitor.
    pub fn expire(&self) -> Result<usize, CacheError> {
        self.cache.lock().expire()
    }

    pub fn is_monitoring(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Cancels the active monitor, if any.
    pub fn stop_monitor(&self) {
        if let Some(token) = self.active.lock().take() {
            token.cancel();
        }
    }
}

impl<K, V, I> MonitoredCache<K, V, I>
where
    K: Send + 'static,
    V: Send + 'static,
    I: KeyIndex<K> + Send + 'static,
{
    /// Starts sweeping every `interval`, replacing any running monitor.
    ///
    /// Fails on a zero interval.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn monitor(
        &self,
        interval: Duration,
        options: MonitorOptions<K, V, I>,
    ) -> Result<MonitorHandle, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::new("monitor interval must be greater than zero"));
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.active.lock().replace(token.clone()) {
            previous.cancel();
        }

        let task = tokio::spawn(run(
            Arc::clone(&self.cache),
            interval,
            options,
            token.clone(),
        ));
        Ok(MonitorHandle { token, task })
    }
}

impl<K, V, I: KeyIndex<K>> Drop for MonitoredCache<K, V, I> {
    fn drop(&mut self) {
        self.stop_monitor();
    }
}

impl<K, V, I: KeyIndex<K>> From<ExpiringLruCache<K, V, I>> for MonitoredCache<K, V, I> {
    fn from(cache: ExpiringLruCache<K, V, I>) -> Self {
        Self::new(cache)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for MonitoredCache<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoredCache")
            .field("cache", &*self.cache.lock())
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}

async fn run<K, V, I: KeyIndex<K>>(
    cache: Arc<Mutex<ExpiringLruCache<K, V, I>>>,
    period: Duration,
    options: MonitorOptions<K, V, I>,
    token: CancellationToken,
) -> Result<(), CacheError> {
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        if let ControlFlow::Break(err) = sweep(&cache, &options) {
            token.cancel();
            return Err(err);
        }
    }
}

fn sweep<K, V, I: KeyIndex<K>>(
    cache: &Mutex<ExpiringLruCache<K, V, I>>,
    options: &MonitorOptions<K, V, I>,
) -> ControlFlow<CacheError> {
    let mut guard = cache.lock();
    let begin = Instant::now();

    let err = match guard.expire() {
        Ok(expired) => {
            let report = ExpireReport {
                begin,
                elapsed: begin.elapsed(),
                expired,
            };
            match &options.did_expire {
                Some(did_expire) => did_expire(&*guard, &report),
                None => tracing::debug!(
                    expired,
                    elapsed_us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
                    "expiry sweep finished"
                ),
            }
            return ControlFlow::Continue(());
        },
        Err(err) => err,
    };

    let Some(did_error) = &options.did_error else {
        tracing::error!(error = %err, "expiry sweep failed; stopping monitor");
        return ControlFlow::Break(err);
    };

    match panic::catch_unwind(AssertUnwindSafe(|| did_error(&err, &*guard))) {
        Ok(true) => {
            tracing::warn!(error = %err, "expiry sweep failed; error handled, monitor continues");
            ControlFlow::Continue(())
        },
        Ok(false) => {
            tracing::error!(error = %err, "expiry sweep failed; stopping monitor");
            ControlFlow::Break(err)
        },
        Err(_) => {
            tracing::error!(error = %err, "expiry error handler panicked; stopping monitor");
            ControlFlow::Break(err)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn monitored(clock: &ManualClock, ttk_ms: u64) -> MonitoredCache<&'static str, i32> {
        let options = ExpiryOptions::new(Duration::from_millis(ttk_ms)).with_clock(clock.clone());
        MonitoredCache::with_options(8, options).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn first_sweep_waits_one_interval() {
        let clock = ManualClock::new(0);
        let cache = monitored(&clock, 10);
        cache.with_mut(|c| c.set("a", 1)).unwrap();
        clock.set(1_000);

        let handle = cache
            .monitor(Duration::from_secs(1), MonitorOptions::new())
            .unwrap();
        time::sleep(Duration::from_millis(500)).await;
        assert!(cache.with(|c| c.has(&"a")));

        time::sleep(Duration::from_millis(600)).await;
        assert!(cache.with(|c| c.is_empty()));

        cache.stop_monitor();
        assert!(handle.join().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected() {
        let cache = monitored(&ManualClock::new(0), 10);
        assert!(cache.monitor(Duration::ZERO, MonitorOptions::new()).is_err());
        assert!(!cache.is_monitoring());
    }

    #[test]
    fn stop_without_monitor_is_a_no_op() {
        let cache = monitored(&ManualClock::new(0), 10);
        cache.stop_monitor();
        assert!(!cache.is_monitoring());
        assert_eq!(cache.expire().unwrap(), 0);
    }
}
