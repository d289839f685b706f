//! Millisecond clocks used to stamp entry ages.
//!
//! Expiring caches never read time directly; they ask a [`Clock`]. Reading
//! can fail (a system clock set before the UNIX epoch, or a custom source
//! that errors), and failures surface from `set` and `expire` as
//! [`CacheError::Clock`].
//!
//! Any `Fn() -> Result<u64, CacheError> + Send + Sync` closure is a clock:
//!
//! ```
//! use std::sync::Arc;
//!
//! use flatlru::clock::Clock;
//! use flatlru::error::CacheError;
//!
//! let fixed: Arc<dyn Clock> = Arc::new(|| Ok::<u64, CacheError>(42));
//! assert_eq!(fixed.now().unwrap(), 42);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::CacheError;

/// Source of millisecond timestamps.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now(&self) -> Result<u64, CacheError>;
}

impl<F> Clock for F
where
    F: Fn() -> Result<u64, CacheError> + Send + Sync,
{
    fn now(&self) -> Result<u64, CacheError> {
        self()
    }
}

/// Wall clock: milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<u64, CacheError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(CacheError::clock)?;
        Ok(u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same counter.
///
/// ```
/// use std::time::Duration;
///
/// use flatlru::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// let view = clock.clone();
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(view.now().unwrap(), 3_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(by, Ordering::SeqCst);
    }

    pub fn millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<u64, CacheError> {
        Ok(self.millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        let now = SystemClock.now().unwrap();
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn manual_clock_shares_state_across_clones() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        other.set(500);
        assert_eq!(clock.now().unwrap(), 500);
        clock.advance(Duration::from_millis(25));
        assert_eq!(other.millis(), 525);
    }

    #[test]
    fn closures_are_clocks() {
        let failing = || Err::<u64, _>(CacheError::clock("clock unplugged"));
        let err = Clock::now(&failing).unwrap_err();
        assert_eq!(err.to_string(), "clock failure: clock unplugged");
    }
}
