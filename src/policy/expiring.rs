//! # Time-To-Keep Expiring LRU Cache
//!
//! [`LruCacheWithDelete`] plus a per-slot age ledger. Every `set` stamps the
//! written slot with the clock's current millisecond timestamp; [`expire`]
//! sweeps the ledger and deletes entries written at or before the *curfew*
//! (`now - ttk`).
//!
//! ## Age Ledger
//!
//! ```text
//!   slot:     0        1        2        3
//!   keys:   [ "a"  ,  "b"  ,  "c"  ,  stale ]
//!   ages:   [ 1000 ,  4000 ,  9000 ,  2000  ]     ttk = 5000, now = 9000
//!                                                 curfew = 4000
//!
//!   expire():
//!     slot 0: 1000 <= 4000, "a" indexes to 0   → delete
//!     slot 1: 4000 <= 4000, "b" indexes to 1   → delete (inclusive)
//!     slot 2: 9000 >  4000                     → keep
//!     slot 3: 2000 <= 4000, stale key          → skip (not live)
//! ```
//!
//! Ages are only written by `set` / `setpop`; reads never refresh them. Stale
//! ages on free slots are ignored because the sweep checks that the slot's key
//! still resolves to the same pointer.
//!
//! The sweep is O(allocated slots). Between sweeps entries can outlive `ttk`:
//! the oldest observable entry is at most `ttk` plus the sweep interval old.
//!
//! ## Configuration
//!
//! [`ExpiryOptions`] carries `ttk` (default 15 minutes) and a [`Clock`]
//! (default [`SystemClock`]). It deserializes from any serde format:
//!
//! ```
//! use std::time::Duration;
//!
//! use flatlru::policy::expiring::ExpiryOptions;
//!
//! let options: ExpiryOptions = serde_json::from_str(r#"{ "ttk": 60000 }"#).unwrap();
//! assert_eq!(options.ttk, Duration::from_secs(60));
//!
//! let err = serde_json::from_str::<ExpiryOptions>(r#"{ "ttl": 60000 }"#).unwrap_err();
//! assert!(err.to_string().contains("ttk"));
//! ```
//!
//! [`expire`]: ExpiringLruCache::expire

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, ConfigError, InvariantError};
use crate::index::hash::HashIndex;
use crate::index::traits::KeyIndex;
use crate::policy::core::{EvictionRecord, Iter, Keys, Values};
use crate::policy::lru::DebugEntries;
use crate::policy::lru_delete::LruCacheWithDelete;
use crate::traits::ExpiringCache;

/// Default time-to-keep: 15 minutes.
pub const DEFAULT_TTK: Duration = Duration::from_secs(15 * 60);

/// Whole milliseconds in `duration`, rounded up so a sub-millisecond
/// remainder never shortens the time-to-keep.
fn ceil_millis(duration: Duration) -> u64 {
    let partial = duration.subsec_nanos() % 1_000_000 != 0;
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .saturating_add(u64::from(partial))
}

/// Expiry configuration: time-to-keep and the clock that stamps ages.
#[derive(Clone, Deserialize)]
#[serde(try_from = "RawExpiryOptions")]
pub struct ExpiryOptions {
    pub ttk: Duration,
    pub clock: Arc<dyn Clock>,
}

impl ExpiryOptions {
    pub fn new(ttk: Duration) -> Self {
        Self {
            ttk,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ExpiryOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TTK)
    }
}

impl fmt::Debug for ExpiryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryOptions")
            .field("ttk", &self.ttk)
            .finish_non_exhaustive()
    }
}

/// Wire shape of [`ExpiryOptions`]; `ttk` is in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExpiryOptions {
    #[serde(default)]
    ttk: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    ttl: bool,
}

fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer).map(|_| true)
}

impl TryFrom<RawExpiryOptions> for ExpiryOptions {
    type Error = ConfigError;

    fn try_from(raw: RawExpiryOptions) -> Result<Self, Self::Error> {
        if raw.ttl {
            return Err(ConfigError::new(
                "unsupported option `ttl`: the expiry window is `ttk` (time-to-keep, milliseconds)",
            ));
        }
        Ok(match raw.ttk {
            Some(ms) => Self::new(Duration::from_millis(ms)),
            None => Self::default(),
        })
    }
}

/// LRU cache with per-entry ages and an explicit expiry sweep.
#[derive(Clone)]
pub struct ExpiringLruCache<K, V, I: KeyIndex<K> = HashIndex<K>> {
    inner: LruCacheWithDelete<K, V, I>,
    ages: Vec<u64>,
    ttk: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash + Clone, V> ExpiringLruCache<K, V> {
    /// Hash-indexed cache with the default 15 minute ttk and the system clock.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::indexed(capacity, ExpiryOptions::default())
    }

    pub fn with_options(capacity: usize, options: ExpiryOptions) -> Result<Self, ConfigError> {
        Self::indexed(capacity, options)
    }
}

impl<K, V, I: KeyIndex<K>> ExpiringLruCache<K, V, I> {
    pub fn indexed(capacity: usize, options: ExpiryOptions) -> Result<Self, ConfigError> {
        Self::with_index(capacity, I::for_capacity(capacity), options)
    }

    pub fn with_index(capacity: usize, index: I, options: ExpiryOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: LruCacheWithDelete::with_index(capacity, index)?,
            ages: vec![0; capacity],
            ttk: options.ttk,
            clock: options.clock,
        })
    }

    /// Inserts or updates `key` and stamps its age.
    ///
    /// The clock is read before anything is written, so a clock failure
    /// leaves the cache untouched.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, CacheError> {
        let now = self.clock.now()?;
        let placement = self.inner.lru.core.upsert_lru(key, value);
        self.ages[placement.slot()] = now;
        Ok(placement.into_previous())
    }

    /// Fills a new cache from `iter`, stamping each pair through [`set`](Self::set).
    ///
    /// Later pairs win over earlier ones, and only the `capacity` most recent
    /// keys survive.
    pub fn from_iter<T>(iter: T, capacity: usize, options: ExpiryOptions) -> Result<Self, CacheError>
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::indexed(capacity, options)?;
        for (key, value) in iter {
            cache.set(key, value)?;
        }
        Ok(cache)
    }

    /// Reads a value and marks it most recently used. Does not refresh its age.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    /// Marks `key` most recently used without reading it or refreshing its age.
    pub fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.inner.has(key)
    }

    pub fn delete(&mut self, key: &K) -> bool {
        self.inner.delete(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub fn remove_or(&mut self, key: &K, missing: V) -> V {
        self.inner.remove_or(key, missing)
    }

    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.inner.peek_lru()
    }

    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.inner.peek_mru()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn iter(&self) -> Iter<'_, K, V, I> {
        self.inner.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V, I> {
        self.inner.keys()
    }

    pub fn values(&self) -> Values<'_, K, V, I> {
        self.inner.values()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn ttk(&self) -> Duration {
        self.ttk
    }

    /// Timestamp of the last write to `key`.
    pub fn age_of(&self, key: &K) -> Option<u64> {
        self.inner.lru.core.lookup(key).map(|p| self.ages[p])
    }

    /// `now - ttk`, or `None` while `now < ttk` (nothing can be expired yet).
    pub fn curfew(&self) -> Result<Option<u64>, CacheError> {
        Ok(self.clock.now()?.checked_sub(ceil_millis(self.ttk)))
    }

    /// Deletes every live entry whose age is at or before the curfew.
    ///
    /// Reads the clock once, then scans every allocated slot. Returns the
    /// number of entries removed; a second call without intervening writes
    /// or clock movement removes nothing.
    pub fn expire(&mut self) -> Result<usize, CacheError> {
        let Some(curfew) = self.curfew()? else {
            return Ok(0);
        };

        let core = &mut self.inner.lru.core;
        let mut expired = 0;
        for p in 0..core.allocated() {
            if self.ages[p] > curfew || !core.is_live(p) {
                continue;
            }
            core.remove_at(p);
            expired += 1;
        }
        tracing::trace!(expired, curfew, "expiry sweep finished");
        Ok(expired)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.check_invariants()?;
        if self.ages.len() != self.capacity() {
            return Err(InvariantError::new(format!(
                "age ledger has {} slots for capacity {}",
                self.ages.len(),
                self.capacity()
            )));
        }
        Ok(())
    }
}

impl<K: Clone, V, I: KeyIndex<K>> ExpiringLruCache<K, V, I> {
    /// Like [`set`](Self::set), but reports what was displaced.
    pub fn setpop(&mut self, key: K, value: V) -> Result<Option<EvictionRecord<K, V>>, CacheError> {
        let now = self.clock.now()?;
        let (slot, record) = self.inner.lru.core.upsert_lru_reporting(key, value);
        self.ages[slot] = now;
        Ok(record)
    }
}

impl<'a, K, V, I: KeyIndex<K>> IntoIterator for &'a ExpiringLruCache<K, V, I> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for ExpiringLruCache<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringLruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("ttk", &self.ttk)
            .field("entries", &DebugEntries(self.iter()))
            .finish()
    }
}

impl<K, V, I: KeyIndex<K>> ExpiringCache<K, V> for ExpiringLruCache<K, V, I> {
    fn ttk(&self) -> Duration {
        self.ttk
    }

    fn age_of(&self, key: &K) -> Option<u64> {
        ExpiringLruCache::age_of(self, key)
    }

    fn expire(&mut self) -> Result<usize, CacheError> {
        ExpiringLruCache::expire(self)
    }
}
