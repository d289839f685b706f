//! Unified cache builder for the flat-array variants.
//!
//! Picks a policy at runtime and hides the concrete type behind [`Cache`].
//! Expiring caches are built separately because their writes are fallible.
//!
//! ## Example
//!
//! ```rust
//! use flatlru::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru).unwrap();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::policy::expiring::{DEFAULT_TTK, ExpiringLruCache, ExpiryOptions};
use crate::policy::lru::LruCache;
use crate::policy::lru_delete::LruCacheWithDelete;
use crate::policy::sieve::SieveCache;
use crate::traits::CoreCache;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Least recently used, no removal.
    Lru,
    /// Least recently used with `remove` and a free list.
    LruWithDelete,
    /// SIEVE: insertion order plus visited bits.
    Sieve,
}

/// Unified cache wrapper that provides a consistent API regardless of policy.
pub struct Cache<K: Eq + Hash + Clone, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K: Eq + Hash + Clone, V> {
    Lru(LruCache<K, V>),
    LruWithDelete(LruCacheWithDelete<K, V>),
    Sieve(SieveCache<K, V>),
}

impl<K: Eq + Hash + Clone, V> Cache<K, V> {
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::LruWithDelete(_) => CachePolicy::LruWithDelete,
            CacheInner::Sieve(_) => CachePolicy::Sieve,
        }
    }

    /// Insert a key-value pair. Returns the previous value if the key existed.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.set(key, value),
            CacheInner::LruWithDelete(lru) => lru.set(key, value),
            CacheInner::Sieve(sieve) => sieve.set(key, value),
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::LruWithDelete(lru) => lru.get(key),
            CacheInner::Sieve(sieve) => sieve.get(key),
        }
    }

    /// Read a value without updating policy state.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.peek(key),
            CacheInner::LruWithDelete(lru) => lru.peek(key),
            CacheInner::Sieve(sieve) => sieve.peek(key),
        }
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.has(key),
            CacheInner::LruWithDelete(lru) => lru.has(key),
            CacheInner::Sieve(sieve) => sieve.has(key),
        }
    }

    /// Remove a key, returning its value if it was present.
    ///
    /// [`CachePolicy::Lru`] has no free list and cannot delete, so removal
    /// under it is an error rather than a silent miss.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, ConfigError> {
        match &mut self.inner {
            CacheInner::Lru(_) => Err(ConfigError::new(
                "policy `lru` cannot remove entries; build with `lru_with_delete` or `sieve`",
            )),
            CacheInner::LruWithDelete(lru) => Ok(lru.remove(key)),
            CacheInner::Sieve(sieve) => Ok(sieve.remove(key)),
        }
    }

    pub fn supports_remove(&self) -> bool {
        !matches!(self.inner, CacheInner::Lru(_))
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::LruWithDelete(lru) => lru.len(),
            CacheInner::Sieve(sieve) => sieve.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the maximum capacity.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::LruWithDelete(lru) => lru.capacity(),
            CacheInner::Sieve(sieve) => sieve.capacity(),
        }
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::LruWithDelete(lru) => lru.clear(),
            CacheInner::Sieve(sieve) => sieve.clear(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> CoreCache<K, V> for Cache<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Cache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        Cache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }

    fn clear(&mut self) {
        Cache::clear(self);
    }
}

impl<K: fmt::Debug + Eq + Hash + Clone, V: fmt::Debug> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            CacheInner::Lru(lru) => lru.fmt(f),
            CacheInner::LruWithDelete(lru) => lru.fmt(f),
            CacheInner::Sieve(sieve) => sieve.fmt(f),
        }
    }
}

/// Builder for creating cache instances.
#[derive(Clone)]
pub struct CacheBuilder {
    capacity: usize,
    ttk: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ttk: None,
            clock: None,
        }
    }

    /// Time-to-keep for expiring caches.
    pub fn ttk(mut self, ttk: Duration) -> Self {
        self.ttk = Some(ttk);
        self
    }

    /// Clock for expiring caches.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Expiry options assembled from `ttk` and `clock`, with defaults for
    /// whatever was not set.
    pub fn expiry_options(&self) -> ExpiryOptions {
        let options = ExpiryOptions::new(self.ttk.unwrap_or(DEFAULT_TTK));
        match &self.clock {
            Some(clock) => options.with_shared_clock(Arc::clone(clock)),
            None => options,
        }
    }

    /// Build a cache with the specified policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use flatlru::builder::{CacheBuilder, CachePolicy};
    ///
    /// let sieve = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Sieve).unwrap();
    /// assert_eq!(sieve.capacity(), 100);
    ///
    /// assert!(CacheBuilder::new(0).build::<u64, String>(CachePolicy::Lru).is_err());
    /// ```
    pub fn build<K, V>(&self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(LruCache::new(self.capacity)?),
            CachePolicy::LruWithDelete => {
                CacheInner::LruWithDelete(LruCacheWithDelete::new(self.capacity)?)
            },
            CachePolicy::Sieve => CacheInner::Sieve(SieveCache::new(self.capacity)?),
        };
        Ok(Cache { inner })
    }

    /// Build an expiring LRU cache.
    pub fn build_expiring<K, V>(&self) -> Result<ExpiringLruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        ExpiringLruCache::with_options(self.capacity, self.expiry_options())
    }

    /// Build an expiring LRU cache ready for background sweeping.
    #[cfg(feature = "monitor")]
    pub fn build_monitored<K, V>(&self) -> Result<crate::monitor::MonitoredCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        Ok(crate::monitor::MonitoredCache::new(self.build_expiring()?))
    }
}

impl fmt::Debug for CacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("capacity", &self.capacity)
            .field("ttk", &self.ttk)
            .field("custom_clock", &self.clock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_all_policies_basic_ops() {
        let policies = [CachePolicy::Lru, CachePolicy::LruWithDelete, CachePolicy::Sieve];

        for policy in policies {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(policy).unwrap();
            assert_eq!(cache.policy(), policy);

            assert_eq!(cache.insert(1, "one".to_string()), None);
            assert_eq!(cache.insert(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&2), Some(&"two".to_string()));
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));

            assert_eq!(cache.len(), 2);
            assert!(!cache.is_empty());

            assert_eq!(cache.insert(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.peek(&1), Some(&"ONE".to_string()));

            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_capacity_enforcement() {
        let mut cache = CacheBuilder::new(2).build::<u64, String>(CachePolicy::Lru).unwrap();

        cache.insert(1, "one".to_string());
        cache.insert(2, "two".to_string());
        cache.insert(3, "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_remove_support_by_policy() {
        let mut lru = CacheBuilder::new(2).build::<u8, u8>(CachePolicy::Lru).unwrap();
        lru.insert(1, 1);
        assert!(!lru.supports_remove());
        let err = lru.remove(&1).unwrap_err();
        assert!(err.message().contains("lru_with_delete"));
        assert!(lru.contains(&1));
        // A miss is still an error, so absent and unsupported never look alike.
        assert!(lru.remove(&9).is_err());

        let mut sieve = CacheBuilder::new(2).build::<u8, u8>(CachePolicy::Sieve).unwrap();
        sieve.insert(1, 1);
        assert!(sieve.supports_remove());
        assert_eq!(sieve.remove(&1), Ok(Some(1)));
        assert_eq!(sieve.remove(&1), Ok(None));

        let mut lru = CacheBuilder::new(2).build::<u8, u8>(CachePolicy::LruWithDelete).unwrap();
        lru.insert(1, 1);
        assert_eq!(lru.remove(&1), Ok(Some(1)));
    }

    #[test]
    fn test_generic_key_type_through_core_cache() {
        fn fill<C: CoreCache<String, usize>>(cache: &mut C) {
            for word in ["alpha", "beta", "gamma"] {
                cache.insert(word.to_string(), word.len());
            }
        }

        let mut cache = CacheBuilder::new(2).build::<String, usize>(CachePolicy::Sieve).unwrap();
        fill(&mut cache);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&"gamma".to_string()));
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: CachePolicy = serde_json::from_str("\"lru_with_delete\"").unwrap();
        assert_eq!(policy, CachePolicy::LruWithDelete);
        assert!(serde_json::from_str::<CachePolicy>("\"arc\"").is_err());
    }

    #[test]
    fn test_build_expiring_uses_builder_clock_and_ttk() {
        let clock = ManualClock::new(0);
        let mut cache = CacheBuilder::new(4)
            .ttk(Duration::from_millis(50))
            .clock(clock.clone())
            .build_expiring::<&str, i32>()
            .unwrap();
        cache.set("a", 1).unwrap();
        clock.set(50);
        assert_eq!(cache.expire().unwrap(), 1);
        assert_eq!(cache.ttk(), Duration::from_millis(50));
    }
}
