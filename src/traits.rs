//! # Cache Trait Hierarchy
//!
//! Shared interface for the flat-array cache variants, so code can be written
//! once against "any cache" or "any cache that can delete".
//!
//! ## Architecture
//!
//! ```text
//!                          ┌─────────────────────────────────────────┐
//!                          │            CoreCache<K, V>              │
//!                          │                                         │
//!                          │  insert(&mut, K, V) → Option<V>         │
//!                          │  get(&mut, &K) → Option<&V>             │
//!                          │  contains(&, &K) → bool                 │
//!                          │  len / is_empty / capacity / clear      │
//!                          └──────────────────┬──────────────────────┘
//!                                             │
//!                ┌────────────────────────────┴──────────────────────────┐
//!                ▼                                                       ▼
//!   ┌────────────────────────────┐                        ┌─────────────────────────────┐
//!   │   LruCacheTrait<K, V>      │                        │    MutableCache<K, V>       │
//!   │                            │                        │                             │
//!   │  peek(&K) → Option<&V>     │                        │  remove(&K) → Option<V>     │
//!   │  peek_lru() → (&K, &V)     │                        │  remove_batch(&[K])         │
//!   │  peek_mru() → (&K, &V)     │                        │                             │
//!   │  touch(&K) → bool          │                        └─────────────────────────────┘
//!   └────────────────────────────┘
//!
//!                          ┌─────────────────────────────────────────┐
//!                          │          ExpiringCache<K, V>            │
//!                          │                                         │
//!                          │  ttk() → Duration                       │
//!                          │  age_of(&K) → Option<u64>               │
//!                          │  expire(&mut) → Result<usize>           │
//!                          └─────────────────────────────────────────┘
//! ```
//!
//! ## Which Variant Implements What
//!
//! | Type                  | `CoreCache` | `MutableCache` | `LruCacheTrait` | `ExpiringCache` |
//! |-----------------------|-------------|----------------|-----------------|-----------------|
//! | `LruCache`            | ✅          | ❌             | ✅              | ❌              |
//! | `LruCacheWithDelete`  | ✅          | ✅             | ✅              | ❌              |
//! | `ExpiringLruCache`    | ❌          | ❌             | ❌              | ✅              |
//! | `SieveCache`          | ✅          | ✅             | ❌              | ❌              |
//!
//! `ExpiringLruCache::set` reads a fallible clock, so it cannot satisfy the
//! infallible `CoreCache::insert`; it exposes its own `Result`-returning API.
//! The base `LruCache` has no free list and therefore no removal.
//!
//! ## Example Usage
//!
//! ```
//! use flatlru::policy::lru_delete::LruCacheWithDelete;
//! use flatlru::traits::{CoreCache, MutableCache};
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.insert(*key, value.to_string());
//!     }
//! }
//!
//! fn invalidate<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
//!     for key in keys {
//!         cache.remove(key);
//!     }
//! }
//!
//! let mut cache = LruCacheWithDelete::new(8).unwrap();
//! warm(&mut cache, &[(1, "one"), (2, "two")]);
//! invalidate(&mut cache, &[1]);
//! assert!(!cache.contains(&1));
//! assert!(cache.contains(&2));
//! ```

use std::time::Duration;

use crate::error::CacheError;

/// Core cache operations that all infallible caches support.
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// At capacity, an entry is evicted according to the cache's policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value, updating policy state (recency or visit
    /// bit). Use [`contains`](Self::contains) to test without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fixed capacity.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use flatlru::policy::sieve::SieveCache;
/// use flatlru::traits::{CoreCache, MutableCache};
///
/// let mut cache = SieveCache::new(4).unwrap();
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// assert_eq!(cache.remove_batch(&[1, 3]), vec![Some("a"), None]);
/// assert_eq!(cache.len(), 1);
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys; results are in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// Recency-ordered caches.
pub trait LruCacheTrait<K, V>: CoreCache<K, V> {
    /// Reads a value without changing recency.
    fn peek(&self, key: &K) -> Option<&V>;

    /// The least recently used entry (next eviction victim).
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// The most recently used entry.
    fn peek_mru(&self) -> Option<(&K, &V)>;

    /// Marks a key as most recently used. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;
}

/// Caches whose entries expire after a fixed time-to-keep.
pub trait ExpiringCache<K, V> {
    /// Age after which an entry becomes eligible for expiry.
    fn ttk(&self) -> Duration;

    /// Millisecond timestamp of the key's last write.
    fn age_of(&self, key: &K) -> Option<u64>;

    /// Deletes every entry written at or before `now - ttk`.
    ///
    /// Returns how many entries were removed.
    fn expire(&mut self) -> Result<usize, CacheError>;
}
