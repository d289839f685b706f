//! # Flat-Array LRU Cache
//!
//! Fixed-capacity least-recently-used cache whose recency list, key index and
//! slot columns are preallocated integer arrays. No entry is boxed; a slot is
//! addressed by a pointer of the index's width (`u8` for 255 slots, `u16` for
//! 65 535, ...).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V, I>                               │
//!   │                                                                          │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  I: KeyIndex<K>           key ──► pointer                        │   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   │                                   │                                      │
//!   │                                   ▼                                      │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  keys[p]  values[p]  forward[p]  backward[p]                     │   │
//!   │   │                                                                  │   │
//!   │   │  head ──► [p3] ◄──► [p0] ◄──► [p1] ◄── tail                      │   │
//!   │   │   (MRU)                               (LRU)                      │   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   set(d) when full (capacity = 3)
//!   ═══════════════════════════════════════════════════════════════════════════
//!     head ──► [c] ◄──► [b] ◄──► [a] ◄── tail
//!
//!     1. Remove "a" from the index
//!     2. Overwrite slot of "a" with ("d", value)
//!     3. Splay that slot to head
//!
//!     head ──► [d] ◄──► [c] ◄──► [b] ◄── tail
//!
//!   get(c)
//!   ═══════════════════════════════════════════════════════════════════════════
//!     head ──► [c] ◄──► [d] ◄──► [b] ◄── tail
//! ```
//!
//! ## Methods
//!
//! | Method              | Complexity | Description                             |
//! |---------------------|------------|-----------------------------------------|
//! | `new(capacity)`     | O(n)       | Preallocate list arrays                 |
//! | `set(k, v)`         | O(1)*      | Insert or update, may evict tail        |
//! | `get(&k)`           | O(1)*      | Value and splay to head                 |
//! | `peek(&k)`          | O(1)*      | Value without reordering                |
//! | `has(&k)`           | O(1)*      | Membership without reordering           |
//! | `peek_lru/peek_mru` | O(1)       | Tail / head entry                       |
//! | `iter/keys/values`  | O(n)       | MRU to LRU                              |
//! | `clear()`           | O(n)       | Drop everything                         |
//!
//! \* plus the index lookup: O(1) for hash and direct, O(depth) for the tree.
//!
//! The base variant cannot delete; use
//! [`LruCacheWithDelete`](crate::policy::lru_delete::LruCacheWithDelete).
//!
//! ## Example
//!
//! ```
//! use flatlru::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(3).unwrap();
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3);
//! cache.set("d", 4); // evicts "a"
//!
//! assert!(!cache.has(&"a"));
//! assert_eq!(cache.get(&"c"), Some(&3));
//! assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["c", "d", "b"]);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::index::hash::HashIndex;
use crate::index::traits::KeyIndex;
use crate::policy::core::{CacheCore, Iter, Keys, Values};
use crate::traits::{CoreCache, LruCacheTrait};

/// Fixed-capacity LRU cache over flat arrays.
#[derive(Clone)]
pub struct LruCache<K, V, I: KeyIndex<K> = HashIndex<K>> {
    pub(crate) core: CacheCore<K, V, I>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Creates an empty cache keyed through a hash index with `u32` pointers.
    ///
    /// Fails if `capacity` is zero or above `u32::MAX`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::indexed(capacity)
    }
}

impl<K, V, I: KeyIndex<K>> LruCache<K, V, I> {
    /// Creates an empty cache over `I::for_capacity(capacity)`.
    ///
    /// Fails if `capacity` is zero or too large for `I::Pointer`.
    pub fn indexed(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_index(capacity, I::for_capacity(capacity))
    }

    /// Creates an empty cache over a preconfigured index.
    pub fn with_index(capacity: usize, index: I) -> Result<Self, ConfigError> {
        Ok(Self {
            core: CacheCore::new(capacity, index)?,
        })
    }

    /// Builds a cache of `capacity` and feeds every pair through [`set`](Self::set).
    pub fn from_iter<T>(iter: T, capacity: usize) -> Result<Self, ConfigError>
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::indexed(capacity)?;
        cache.extend(iter);
        Ok(cache)
    }

    /// Inserts or updates `key`, returning the previous value on update.
    ///
    /// A new key evicts the least recently used entry when the cache is full.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.core.upsert_lru(key, value).into_previous()
    }

    /// Returns the value and marks the key most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let p = self.core.lookup(key)?;
        self.core.splay(p);
        self.core.value(p)
    }

    /// Mutable access; marks the key most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let p = self.core.lookup(key)?;
        self.core.splay(p);
        self.core.value_mut(p)
    }

    /// Returns the value without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.core.value(self.core.lookup(key)?)
    }

    /// Membership test without touching recency.
    pub fn has(&self, key: &K) -> bool {
        self.core.lookup(key).is_some()
    }

    /// Moves `key` to head without reading it.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.core.lookup(key) {
            Some(p) => {
                self.core.splay(p);
                true
            },
            None => false,
        }
    }

    /// Least recently used entry.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.core.tail_entry()
    }

    /// Most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.core.head_entry()
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V, I> {
        self.core.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V, I> {
        Keys {
            inner: self.core.iter(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V, I> {
        Values {
            inner: self.core.iter(),
        }
    }

    /// Drops every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// Validates the list, index and slot bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.core.check_invariants()
    }
}

impl<K, V, I: KeyIndex<K>> Extend<(K, V)> for LruCache<K, V, I> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a, K, V, I: KeyIndex<K>> IntoIterator for &'a LruCache<K, V, I> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for LruCache<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("entries", &DebugEntries(self.iter()))
            .finish()
    }
}

/// Formats an entry iterator as a map without consuming the caller's iterator.
pub(crate) struct DebugEntries<'a, K, V, I: KeyIndex<K>>(pub(crate) Iter<'a, K, V, I>);

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for DebugEntries<'_, K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.clone()).finish()
    }
}

impl<K, V, I: KeyIndex<K>> CoreCache<K, V> for LruCache<K, V, I> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.has(key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }

    fn clear(&mut self) {
        LruCache::clear(self);
    }
}

impl<K, V, I: KeyIndex<K>> LruCacheTrait<K, V> for LruCache<K, V, I> {
    fn peek(&self, key: &K) -> Option<&V> {
        LruCache::peek(self, key)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn peek_mru(&self) -> Option<(&K, &V)> {
        LruCache::peek_mru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }
}
