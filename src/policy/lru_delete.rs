//! # LRU Cache With Deletion
//!
//! Extends the flat-array [`LruCache`] with `delete` / `remove` and
//! `setpop`. Deleted pointers go onto a bounded free list and are reused
//! before any never-used slot, so the number of allocated slots never exceeds
//! the capacity.
//!
//! ## Free List Flow
//!
//! ```text
//!   delete(b)
//!   ═══════════════════════════════════════════════════════════════════════════
//!     head ──► [c:2] ◄──► [b:1] ◄──► [a:0] ◄── tail        free: []
//!
//!     1. Unlink slot 1 (neighbours c and a now point at each other)
//!     2. Remove "b" from the index
//!     3. Push pointer 1 onto the free list, move the value out
//!
//!     head ──► [c:2] ◄──► [a:0] ◄── tail                   free: [1]
//!
//!   set(d)
//!   ═══════════════════════════════════════════════════════════════════════════
//!     pops pointer 1 and writes "d" there
//!
//!     head ──► [d:1] ◄──► [c:2] ◄──► [a:0] ◄── tail        free: []
//! ```
//!
//! Capacity eviction reuses the victim's pointer directly; it never passes
//! through the free list.
//!
//! ## Example
//!
//! ```
//! use flatlru::policy::lru_delete::LruCacheWithDelete;
//!
//! let mut cache = LruCacheWithDelete::new(2).unwrap();
//! cache.set("a", 1);
//! cache.set("b", 2);
//!
//! let record = cache.setpop("c", 3).unwrap();
//! assert!(record.evicted);
//! assert_eq!((record.key, record.value), ("a", 1));
//!
//! assert!(cache.delete(&"b"));
//! assert!(!cache.delete(&"b"));
//! assert_eq!(cache.remove_or(&"b", 0), 0);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::index::hash::HashIndex;
use crate::index::traits::KeyIndex;
use crate::policy::core::{EvictionRecord, Iter, Keys, Values};
use crate::policy::lru::{DebugEntries, LruCache};
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Flat-array LRU cache that supports arbitrary removal.
#[derive(Clone)]
pub struct LruCacheWithDelete<K, V, I: KeyIndex<K> = HashIndex<K>> {
    pub(crate) lru: LruCache<K, V, I>,
}

impl<K: Eq + Hash + Clone, V> LruCacheWithDelete<K, V> {
    /// Creates an empty cache keyed through a hash index with `u32` pointers.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::indexed(capacity)
    }
}

impl<K, V, I: KeyIndex<K>> LruCacheWithDelete<K, V, I> {
    /// Creates an empty cache over `I::for_capacity(capacity)`.
    pub fn indexed(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            lru: LruCache::indexed(capacity)?,
        })
    }

    pub fn with_index(capacity: usize, index: I) -> Result<Self, ConfigError> {
        Ok(Self {
            lru: LruCache::with_index(capacity, index)?,
        })
    }

    pub fn from_iter<T>(iter: T, capacity: usize) -> Result<Self, ConfigError>
    where
        T: IntoIterator<Item = (K, V)>,
    {
        Ok(Self {
            lru: LruCache::from_iter(iter, capacity)?,
        })
    }

    /// Inserts or updates `key`; a new key reuses a deleted slot first.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.lru.set(key, value)
    }

    /// Removes `key`. Returns `false` if it was absent.
    pub fn delete(&mut self, key: &K) -> bool {
        self.lru.core.remove(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.lru.core.remove(key)
    }

    /// Removes `key`, falling back to `missing` when absent.
    pub fn remove_or(&mut self, key: &K, missing: V) -> V {
        self.remove(key).unwrap_or(missing)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.lru.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.lru.get_mut(key)
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        self.lru.peek(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.lru.has(key)
    }

    pub fn touch(&mut self, key: &K) -> bool {
        self.lru.touch(key)
    }

    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.lru.peek_lru()
    }

    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.lru.peek_mru()
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    /// Slots ever allocated (live plus free).
    pub fn allocated(&self) -> usize {
        self.lru.core.allocated()
    }

    /// Vacated slots waiting to be reused.
    pub fn free_slots(&self) -> usize {
        self.lru.core.free_slots()
    }

    pub fn iter(&self) -> Iter<'_, K, V, I> {
        self.lru.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V, I> {
        self.lru.keys()
    }

    pub fn values(&self) -> Values<'_, K, V, I> {
        self.lru.values()
    }

    pub fn clear(&mut self) {
        self.lru.clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.lru.check_invariants()
    }
}

impl<K: Clone, V, I: KeyIndex<K>> LruCacheWithDelete<K, V, I> {
    /// Like [`set`](Self::set), but reports what was displaced.
    ///
    /// - `Some(record)` with `evicted: true`: a capacity eviction dropped
    ///   `record.key`.
    /// - `Some(record)` with `evicted: false`: `key` existed and
    ///   `record.value` is its previous value.
    /// - `None`: the key was new and a free slot was available.
    pub fn setpop(&mut self, key: K, value: V) -> Option<EvictionRecord<K, V>> {
        self.lru.core.upsert_lru_reporting(key, value).1
    }
}

impl<K, V, I: KeyIndex<K>> Extend<(K, V)> for LruCacheWithDelete<K, V, I> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.lru.extend(iter);
    }
}

impl<'a, K, V, I: KeyIndex<K>> IntoIterator for &'a LruCacheWithDelete<K, V, I> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for LruCacheWithDelete<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheWithDelete")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("entries", &DebugEntries(self.iter()))
            .finish()
    }
}

impl<K, V, I: KeyIndex<K>> CoreCache<K, V> for LruCacheWithDelete<K, V, I> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCacheWithDelete::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.has(key)
    }

    fn len(&self) -> usize {
        LruCacheWithDelete::len(self)
    }

    fn capacity(&self) -> usize {
        LruCacheWithDelete::capacity(self)
    }

    fn clear(&mut self) {
        LruCacheWithDelete::clear(self);
    }
}

impl<K, V, I: KeyIndex<K>> MutableCache<K, V> for LruCacheWithDelete<K, V, I> {
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCacheWithDelete::remove(self, key)
    }
}

impl<K, V, I: KeyIndex<K>> LruCacheTrait<K, V> for LruCacheWithDelete<K, V, I> {
    fn peek(&self, key: &K) -> Option<&V> {
        LruCacheWithDelete::peek(self, key)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCacheWithDelete::peek_lru(self)
    }

    fn peek_mru(&self) -> Option<(&K, &V)> {
        LruCacheWithDelete::peek_mru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCacheWithDelete::touch(self, key)
    }
}
