//! # SIEVE Cache
//!
//! SIEVE keeps entries in insertion order and never promotes on a hit.
//! Instead each slot carries a `visited` bit; a roaming *hand* clears bits
//! as it passes and evicts the first slot it finds unvisited.
//!
//! ## Eviction Flow
//!
//! ```text
//!   capacity = 3, inserted a, b, c, then get(a)
//!
//!     head ──► [c] ◄──► [b] ◄──► [a*] ◄── tail       (* = visited)
//!
//!   set(d):
//!     hand starts at tail (no parked position)
//!     [a*] visited   → clear bit, move toward head
//!     [b]  unvisited → victim
//!     hand parks at b's predecessor [c]
//!
//!     head ──► [d] ◄──► [c] ◄──► [a] ◄── tail        hand ──► [c]
//! ```
//!
//! The hand wraps from head back to tail. New entries go to head with the
//! bit cleared, so a freshly inserted key is examined last.
//!
//! ## Example
//!
//! ```
//! use flatlru::policy::sieve::SieveCache;
//!
//! let mut cache = SieveCache::new(3).unwrap();
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3);
//! cache.get(&"a");
//! cache.set("d", 4);
//!
//! assert!(cache.has(&"a"));
//! assert!(!cache.has(&"b"));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::index::hash::HashIndex;
use crate::index::traits::KeyIndex;
use crate::policy::core::{CacheCore, Iter, Keys, Values};
use crate::policy::lru::DebugEntries;
use crate::traits::{CoreCache, MutableCache};

/// Fixed-capacity SIEVE cache over flat arrays.
#[derive(Clone)]
pub struct SieveCache<K, V, I: KeyIndex<K> = HashIndex<K>> {
    core: CacheCore<K, V, I>,
    visited: Vec<bool>,
    hand: Option<usize>,
}

impl<K: Eq + Hash + Clone, V> SieveCache<K, V> {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::indexed(capacity)
    }
}

impl<K, V, I: KeyIndex<K>> SieveCache<K, V, I> {
    pub fn indexed(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_index(capacity, I::for_capacity(capacity))
    }

    pub fn with_index(capacity: usize, index: I) -> Result<Self, ConfigError> {
        Ok(Self {
            core: CacheCore::new(capacity, index)?,
            visited: vec![false; capacity],
            hand: None,
        })
    }

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
    /// An update marks the slot visited and keeps its position. A new key
    /// runs the hand when the cache is full.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(p) = self.core.lookup(&key) {
            self.visited[p] = true;
            return self.core.replace_value(p, value);
        }

        let victim = if self.core.is_full() {
            self.select_victim()
        } else {
            None
        };
        let p = match victim {
            Some(victim) => {
                self.core.replace_victim(victim, key, value);
                victim
            },
            None => self.core.insert_vacant(key, value),
        };
        self.visited[p] = false;
        None
    }

    /// Sweeps the hand to the first unvisited slot and parks it one step
    /// toward head.
    fn select_victim(&mut self) -> Option<usize> {
        let list = self.core.list();
        let mut current = self.hand.or(list.tail());
        while let Some(p) = current {
            if !self.visited[p] {
                self.hand = list.prev(p);
                return Some(p);
            }
            self.visited[p] = false;
            current = list.prev(p).or(list.tail());
        }
        None
    }

    /// Returns the value and marks the slot visited. Order is unchanged.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let p = self.core.lookup(key)?;
        self.visited[p] = true;
        self.core.value(p)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let p = self.core.lookup(key)?;
        self.visited[p] = true;
        self.core.value_mut(p)
    }

    /// Returns the value without marking it visited.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.core.value(self.core.lookup(key)?)
    }

    pub fn has(&self, key: &K) -> bool {
        self.core.lookup(key).is_some()
    }

    /// Whether `key` has been read or rewritten since it was last passed by
    /// the hand.
    pub fn is_visited(&self, key: &K) -> Option<bool> {
        self.core.lookup(key).map(|p| self.visited[p])
    }

    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Removes `key`; a hand parked on it moves one step toward head.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let p = self.core.lookup(key)?;
        if self.hand == Some(p) {
            self.hand = self.core.list().prev(p);
        }
        self.visited[p] = false;
        self.core.remove_at(p)
    }

    pub fn remove_or(&mut self, key: &K, missing: V) -> V {
        self.remove(key).unwrap_or(missing)
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

    /// Entries from newest to oldest insertion.
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

    pub fn clear(&mut self) {
        self.core.clear();
        self.visited.fill(false);
        self.hand = None;
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.core.check_invariants()?;
        if let Some(hand) = self.hand {
            if !self.core.is_live(hand) {
                return Err(InvariantError::new(format!(
                    "hand parked on dead slot {hand}"
                )));
            }
        }
        Ok(())
    }
}

impl<K, V, I: KeyIndex<K>> Extend<(K, V)> for SieveCache<K, V, I> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a, K, V, I: KeyIndex<K>> IntoIterator for &'a SieveCache<K, V, I> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, I: KeyIndex<K>> fmt::Debug for SieveCache<K, V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("hand", &self.hand)
            .field("entries", &DebugEntries(self.iter()))
            .finish()
    }
}

impl<K, V, I: KeyIndex<K>> CoreCache<K, V> for SieveCache<K, V, I> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.set(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        SieveCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.has(key)
    }

    fn len(&self) -> usize {
        SieveCache::len(self)
    }

    fn capacity(&self) -> usize {
        SieveCache::capacity(self)
    }

    fn clear(&mut self) {
        SieveCache::clear(self);
    }
}

impl<K, V, I: KeyIndex<K>> MutableCache<K, V> for SieveCache<K, V, I> {
    fn remove(&mut self, key: &K) -> Option<V> {
        SieveCache::remove(self, key)
    }
}
