//! Shared engine behind every flat-array cache variant.
//!
//! `CacheCore` owns the slot columns, the key index, the recency list and the
//! free list, and exposes the primitives variants compose: lookup, splay,
//! allocate into a vacant slot, overwrite an eviction victim, unlink.
//! Policies decide *which* slot to evict and *when* to splay; the core keeps
//! the pointer graph consistent.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                       CacheCore<K, V, I> Layout                          │
//! │                                                                          │
//! │   index: I (KeyIndex<K>)            slots: SlotStorage<K, V>             │
//! │   ┌──────────┬─────────┐            ┌─────┬─────────┬──────────┐         │
//! │   │   key    │ pointer │            │  p  │   key   │  value   │         │
//! │   ├──────────┼─────────┤            ├─────┼─────────┼──────────┤         │
//! │   │   "a"    │    0    │───────────►│  0  │   "a"   │    1     │         │
//! │   │   "b"    │    1    │───────────►│  1  │   "b"   │    2     │         │
//! │   └──────────┴─────────┘            │  2  │  stale  │   None   │ free    │
//! │                                     └─────┴─────────┴──────────┘         │
//! │                                                                          │
//! │   list: RecencyList<P>     head ─► [1] ◄──► [0] ◄── tail                 │
//! │   free: FreeList<P>        [2]                                           │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Allocation
//!
//! A new key takes, in order: a pointer from the free list, the next never
//! used pointer (`allocated`), or (when full) the victim chosen by the policy.
//! A victim's pointer is overwritten in place and never visits the free list.
//!
//! Invariant: `allocated == len + free.len()` and `len <= capacity`.

use crate::ds::free_list::FreeList;
use crate::ds::pointer::{Pointer, PointerWidth};
use crate::ds::recency_list::{RecencyIter, RecencyList};
use crate::ds::slots::SlotStorage;
use crate::error::{ConfigError, InvariantError};
use crate::index::traits::KeyIndex;

/// What `set`/`setpop` displaced, if anything.
///
/// `evicted` is `true` when a capacity eviction dropped another entry and
/// `false` when an existing key's value was overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionRecord<K, V> {
    pub evicted: bool,
    pub key: K,
    pub value: V,
}

/// Outcome of an upsert at the core level.
#[derive(Debug)]
pub(crate) enum Placement<K, V> {
    /// Key existed; its value was replaced.
    Updated { slot: usize, old: V },
    /// Key was new and took a vacant slot.
    Inserted { slot: usize },
    /// Key was new and overwrote an evicted entry.
    Evicted { slot: usize, key: K, value: V },
}

impl<K, V> Placement<K, V> {
    pub(crate) fn slot(&self) -> usize {
        match self {
            Self::Updated { slot, .. } | Self::Inserted { slot } | Self::Evicted { slot, .. } => {
                *slot
            },
        }
    }

    /// Previous value of the same key, if it was an update.
    pub(crate) fn into_previous(self) -> Option<V> {
        match self {
            Self::Updated { old, .. } => Some(old),
            _ => None,
        }
    }
}

/// Validates a capacity against the pointer width of an index.
pub(crate) fn check_capacity<P: Pointer>(capacity: usize) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::new("capacity must be a positive integer"));
    }
    if !P::addresses(capacity) {
        return Err(ConfigError::new(format!(
            "capacity {capacity} exceeds what {} pointers can address (max {}); \
             a key index with {} pointers is required",
            P::WIDTH.type_name(),
            P::max_capacity(),
            PointerWidth::for_capacity(capacity).type_name(),
        )));
    }
    Ok(())
}

/// Slot storage, key index, recency list and free list of one cache.
#[derive(Debug, Clone)]
pub(crate) struct CacheCore<K, V, I: KeyIndex<K>> {
    capacity: usize,
    slots: SlotStorage<K, V>,
    index: I,
    list: RecencyList<I::Pointer>,
    free: FreeList<I::Pointer>,
}

impl<K, V, I: KeyIndex<K>> CacheCore<K, V, I> {
    /// Creates an empty core around `index`, sized up to `capacity`.
    ///
    /// Fails on zero capacity, a too-narrow pointer, or an index that already
    /// holds keys (they would point at slots this core never filled).
    pub fn new(capacity: usize, mut index: I) -> Result<Self, ConfigError> {
        check_capacity::<I::Pointer>(capacity)?;
        if !index.is_empty() {
            return Err(ConfigError::new(format!(
                "key index must be empty, found {} entries",
                index.len()
            )));
        }
        index.reserve(capacity);
        Ok(Self {
            capacity,
            slots: SlotStorage::with_capacity(capacity),
            index,
            list: RecencyList::new(capacity),
            free: FreeList::new(capacity),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.list.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever allocated; never exceeds `capacity`.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.slots.allocated()
    }

    /// Pointers currently waiting on the free list.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn lookup(&self, key: &K) -> Option<usize> {
        self.index.lookup(key, self.slots.keys())
    }

    /// Returns `true` if slot `p` is allocated and the index still maps its
    /// stored key back to `p`.
    pub fn is_live(&self, p: usize) -> bool {
        p < self.slots.allocated() && self.lookup(self.slots.key(p)) == Some(p)
    }

    #[inline]
    pub fn value(&self, p: usize) -> Option<&V> {
        self.slots.value(p)
    }

    #[inline]
    pub fn value_mut(&mut self, p: usize) -> Option<&mut V> {
        self.slots.value_mut(p)
    }

    #[inline]
    pub fn list(&self) -> &RecencyList<I::Pointer> {
        &self.list
    }

    /// Moves slot `p` to the head of the recency list.
    #[inline]
    pub fn splay(&mut self, p: usize) {
        self.list.splay_to_top(p);
    }

    #[inline]
    pub fn replace_value(&mut self, p: usize, value: V) -> Option<V> {
        self.slots.replace_value(p, value)
    }

    /// Places a new key in a free or never-used slot and links it at head.
    ///
    /// Callers ensure the key is absent and the cache is not full.
    pub fn insert_vacant(&mut self, key: K, value: V) -> usize {
        debug_assert!(!self.is_full());
        let p = match self.free.pop() {
            Some(p) => {
                self.slots.replace(p, key, value);
                p
            },
            None => self.slots.push(key, value),
        };
        self.index.insert(self.slots.key(p), p, self.slots.keys());
        self.list.attach_front(p);
        p
    }

    /// Overwrites the live slot `victim` with a new key, links it at head and
    /// returns the evicted entry.
    pub fn replace_victim(&mut self, victim: usize, key: K, value: V) -> (K, Option<V>) {
        self.index.remove(self.slots.key(victim), self.slots.keys());
        let (old_key, old_value) = self.slots.replace(victim, key, value);
        self.index
            .insert(self.slots.key(victim), victim, self.slots.keys());
        self.list.splay_to_top(victim);
        tracing::trace!(slot = victim, "evicted entry to make room");
        (old_key, old_value)
    }

    /// LRU upsert: splay on update, evict the tail when full.
    pub(crate) fn upsert_lru(&mut self, key: K, value: V) -> Placement<K, V> {
        if let Some(p) = self.lookup(&key) {
            self.splay(p);
            return match self.replace_value(p, value) {
                Some(old) => Placement::Updated { slot: p, old },
                None => Placement::Inserted { slot: p },
            };
        }

        if let (true, Some(tail)) = (self.is_full(), self.list.tail()) {
            let (old_key, old_value) = self.replace_victim(tail, key, value);
            return match old_value {
                Some(old_value) => Placement::Evicted {
                    slot: tail,
                    key: old_key,
                    value: old_value,
                },
                None => Placement::Inserted { slot: tail },
            };
        }

        Placement::Inserted {
            slot: self.insert_vacant(key, value),
        }
    }

    /// Unlinks live slot `p`, recycles its pointer and returns its value.
    pub fn remove_at(&mut self, p: usize) -> Option<V> {
        self.list.detach(p);
        self.index.remove(self.slots.key(p), self.slots.keys());
        if let Err(err) = self.free.push(p) {
            // allocated == len + free.len() keeps the free list within capacity.
            panic!("free list overflow while removing slot {p}: {err}");
        }
        self.slots.take_value(p)
    }

    /// Removes `key` if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let p = self.lookup(key)?;
        self.remove_at(p)
    }

    /// Drops every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.list.clear();
        self.free.clear();
    }

    /// Entries from head (MRU) to tail (LRU).
    pub fn iter(&self) -> Iter<'_, K, V, I> {
        Iter {
            core: self,
            pointers: self.list.iter(),
        }
    }

    /// Entry at the head of the list.
    pub fn head_entry(&self) -> Option<(&K, &V)> {
        let p = self.list.head()?;
        Some((self.slots.key(p), self.slots.value(p)?))
    }

    /// Entry at the tail of the list.
    pub fn tail_entry(&self) -> Option<(&K, &V)> {
        let p = self.list.tail()?;
        Some((self.slots.key(p), self.slots.value(p)?))
    }

    /// Verifies the pointer graph: list shape, index agreement, free list
    /// disjointness and the allocation count.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.list.len();
        if len > self.capacity {
            return Err(InvariantError::new(format!(
                "size {len} exceeds capacity {}",
                self.capacity
            )));
        }
        if self.index.len() != len {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list links {len} slots",
                self.index.len()
            )));
        }

        let allocated = self.slots.allocated();
        let mut live = vec![false; allocated];
        let mut count = 0usize;
        let mut previous = None;
        let mut current = self.list.head();
        while let Some(p) = current {
            if p >= allocated {
                return Err(InvariantError::new(format!(
                    "list links unallocated slot {p}"
                )));
            }
            if live[p] {
                return Err(InvariantError::new(format!("slot {p} linked twice")));
            }
            live[p] = true;
            if self.list.prev(p) != previous {
                return Err(InvariantError::new(format!(
                    "slot {p} backward link disagrees with its predecessor"
                )));
            }
            if self.lookup(self.slots.key(p)) != Some(p) {
                return Err(InvariantError::new(format!(
                    "key stored at slot {p} does not index back to it"
                )));
            }
            if self.slots.value(p).is_none() {
                return Err(InvariantError::new(format!("live slot {p} has no value")));
            }
            count += 1;
            previous = Some(p);
            current = self.list.next(p);
        }
        if count != len {
            return Err(InvariantError::new(format!(
                "walked {count} slots but size is {len}"
            )));
        }
        if previous != self.list.tail() {
            return Err(InvariantError::new("walk did not end at tail"));
        }

        for p in self.free.iter() {
            if p >= allocated || live[p] {
                return Err(InvariantError::new(format!(
                    "free list holds live or unallocated slot {p}"
                )));
            }
        }
        if allocated != len + self.free.len() {
            return Err(InvariantError::new(format!(
                "allocated {allocated} != size {len} + free {}",
                self.free.len()
            )));
        }
        Ok(())
    }
}

impl<K: Clone, V, I: KeyIndex<K>> CacheCore<K, V, I> {
    /// LRU upsert that reports the written slot and what was displaced.
    pub(crate) fn upsert_lru_reporting(
        &mut self,
        key: K,
        value: V,
    ) -> (usize, Option<EvictionRecord<K, V>>) {
        let placement = self.upsert_lru(key, value);
        let slot = placement.slot();
        let record = match placement {
            Placement::Updated { old, .. } => Some(EvictionRecord {
                evicted: false,
                key: self.slots.key(slot).clone(),
                value: old,
            }),
            Placement::Evicted { key, value, .. } => Some(EvictionRecord {
                evicted: true,
                key,
                value,
            }),
            Placement::Inserted { .. } => None,
        };
        (slot, record)
    }
}

/// Iterator over `(&K, &V)` from most to least recently used.
#[derive(Debug)]
pub struct Iter<'a, K, V, I: KeyIndex<K>> {
    core: &'a CacheCore<K, V, I>,
    pointers: RecencyIter<'a, I::Pointer>,
}

impl<'a, K, V, I: KeyIndex<K>> Iterator for Iter<'a, K, V, I> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.pointers.next()?;
        Some((self.core.slots.key(p), self.core.slots.value(p)?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pointers.size_hint()
    }
}

impl<K, V, I: KeyIndex<K>> ExactSizeIterator for Iter<'_, K, V, I> {}

impl<K, V, I: KeyIndex<K>> Clone for Iter<'_, K, V, I> {
    fn clone(&self) -> Self {
        Self {
            core: self.core,
            pointers: self.pointers.clone(),
        }
    }
}

/// Iterator over keys from most to least recently used.
#[derive(Debug)]
pub struct Keys<'a, K, V, I: KeyIndex<K>> {
    pub(crate) inner: Iter<'a, K, V, I>,
}

impl<'a, K, V, I: KeyIndex<K>> Iterator for Keys<'a, K, V, I> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over values from most to least recently used.
#[derive(Debug)]
pub struct Values<'a, K, V, I: KeyIndex<K>> {
    pub(crate) inner: Iter<'a, K, V, I>,
}

impl<'a, K, V, I: KeyIndex<K>> Iterator for Values<'a, K, V, I> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::hash::HashIndex;
    use crate::index::traits::KeyIndex;

    fn core(capacity: usize) -> CacheCore<&'static str, i32, HashIndex<&'static str, u8>> {
        CacheCore::new(capacity, HashIndex::for_capacity(capacity)).unwrap()
    }

    fn keys(core: &CacheCore<&'static str, i32, HashIndex<&'static str, u8>>) -> Vec<&'static str> {
        core.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn rejects_zero_and_oversized_capacity() {
        let err = CacheCore::<u32, u32, HashIndex<u32, u8>>::new(0, HashIndex::for_capacity(0))
            .unwrap_err();
        assert!(err.message().contains("positive"));

        let err =
            CacheCore::<u32, u32, HashIndex<u32, u8>>::new(300, HashIndex::for_capacity(300))
                .unwrap_err();
        assert!(err.message().contains("u8"));
        assert!(err.message().contains("u16"));

        assert!(
            CacheCore::<u32, u32, HashIndex<u32, u8>>::new(255, HashIndex::for_capacity(255))
                .is_ok()
        );
    }

    #[test]
    fn undersized_tree_index_is_grown_to_capacity() {
        use crate::index::tree::TreeIndex;

        let index = <TreeIndex<u8> as KeyIndex<u32>>::for_capacity(2);
        let mut core: CacheCore<u32, u32, TreeIndex<u8>> = CacheCore::new(4, index).unwrap();
        for k in [2, 0, 3, 1] {
            core.upsert_lru(k, k * 10);
        }
        assert_eq!(core.len(), 4);
        assert_eq!(core.lookup(&1), Some(3));
        core.upsert_lru(9, 90);
        assert_eq!(core.lookup(&2), None);
        core.check_invariants().unwrap();
    }

    #[test]
    fn rejects_index_that_already_holds_keys() {
        let mut index = HashIndex::<&'static str, u8>::for_capacity(2);
        index.insert(&"stray", 0, &["stray"]);
        let err = CacheCore::<&'static str, i32, _>::new(2, index).unwrap_err();
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn upsert_reports_placement() {
        let mut core = core(2);
        assert!(matches!(core.upsert_lru("a", 1), Placement::Inserted { slot: 0 }));
        assert!(matches!(core.upsert_lru("b", 2), Placement::Inserted { slot: 1 }));
        assert!(matches!(
            core.upsert_lru("a", 10),
            Placement::Updated { slot: 0, old: 1 }
        ));
        // b is now tail
        match core.upsert_lru("c", 3) {
            Placement::Evicted { slot, key, value } => {
                assert_eq!((slot, key, value), (1, "b", 2));
            },
            other => panic!("expected eviction, got {other:?}"),
        }
        assert_eq!(keys(&core), vec!["c", "a"]);
        core.check_invariants().unwrap();
    }

    #[test]
    fn removed_pointer_is_reused_before_appending() {
        let mut core = core(3);
        core.upsert_lru("a", 1);
        core.upsert_lru("b", 2);
        assert_eq!(core.remove(&"a"), Some(1));
        assert_eq!(core.free_slots(), 1);
        assert!(!core.is_live(0));

        let placement = core.upsert_lru("c", 3);
        assert_eq!(placement.slot(), 0);
        assert_eq!(core.free_slots(), 0);
        assert_eq!(core.allocated(), 2);
        core.check_invariants().unwrap();
    }

    #[test]
    fn eviction_never_touches_free_list() {
        let mut core = core(2);
        core.upsert_lru("a", 1);
        core.upsert_lru("b", 2);
        core.upsert_lru("c", 3);
        assert_eq!(core.free_slots(), 0);
        assert_eq!(core.allocated(), 2);
    }

    #[test]
    fn head_and_tail_entries() {
        let mut core = core(3);
        assert_eq!(core.head_entry(), None);
        core.upsert_lru("a", 1);
        core.upsert_lru("b", 2);
        assert_eq!(core.head_entry(), Some((&"b", &2)));
        assert_eq!(core.tail_entry(), Some((&"a", &1)));
    }

    #[test]
    fn clear_resets_allocation() {
        let mut core = core(2);
        core.upsert_lru("a", 1);
        core.remove(&"a");
        core.clear();
        assert!(core.is_empty());
        assert_eq!(core.allocated(), 0);
        assert_eq!(core.free_slots(), 0);
        core.upsert_lru("z", 26);
        assert_eq!(core.lookup(&"z"), Some(0));
        core.check_invariants().unwrap();
    }
}
