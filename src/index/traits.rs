//! Key index abstraction for flat-array caches.
//!
//! An index maps a key to the slot pointer holding it. Policies own the slot
//! storage and recency order; indices only answer "where does this key live".
//! Keeping the two apart lets the same engine run on a hash map, a direct
//! table for small integer keys, or a tree embedded in pointer arrays.
//!
//! Every method receives the cache's key column (`keys[p]` is the key stored
//! at pointer `p`). Hash-based indices ignore it; the embedded tree compares
//! against it instead of storing keys twice.

use crate::ds::pointer::Pointer;

/// Lookup from key to slot pointer.
///
/// Callers uphold two rules:
/// - `insert` is only called for keys not currently indexed, and only after
///   `keys[p]` has been written with that key.
/// - `remove` is called while `keys[p]` still holds the key being removed.
pub trait KeyIndex<K> {
    /// Integer type used for the index's stored pointers.
    type Pointer: Pointer;

    /// Creates an empty index for a cache of `capacity` slots.
    fn for_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    /// Returns the pointer holding `key`.
    fn lookup(&self, key: &K, keys: &[K]) -> Option<usize>;

    /// Registers `key` as living at pointer `p`.
    fn insert(&mut self, key: &K, p: usize, keys: &[K]);

    /// Unregisters `key`, returning the pointer it lived at.
    fn remove(&mut self, key: &K, keys: &[K]) -> Option<usize>;

    /// Grows any per-slot storage so pointers `0..capacity` can be indexed.
    ///
    /// Caches call this on an index handed to `with_index`, which may have
    /// been built for a smaller capacity. Indices without per-slot storage
    /// keep the default no-op.
    fn reserve(&mut self, _capacity: usize) {}

    /// Number of indexed keys.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    fn clear(&mut self);
}
