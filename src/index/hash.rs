//! Hash-map key index.
//!
//! ## Architecture
//! - Keys are cloned into an `FxHashMap<K, P>` for O(1) average lookup.
//! - Any `Eq + Hash + Clone` key works; this is the default strategy.
//! - Pointer `0` is an ordinary occupied slot.
//!
//! ## Example Usage
//! ```rust
//! use flatlru::index::hash::HashIndex;
//! use flatlru::index::traits::KeyIndex;
//!
//! let keys = ["a", "b"];
//! let mut index: HashIndex<&str> = HashIndex::for_capacity(2);
//! index.insert(&"a", 0, &keys);
//! index.insert(&"b", 1, &keys);
//! assert_eq!(index.lookup(&"b", &keys), Some(1));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::pointer::Pointer;
use crate::index::traits::KeyIndex;

/// Key index backed by an `FxHashMap`.
#[derive(Debug, Clone)]
pub struct HashIndex<K, P: Pointer = u32> {
    map: FxHashMap<K, P>,
}

impl<K, P> KeyIndex<K> for HashIndex<K, P>
where
    K: Eq + Hash + Clone,
    P: Pointer,
{
    type Pointer = P;

    fn for_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    fn lookup(&self, key: &K, _keys: &[K]) -> Option<usize> {
        self.map.get(key).map(|p| p.as_usize())
    }

    #[inline]
    fn insert(&mut self, key: &K, p: usize, _keys: &[K]) {
        self.map.insert(key.clone(), P::from_usize(p));
    }

    #[inline]
    fn remove(&mut self, key: &K, _keys: &[K]) -> Option<usize> {
        self.map.remove(key).map(|p| p.as_usize())
    }

    fn reserve(&mut self, capacity: usize) {
        self.map.reserve(capacity.saturating_sub(self.map.len()));
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_remove() {
        let keys = ["x".to_string(), "y".to_string()];
        let mut index: HashIndex<String, u8> = HashIndex::for_capacity(2);
        index.insert(&keys[0], 0, &keys);
        index.insert(&keys[1], 1, &keys);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&"x".to_string(), &keys), Some(0));
        assert_eq!(index.remove(&"x".to_string(), &keys), Some(0));
        assert_eq!(index.lookup(&"x".to_string(), &keys), None);
        assert_eq!(index.remove(&"x".to_string(), &keys), None);
        index.clear();
        assert!(index.is_empty());
    }
}
