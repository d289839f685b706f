//! Direct-addressed key index for small unsigned integer keys.
//!
//! The key itself is the table offset: `table[key]` holds the slot pointer or
//! `P::NONE`. Lookups are a single array read with no hashing. The table grows
//! to the largest key seen, so this strategy only suits dense key universes
//! (ids, enum ordinals, small counters).
//!
//! ```
//! use flatlru::index::direct::DirectIndex;
//! use flatlru::policy::lru::LruCache;
//!
//! let mut cache: LruCache<u16, &str, DirectIndex> =
//!     LruCache::with_index(2, DirectIndex::with_universe(64)).unwrap();
//! cache.set(3, "three");
//! cache.set(40, "forty");
//! assert_eq!(cache.get(&3), Some(&"three"));
//! ```

use crate::ds::pointer::Pointer;
use crate::index::traits::KeyIndex;

/// Keys usable as direct table offsets.
pub trait DirectKey: Copy {
    fn offset(self) -> usize;
}

macro_rules! impl_direct_key {
    ($($ty:ty),*) => {
        $(
            impl DirectKey for $ty {
                #[inline(always)]
                fn offset(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_direct_key!(u8, u16, u32, u64, usize);

/// Direct-addressed table from integer key to slot pointer.
#[derive(Debug, Clone, Default)]
pub struct DirectIndex<P: Pointer = u32> {
    table: Vec<P>,
    len: usize,
}

impl<P: Pointer> DirectIndex<P> {
    /// Creates an index with the table presized for keys `0..universe`.
    pub fn with_universe(universe: usize) -> Self {
        Self {
            table: vec![P::NONE; universe],
            len: 0,
        }
    }

    /// Current table length (one past the largest addressable key).
    pub fn universe(&self) -> usize {
        self.table.len()
    }
}

impl<K: DirectKey, P: Pointer> KeyIndex<K> for DirectIndex<P> {
    type Pointer = P;

    fn for_capacity(_capacity: usize) -> Self {
        Self {
            table: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    fn lookup(&self, key: &K, _keys: &[K]) -> Option<usize> {
        self.table.get(key.offset()).and_then(|p| p.get())
    }

    fn insert(&mut self, key: &K, p: usize, _keys: &[K]) {
        let offset = key.offset();
        if offset >= self.table.len() {
            self.table.resize(offset + 1, P::NONE);
        }
        if self.table[offset].is_none() {
            self.len += 1;
        }
        self.table[offset] = P::from_usize(p);
    }

    fn remove(&mut self, key: &K, _keys: &[K]) -> Option<usize> {
        let entry = self.table.get_mut(key.offset())?;
        let p = entry.get()?;
        *entry = P::NONE;
        self.len -= 1;
        Some(p)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.table.fill(P::NONE);
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_grows_to_largest_key() {
        let keys: [u32; 2] = [5, 1];
        let mut index = <DirectIndex<u8> as KeyIndex<u32>>::for_capacity(2);
        index.insert(&5u32, 0, &keys);
        assert_eq!(index.universe(), 6);
        index.insert(&1u32, 1, &keys);
        assert_eq!(KeyIndex::<u32>::len(&index), 2);
        assert_eq!(index.lookup(&5u32, &keys), Some(0));
        assert_eq!(index.lookup(&1u32, &keys), Some(1));
        assert_eq!(index.lookup(&99u32, &keys), None);
    }

    #[test]
    fn remove_clears_entry() {
        let keys: [u8; 1] = [3];
        let mut index: DirectIndex<u16> = DirectIndex::with_universe(8);
        index.insert(&3u8, 0, &keys);
        assert_eq!(index.remove(&3u8, &keys), Some(0));
        assert_eq!(index.remove(&3u8, &keys), None);
        assert_eq!(index.remove(&200u8, &keys), None);
        assert!(KeyIndex::<u8>::is_empty(&index));
    }
}
