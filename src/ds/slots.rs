//! Parallel key / value arrays addressed by slot pointer.
//!
//! Slots are allocated monotonically (`push`) until the cache is full and are
//! overwritten in place afterwards. A vacated slot keeps its stale key until
//! it is reused; its value is moved out so ownership returns to the caller.

/// Key and value columns of a cache's slot storage.
#[derive(Debug, Clone)]
pub struct SlotStorage<K, V> {
    keys: Vec<K>,
    values: Vec<Option<V>>,
}

impl<K, V> SlotStorage<K, V> {
    /// Creates storage with room for `capacity` slots preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots ever allocated (live or free).
    #[inline]
    pub fn allocated(&self) -> usize {
        self.keys.len()
    }

    /// Appends a new slot and returns its pointer.
    #[inline]
    pub fn push(&mut self, key: K, value: V) -> usize {
        self.keys.push(key);
        self.values.push(Some(value));
        self.keys.len() - 1
    }

    /// Overwrites both columns of an allocated slot, returning the old contents.
    #[inline]
    pub fn replace(&mut self, p: usize, key: K, value: V) -> (K, Option<V>) {
        let old_key = std::mem::replace(&mut self.keys[p], key);
        let old_value = self.values[p].replace(value);
        (old_key, old_value)
    }

    /// Overwrites the value of an allocated slot.
    #[inline]
    pub fn replace_value(&mut self, p: usize, value: V) -> Option<V> {
        self.values[p].replace(value)
    }

    /// Moves the value out of a slot that is being vacated.
    #[inline]
    pub fn take_value(&mut self, p: usize) -> Option<V> {
        self.values[p].take()
    }

    #[inline]
    pub fn key(&self, p: usize) -> &K {
        &self.keys[p]
    }

    /// Full key column, indexed by pointer.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub fn value(&self, p: usize) -> Option<&V> {
        self.values[p].as_ref()
    }

    #[inline]
    pub fn value_mut(&mut self, p: usize) -> Option<&mut V> {
        self.values[p].as_mut()
    }

    /// Drops every slot.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_replace_in_place() {
        let mut slots = SlotStorage::with_capacity(2);
        assert_eq!(slots.push("a", 1), 0);
        assert_eq!(slots.push("b", 2), 1);
        assert_eq!(slots.allocated(), 2);

        let (old_key, old_value) = slots.replace(0, "c", 3);
        assert_eq!((old_key, old_value), ("a", Some(1)));
        assert_eq!(slots.key(0), &"c");
        assert_eq!(slots.value(0), Some(&3));
        assert_eq!(slots.allocated(), 2);
    }

    #[test]
    fn take_value_leaves_stale_key() {
        let mut slots = SlotStorage::with_capacity(1);
        slots.push(7u32, "seven");
        assert_eq!(slots.take_value(0), Some("seven"));
        assert_eq!(slots.value(0), None);
        assert_eq!(slots.keys(), &[7]);
    }
}
