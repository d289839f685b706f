//! Doubly linked recency list embedded in two pointer arrays.
//!
//! Slots are identified by their pointer; the list owns no values, only the
//! `forward` / `backward` links for every slot of a fixed capacity. Moving a
//! slot to the front ("splay to top") rewrites at most six links and touches
//! no stored key or value.
//!
//! ## Architecture
//!
//! ```text
//!   forward:  [ 2 ][ - ][ 1 ]        backward: [ - ][ 2 ][ 0 ]
//!               0    1    2                      0    1    2
//!
//!   head ─► [0] ─► [2] ─► [1] ◄── tail
//!           MRU                LRU
//! ```
//!
//! `forward` walks from head (most recently used) towards tail, `backward`
//! walks the other way. The null link is [`Pointer::NONE`].
//!
//! ## Operations
//! - `attach_front(p)`: link a detached slot as the new head
//! - `splay_to_top(p)`: move a linked slot to head
//! - `detach(p)`: unlink a slot, fixing neighbours and head/tail
//!
//! All three are O(1). `iter` is O(len).

use crate::ds::pointer::Pointer;

/// Fixed-capacity doubly linked list over slot pointers.
#[derive(Debug, Clone)]
pub struct RecencyList<P: Pointer> {
    forward: Vec<P>,
    backward: Vec<P>,
    head: P,
    tail: P,
    len: usize,
}

impl<P: Pointer> RecencyList<P> {
    /// Creates an empty list able to link `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            forward: vec![P::NONE; capacity],
            backward: vec![P::NONE; capacity],
            head: P::NONE,
            tail: P::NONE,
            len: 0,
        }
    }

    /// Number of linked slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots the link arrays cover.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.forward.len()
    }

    /// Most recently used slot.
    #[inline]
    pub fn head(&self) -> Option<usize> {
        self.head.get()
    }

    /// Least recently used slot.
    #[inline]
    pub fn tail(&self) -> Option<usize> {
        self.tail.get()
    }

    /// Slot after `p` walking towards the tail.
    #[inline]
    pub fn next(&self, p: usize) -> Option<usize> {
        self.forward[p].get()
    }

    /// Slot before `p` walking towards the head.
    #[inline]
    pub fn prev(&self, p: usize) -> Option<usize> {
        self.backward[p].get()
    }

    /// Links a currently detached slot at the head.
    pub fn attach_front(&mut self, p: usize) {
        let ptr = P::from_usize(p);
        self.backward[p] = P::NONE;
        self.forward[p] = self.head;
        match self.head.get() {
            Some(old_head) => self.backward[old_head] = ptr,
            None => self.tail = ptr,
        }
        self.head = ptr;
        self.len += 1;
    }

    /// Moves a linked slot to the head. No-op if it is already there.
    pub fn splay_to_top(&mut self, p: usize) {
        let ptr = P::from_usize(p);
        if self.head == ptr {
            return;
        }

        let previous = self.backward[p];
        let next = self.forward[p];

        // p is not head, so it has a predecessor.
        if let Some(previous) = previous.get() {
            self.forward[previous] = next;
        }
        match next.get() {
            Some(next) => self.backward[next] = previous,
            None => self.tail = previous,
        }

        if let Some(old_head) = self.head.get() {
            self.backward[old_head] = ptr;
        }
        self.backward[p] = P::NONE;
        self.forward[p] = self.head;
        self.head = ptr;
    }

    /// Unlinks a linked slot. The sole entry resets the list to empty.
    pub fn detach(&mut self, p: usize) {
        let previous = self.backward[p];
        let next = self.forward[p];

        match previous.get() {
            Some(previous) => self.forward[previous] = next,
            None => self.head = next,
        }
        match next.get() {
            Some(next) => self.backward[next] = previous,
            None => self.tail = previous,
        }

        self.forward[p] = P::NONE;
        self.backward[p] = P::NONE;
        self.len -= 1;
    }

    /// Unlinks every slot.
    pub fn clear(&mut self) {
        self.forward.fill(P::NONE);
        self.backward.fill(P::NONE);
        self.head = P::NONE;
        self.tail = P::NONE;
        self.len = 0;
    }

    /// Iterates slot pointers from head (MRU) to tail (LRU).
    pub fn iter(&self) -> RecencyIter<'_, P> {
        RecencyIter {
            list: self,
            current: self.head.get(),
            remaining: self.len,
        }
    }

    #[cfg(test)]
    fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head.get();
        let mut previous = None;
        while let Some(p) = current {
            assert!(seen.insert(p), "cycle at slot {p}");
            assert_eq!(self.prev(p), previous);
            previous = Some(p);
            current = self.next(p);
            count += 1;
            assert!(count <= self.len);
        }
        assert_eq!(previous, self.tail());
        assert_eq!(count, self.len);
    }
}

/// Iterator over linked slot pointers, head to tail.
#[derive(Debug, Clone)]
pub struct RecencyIter<'a, P: Pointer> {
    list: &'a RecencyList<P>,
    current: Option<usize>,
    remaining: usize,
}

impl<P: Pointer> Iterator for RecencyIter<'_, P> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.current?;
        self.current = self.list.next(p);
        self.remaining -= 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<P: Pointer> ExactSizeIterator for RecencyIter<'_, P> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<u8>) -> Vec<usize> {
        list.iter().collect()
    }

    #[test]
    fn attach_front_builds_mru_order() {
        let mut list = RecencyList::<u8>::new(4);
        list.attach_front(0);
        list.attach_front(1);
        list.attach_front(2);
        assert_eq!(order(&list), vec![2, 1, 0]);
        assert_eq!(list.head(), Some(2));
        assert_eq!(list.tail(), Some(0));
        list.debug_validate_invariants();
    }

    #[test]
    fn splay_middle_tail_and_head() {
        let mut list = RecencyList::<u8>::new(4);
        for p in 0..4 {
            list.attach_front(p);
        }
        // 3 2 1 0
        list.splay_to_top(1);
        assert_eq!(order(&list), vec![1, 3, 2, 0]);
        list.splay_to_top(0);
        assert_eq!(order(&list), vec![0, 1, 3, 2]);
        assert_eq!(list.tail(), Some(2));
        list.splay_to_top(0);
        assert_eq!(order(&list), vec![0, 1, 3, 2]);
        list.debug_validate_invariants();
    }

    #[test]
    fn detach_fixes_head_tail_and_neighbours() {
        let mut list = RecencyList::<u16>::new(3);
        for p in 0..3 {
            list.attach_front(p);
        }
        list.detach(1);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![2, 0]);
        list.detach(2);
        assert_eq!(list.head(), Some(0));
        list.detach(0);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn pointer_zero_is_a_real_slot() {
        let mut list = RecencyList::<u8>::new(1);
        list.attach_front(0);
        assert_eq!(list.head(), Some(0));
        assert_eq!(list.tail(), Some(0));
        list.splay_to_top(0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_resets_links() {
        let mut list = RecencyList::<u32>::new(2);
        list.attach_front(0);
        list.attach_front(1);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        list.attach_front(1);
        assert_eq!(order_u32(&list), vec![1]);
    }

    fn order_u32(list: &RecencyList<u32>) -> Vec<usize> {
        list.iter().collect()
    }

    #[test]
    fn iter_reports_exact_size() {
        let mut list = RecencyList::<u8>::new(3);
        list.attach_front(0);
        list.attach_front(1);
        assert_eq!(list.iter().len(), 2);
    }
}
