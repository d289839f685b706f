//! Bounded stack of vacated slot pointers.
//!
//! Deleting an entry pushes its pointer here; the next allocation pops it
//! before the cache falls back to extending its allocated range. The stack is
//! sized to the cache capacity at construction and never grows: pushing past
//! that bound is a fatal [`CacheError::CapacityExceeded`] rather than a silent
//! truncation.

use crate::ds::pointer::Pointer;
use crate::error::CacheError;

/// Fixed-capacity LIFO of free slot pointers.
#[derive(Debug, Clone)]
pub struct FreeList<P: Pointer> {
    items: Vec<P>,
    capacity: usize,
}

impl<P: Pointer> FreeList<P> {
    /// Creates an empty free list holding at most `capacity` pointers.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a vacated pointer.
    pub fn push(&mut self, p: usize) -> Result<(), CacheError> {
        if self.items.len() >= self.capacity {
            return Err(CacheError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.items.push(P::from_usize(p));
        Ok(())
    }

    /// Pops the most recently vacated pointer.
    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.items.pop().map(Pointer::as_usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, p: usize) -> bool {
        self.items.iter().any(|item| item.as_usize() == p)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates free pointers, most recently vacated last.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().map(|p| p.as_usize())
    }
}
