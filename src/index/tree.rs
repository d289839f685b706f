//! Binary search tree embedded in pointer arrays.
//!
//! Each slot doubles as a tree node: `left[p]` and `right[p]` hold its
//! children, and the key it is ordered by is the cache's own `keys[p]`. No key
//! is stored twice and no node is heap allocated, which makes this the densest
//! strategy for `Ord` keys.
//!
//! ## Encoding
//!
//! Child and root links are biased by one so that `0` means "no child" (and
//! an empty root): a stored link `n` refers to slot `n - 1`. The bias is
//! removed at the [`KeyIndex`] boundary, so callers still see plain pointers.
//!
//! ```text
//!   keys:  [ "m", "c", "t", "a" ]          root = 1  (slot 0)
//!   left:  [  2,   4,   0,   0  ]
//!   right: [  3,   0,   0,   0  ]
//!
//!             "m"(0)
//!            /      \
//!        "c"(1)    "t"(2)
//!         /
//!     "a"(3)
//! ```
//!
//! ## Trade-offs
//! - No rebalancing: keys inserted in sorted order degrade the tree to a list
//!   and lookups to O(n). Nodes carry nothing beyond the two links.
//! - Removal splices the in-order successor into the removed node's place.
//!   Eviction needs it, so every cache variant can run on this index.

use crate::ds::pointer::Pointer;
use crate::index::traits::KeyIndex;

/// Unbalanced BST over slot pointers, ordered by the cache's key column.
#[derive(Debug, Clone)]
pub struct TreeIndex<P: Pointer = u32> {
    root: P,
    left: Vec<P>,
    right: Vec<P>,
    len: usize,
}

/// Where a node hangs from: the root or one side of a parent.
#[derive(Debug, Clone, Copy)]
enum Parent {
    Root,
    Left(usize),
    Right(usize),
}

#[inline(always)]
fn bias<P: Pointer>(p: usize) -> P {
    P::from_usize(p + 1)
}

#[inline(always)]
fn unbias<P: Pointer>(link: P) -> Option<usize> {
    match link.as_usize() {
        0 => None,
        n => Some(n - 1),
    }
}

impl<P: Pointer> TreeIndex<P> {
    fn empty() -> P {
        P::from_usize(0)
    }

    fn set_link(&mut self, parent: Parent, link: P) {
        match parent {
            Parent::Root => self.root = link,
            Parent::Left(n) => self.left[n] = link,
            Parent::Right(n) => self.right[n] = link,
        }
    }

    /// Height of the tree (0 when empty). O(n).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = Vec::new();
        if let Some(root) = unbias(self.root) {
            stack.push((root, 1usize));
        }
        while let Some((n, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(l) = unbias(self.left[n]) {
                stack.push((l, depth + 1));
            }
            if let Some(r) = unbias(self.right[n]) {
                stack.push((r, depth + 1));
            }
        }
        height
    }

    /// Slots in ascending key order.
    pub fn in_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = unbias(self.root);
        while current.is_some() || !stack.is_empty() {
            while let Some(n) = current {
                stack.push(n);
                current = unbias(self.left[n]);
            }
            if let Some(n) = stack.pop() {
                out.push(n);
                current = unbias(self.right[n]);
            }
        }
        out
    }
}

impl<K: Ord, P: Pointer> KeyIndex<K> for TreeIndex<P> {
    type Pointer = P;

    fn for_capacity(capacity: usize) -> Self {
        Self {
            root: Self::empty(),
            left: vec![Self::empty(); capacity],
            right: vec![Self::empty(); capacity],
            len: 0,
        }
    }

    fn lookup(&self, key: &K, keys: &[K]) -> Option<usize> {
        let mut current = unbias(self.root);
        while let Some(n) = current {
            current = match key.cmp(&keys[n]) {
                std::cmp::Ordering::Less => unbias(self.left[n]),
                std::cmp::Ordering::Greater => unbias(self.right[n]),
                std::cmp::Ordering::Equal => return Some(n),
            };
        }
        None
    }

    fn insert(&mut self, key: &K, p: usize, keys: &[K]) {
        self.left[p] = Self::empty();
        self.right[p] = Self::empty();

        let mut parent = Parent::Root;
        let mut current = unbias(self.root);
        while let Some(n) = current {
            match key.cmp(&keys[n]) {
                std::cmp::Ordering::Less => {
                    parent = Parent::Left(n);
                    current = unbias(self.left[n]);
                },
                std::cmp::Ordering::Greater => {
                    parent = Parent::Right(n);
                    current = unbias(self.right[n]);
                },
                std::cmp::Ordering::Equal => {
                    debug_assert!(false, "key already indexed at slot {n}");
                    return;
                },
            }
        }
        self.set_link(parent, bias(p));
        self.len += 1;
    }

    fn remove(&mut self, key: &K, keys: &[K]) -> Option<usize> {
        let mut parent = Parent::Root;
        let mut current = unbias(self.root);
        let target = loop {
            let n = current?;
            match key.cmp(&keys[n]) {
                std::cmp::Ordering::Less => {
                    parent = Parent::Left(n);
                    current = unbias(self.left[n]);
                },
                std::cmp::Ordering::Greater => {
                    parent = Parent::Right(n);
                    current = unbias(self.right[n]);
                },
                std::cmp::Ordering::Equal => break n,
            }
        };

        let left = self.left[target];
        let right = self.right[target];
        let replacement = match (unbias(left), unbias(right)) {
            (None, _) => right,
            (_, None) => left,
            (Some(_), Some(r)) => {
                // In-order successor: leftmost node of the right subtree.
                let mut successor_parent = target;
                let mut successor = r;
                while let Some(l) = unbias(self.left[successor]) {
                    successor_parent = successor;
                    successor = l;
                }
                if successor_parent != target {
                    self.left[successor_parent] = self.right[successor];
                    self.right[successor] = right;
                }
                self.left[successor] = left;
                bias(successor)
            },
        };
        self.set_link(parent, replacement);

        self.left[target] = Self::empty();
        self.right[target] = Self::empty();
        self.len -= 1;
        Some(target)
    }

    fn reserve(&mut self, capacity: usize) {
        if self.left.len() < capacity {
            self.left.resize(capacity, Self::empty());
            self.right.resize(capacity, Self::empty());
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.root = Self::empty();
        self.left.fill(Self::empty());
        self.right.fill(Self::empty());
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[i32]) -> TreeIndex<u8> {
        let mut tree = <TreeIndex<u8> as KeyIndex<i32>>::for_capacity(keys.len());
        for (p, key) in keys.iter().enumerate() {
            tree.insert(key, p, keys);
        }
        tree
    }

    fn sorted_keys(tree: &TreeIndex<u8>, keys: &[i32]) -> Vec<i32> {
        tree.in_order().into_iter().map(|p| keys[p]).collect()
    }

    #[test]
    fn lookup_finds_every_key_including_slot_zero() {
        let keys = [50, 20, 70, 10, 30];
        let tree = build(&keys);
        for (p, key) in keys.iter().enumerate() {
            assert_eq!(tree.lookup(key, &keys), Some(p));
        }
        assert_eq!(tree.lookup(&99, &keys), None);
        assert_eq!(KeyIndex::<i32>::len(&tree), 5);
        assert_eq!(sorted_keys(&tree, &keys), vec![10, 20, 30, 50, 70]);
    }

    #[test]
    fn remove_leaf_single_child_and_two_children() {
        let keys = [50, 20, 70, 10, 30, 60, 80, 65];
        let mut tree = build(&keys);

        // leaf
        assert_eq!(tree.remove(&10, &keys), Some(3));
        // single child (60 has right child 65)
        assert_eq!(tree.remove(&60, &keys), Some(5));
        // two children, successor is a deeper node (root 50 -> successor 65)
        assert_eq!(tree.remove(&50, &keys), Some(0));

        assert_eq!(sorted_keys(&tree, &keys), vec![20, 30, 65, 70, 80]);
        for key in [20, 30, 65, 70, 80] {
            assert!(tree.lookup(&key, &keys).is_some());
        }
        for key in [10, 50, 60] {
            assert_eq!(tree.lookup(&key, &keys), None);
        }
        assert_eq!(tree.remove(&50, &keys), None);
    }

    #[test]
    fn remove_node_whose_successor_is_its_right_child() {
        let keys = [50, 20, 70, 80];
        let mut tree = build(&keys);
        assert_eq!(tree.remove(&50, &keys), Some(0));
        assert_eq!(sorted_keys(&tree, &keys), vec![20, 70, 80]);
        assert_eq!(tree.lookup(&20, &keys), Some(1));
    }

    #[test]
    fn sorted_insertion_degrades_to_a_list() {
        let keys: Vec<i32> = (0..16).collect();
        let mut tree = <TreeIndex<u8> as KeyIndex<i32>>::for_capacity(keys.len());
        for (p, key) in keys.iter().enumerate() {
            tree.insert(key, p, &keys);
        }
        assert_eq!(tree.height(), 16);
        assert_eq!(tree.lookup(&15, &keys), Some(15));
    }

    #[test]
    fn reinsert_after_remove_reuses_slot() {
        let mut keys = vec![5, 3, 8];
        let mut tree = build(&keys);
        assert_eq!(tree.remove(&3, &keys), Some(1));
        keys[1] = 9;
        tree.insert(&9, 1, &keys);
        assert_eq!(tree.lookup(&9, &keys), Some(1));
        assert_eq!(sorted_keys(&tree, &keys), vec![5, 8, 9]);
    }

    #[test]
    fn reserve_grows_links_for_larger_capacity() {
        let keys = [4, 1, 7, 3];
        let mut tree = <TreeIndex<u8> as KeyIndex<i32>>::for_capacity(1);
        KeyIndex::<i32>::reserve(&mut tree, keys.len());
        for (p, key) in keys.iter().enumerate() {
            tree.insert(key, p, &keys);
        }
        assert_eq!(sorted_keys(&tree, &keys), vec![1, 3, 4, 7]);

        // Never shrinks.
        KeyIndex::<i32>::reserve(&mut tree, 1);
        assert_eq!(tree.lookup(&3, &keys), Some(3));
    }

    #[test]
    fn clear_empties_tree() {
        let keys = [1, 2];
        let mut tree = build(&keys);
        KeyIndex::<i32>::clear(&mut tree);
        assert_eq!(tree.lookup(&1, &keys), None);
        assert_eq!(tree.height(), 0);
    }
}
