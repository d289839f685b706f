//! Key-to-slot indices.
//!
//! | Index          | Keys                     | Lookup    | Extra memory          |
//! |----------------|--------------------------|-----------|-----------------------|
//! | [`HashIndex`]  | any `Eq + Hash`          | O(1) avg  | one map entry per key |
//! | [`DirectIndex`]| small unsigned integers  | O(1)      | one pointer per key   |
//! | [`TreeIndex`]  | any `Ord`                | O(depth)  | three pointers/slot   |

pub mod direct;
pub mod hash;
pub mod traits;
pub mod tree;

pub use direct::{DirectIndex, DirectKey};
pub use hash::HashIndex;
pub use traits::KeyIndex;
pub use tree::TreeIndex;
