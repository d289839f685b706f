//! Compact integer pointers into the flat slot arrays.
//!
//! Every link a cache stores (recency neighbours, free slots, tree children)
//! is a [`Pointer`]: an unsigned integer indexing the parallel arrays. Using
//! the narrowest integer that can address the capacity keeps the link arrays
//! dense; a `u8` list costs two bytes per slot instead of sixteen.
//!
//! The all-ones value of each width is reserved as [`Pointer::NONE`], so a
//! `u8` pointer addresses at most 255 slots.
//!
//! ```
//! use flatlru::ds::pointer::{Pointer, PointerWidth};
//!
//! assert_eq!(PointerWidth::for_capacity(200), PointerWidth::U8);
//! assert_eq!(PointerWidth::for_capacity(255), PointerWidth::U8);
//! assert_eq!(PointerWidth::for_capacity(256), PointerWidth::U16);
//! assert!(u8::addresses(255));
//! assert!(!u8::addresses(256));
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// An unsigned integer used as a slot index ("pointer") in flat arrays.
pub trait Pointer: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Sentinel for "no slot" (the null link). Always the type's maximum.
    const NONE: Self;

    /// Width tag of this pointer type.
    const WIDTH: PointerWidth;

    /// Converts to `usize` for array indexing.
    fn as_usize(self) -> usize;

    /// Converts a slot index to this pointer type.
    ///
    /// Callers guarantee `i` fits; the conversion truncates otherwise.
    fn from_usize(i: usize) -> Self;

    /// Returns `true` if this is the [`NONE`](Self::NONE) sentinel.
    #[inline(always)]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Largest capacity addressable while keeping `NONE` free.
    #[inline(always)]
    fn max_capacity() -> usize {
        Self::NONE.as_usize()
    }

    /// Returns `true` if `capacity` slots can be addressed by this type.
    #[inline(always)]
    fn addresses(capacity: usize) -> bool {
        capacity <= Self::max_capacity()
    }

    /// Maps the sentinel to `None`.
    #[inline(always)]
    fn get(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.as_usize())
        }
    }
}

macro_rules! impl_pointer {
    ($ty:ty, $width:ident) => {
        impl Pointer for $ty {
            const NONE: Self = <$ty>::MAX;
            const WIDTH: PointerWidth = PointerWidth::$width;

            #[inline(always)]
            fn as_usize(self) -> usize {
                self as usize
            }

            #[inline(always)]
            fn from_usize(i: usize) -> Self {
                i as $ty
            }
        }
    };
}

impl_pointer!(u8, U8);
impl_pointer!(u16, U16);
impl_pointer!(u32, U32);
impl_pointer!(u64, U64);

/// The unsigned integer widths a pointer array can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PointerWidth {
    U8,
    U16,
    U32,
    U64,
}

impl PointerWidth {
    /// Narrowest width able to address `capacity` slots.
    pub fn for_capacity(capacity: usize) -> Self {
        if u8::addresses(capacity) {
            Self::U8
        } else if u16::addresses(capacity) {
            Self::U16
        } else if u32::addresses(capacity) {
            Self::U32
        } else {
            Self::U64
        }
    }

    /// Size in bytes of one pointer of this width.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Rust type name, used in error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_pointer<P: Pointer>() {
        let zero = P::from_usize(0);
        assert_eq!(zero.as_usize(), 0);
        assert_eq!(zero.get(), Some(0));
        assert!(!zero.is_none());

        let ten = P::from_usize(10);
        assert_eq!(ten.get(), Some(10));

        assert!(P::NONE.is_none());
        assert_eq!(P::NONE.get(), None);
        assert!(P::addresses(P::max_capacity()));
    }

    #[test]
    fn all_widths_round_trip_indices() {
        check_pointer::<u8>();
        check_pointer::<u16>();
        check_pointer::<u32>();
        check_pointer::<u64>();
    }

    #[test]
    fn width_selection_boundaries() {
        assert_eq!(PointerWidth::for_capacity(1), PointerWidth::U8);
        assert_eq!(PointerWidth::for_capacity(255), PointerWidth::U8);
        assert_eq!(PointerWidth::for_capacity(256), PointerWidth::U16);
        assert_eq!(PointerWidth::for_capacity(65_535), PointerWidth::U16);
        assert_eq!(PointerWidth::for_capacity(65_536), PointerWidth::U32);
        assert_eq!(
            PointerWidth::for_capacity(u32::MAX as usize + 1),
            PointerWidth::U64
        );
    }

    #[test]
    fn width_tags_match_types() {
        assert_eq!(<u8 as Pointer>::WIDTH.bytes(), 1);
        assert_eq!(<u16 as Pointer>::WIDTH.type_name(), "u16");
        assert!(PointerWidth::U8 < PointerWidth::U64);
    }
}
