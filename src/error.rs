//! Error types for the flatlru library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (zero capacity, capacity beyond the pointer width, misspelled options).
//! - [`InvariantError`]: Returned by `check_invariants` when the pointer graph
//!   of a cache is inconsistent.
//! - [`CacheError`]: Runtime failures: a failing clock during `set` or
//!   `expire`, or an overflowing bounded auxiliary structure.
//!
//! Lookup misses are never errors; `get` returns `None`.
//!
//! ## Example Usage
//!
//! ```
//! use flatlru::error::ConfigError;
//! use flatlru::policy::lru::LruCache;
//!
//! let bad: Result<LruCache<u64, u64>, ConfigError> = LruCache::new(0);
//! assert!(bad.unwrap_err().to_string().contains("capacity"));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods on cache types. Carries a
/// human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use flatlru::policy::lru::LruCache;
///
/// let err = LruCache::<u64, u64>::new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Runtime errors raised by cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Invalid configuration detected after construction (e.g. by a builder).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configured clock could not produce a timestamp.
    #[error("clock failure: {0}")]
    Clock(String),

    /// A fixed-size auxiliary structure was asked to hold more than it can.
    #[error("capacity exceeded: structure holds at most {capacity} entries")]
    CapacityExceeded {
        /// Fixed capacity of the structure that overflowed.
        capacity: usize,
    },
}

impl CacheError {
    /// Creates a [`CacheError::Clock`] from any displayable cause.
    pub fn clock(cause: impl std::fmt::Display) -> Self {
        Self::Clock(cause.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("list length mismatch");
        assert_eq!(err.to_string(), "list length mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("bad pointer");
        assert_eq!(err.message(), "bad pointer");
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- CacheError -------------------------------------------------------

    #[test]
    fn config_error_converts_transparently() {
        let err: CacheError = ConfigError::new("use `ttk`").into();
        assert_eq!(err.to_string(), "use `ttk`");
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[test]
    fn clock_error_carries_cause() {
        let err = CacheError::clock("time went backwards");
        assert_eq!(err.to_string(), "clock failure: time went backwards");
    }

    #[test]
    fn capacity_exceeded_names_capacity() {
        let err = CacheError::CapacityExceeded { capacity: 4 };
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
        assert_error::<CacheError>();
    }
}
