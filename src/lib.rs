//! flatlru: fixed-capacity caches laid out in flat, parallel arrays.
//!
//! Every entry lives in a slot. Recency links, free-list links and tree links
//! are small integers indexing those slots, sized to the narrowest type that
//! can address the capacity. Nothing is allocated per entry after the cache
//! reaches capacity.
//!
//! ## Variants
//!
//! - [`LruCache`]: least-recently-used eviction, no removal.
//! - [`LruCacheWithDelete`]: adds `delete`/`remove` and `setpop`, recycling
//!   freed slots through a free list.
//! - [`ExpiringLruCache`]: adds per-entry write timestamps and an `expire`
//!   sweep dropping entries older than the time-to-keep.
//! - [`SieveCache`]: SIEVE eviction over insertion order with visited bits.
//! - `monitor::MonitoredCache` (feature `monitor`): runs `expire` on a tokio
//!   interval.
//!
//! Keys are located through a pluggable [`KeyIndex`]: a hash map, a direct
//! table for small integer keys, or a binary tree embedded in pointer arrays.
//!
//! ```
//! use flatlru::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a");
//! cache.set("c", 3);
//! assert!(!cache.has(&"b"));
//! ```

pub mod builder;
pub mod clock;
pub mod ds;
pub mod error;
pub mod index;
#[cfg(feature = "monitor")]
pub mod monitor;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use error::{CacheError, ConfigError, InvariantError};
pub use index::KeyIndex;
pub use policy::{
    EvictionRecord, ExpiringLruCache, ExpiryOptions, LruCache, LruCacheWithDelete, SieveCache,
};
