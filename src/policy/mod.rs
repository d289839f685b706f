pub(crate) mod core;
pub mod expiring;
pub mod lru;
pub mod lru_delete;
pub mod sieve;

pub use self::core::{EvictionRecord, Iter, Keys, Values};
pub use expiring::{DEFAULT_TTK, ExpiringLruCache, ExpiryOptions};
pub use lru::LruCache;
pub use lru_delete::LruCacheWithDelete;
pub use sieve::SieveCache;
