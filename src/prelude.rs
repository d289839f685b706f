pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{CacheError, ConfigError, InvariantError};
pub use crate::index::{DirectIndex, HashIndex, KeyIndex, TreeIndex};
#[cfg(feature = "monitor")]
pub use crate::monitor::{MonitorHandle, MonitorOptions, MonitoredCache};
pub use crate::policy::{
    EvictionRecord, ExpiringLruCache, ExpiryOptions, LruCache, LruCacheWithDelete, SieveCache,
};
pub use crate::traits::{CoreCache, ExpiringCache, LruCacheTrait, MutableCache};
