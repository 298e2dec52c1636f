//! Process-wide query cache.
//!
//! - **[`QueryCache`]**: one typed slot per [`QueryKey`] holding the last fetched
//!   collection, its freshness, and the last fetch error.
//! - **[`CacheTrigger`]**: turns "table changed" signals (mutations, change feed)
//!   into invalidations via the static table registry.
//! - **[`CacheNotice`]**: broadcast to subscribers whenever an entry is invalidated,
//!   so live views know to re-read.

mod config;
mod events;
mod keys;
mod lock;
mod registry;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use events::{CacheNotice, Epoch, InvalidationCause};
pub use keys::QueryKey;
pub use registry::{TABLE_KEYS, keys_for};
pub use store::{CacheEntry, Cached, FetchGuard, QueryCache, Slot};
pub use trigger::CacheTrigger;

pub(crate) use lock::mutex_lock as lock_mutex;
