//! Cache configuration.

use std::time::Duration;

const DEFAULT_NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are treated as stale even without an invalidation.
    pub max_age: Option<Duration>,
    /// Buffered notices per subscriber before slow subscribers start lagging.
    pub notice_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: None,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            max_age: settings.max_age,
            ..Self::default()
        }
    }
}
