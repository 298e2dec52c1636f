//! Invalidation notices and epochs.

use std::sync::atomic::{AtomicU64, Ordering};

use super::keys::QueryKey;

/// Monotonic counter ordering invalidations and fetches within this process.
pub type Epoch = u64;

/// Why an entry was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationCause {
    /// A mutation through this process succeeded.
    Mutation,
    /// The change feed reported a row change.
    ChangeFeed,
    /// An explicit refetch was requested.
    Refetch,
}

impl InvalidationCause {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidationCause::Mutation => "mutation",
            InvalidationCause::ChangeFeed => "change_feed",
            InvalidationCause::Refetch => "refetch",
        }
    }
}

/// Broadcast after an entry is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheNotice {
    pub key: QueryKey,
    pub epoch: Epoch,
    pub cause: InvalidationCause,
}

#[derive(Debug, Default)]
pub(crate) struct EpochClock {
    counter: AtomicU64,
}

impl EpochClock {
    /// Advance and return the new epoch; the first call yields 1.
    pub(crate) fn advance(&self) -> Epoch {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn current(&self) -> Epoch {
        self.counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epochs_are_monotonic() {
        let clock = EpochClock::default();
        assert_eq!(clock.current(), 0);

        let first = clock.advance();
        let second = clock.advance();
        assert!(first < second);
        assert_eq!(clock.current(), second);
    }
}
