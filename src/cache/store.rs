//! Typed cache slots keyed by [`QueryKey`].

use std::sync::{Arc, RwLock};
use std::time::Instant;

use metrics::counter;
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tracing::debug;

use crate::application::repos::RepoError;
use crate::domain::entities::{BlogPost, ContactMessage};

use super::config::CacheConfig;
use super::events::{CacheNotice, Epoch, EpochClock, InvalidationCause};
use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A collection type with its own cache slot.
pub trait Cached: Clone + Send + Sync + 'static {
    const KEY: QueryKey;

    fn slot(cache: &QueryCache) -> &Slot<Self>;
}

impl Cached for BlogPost {
    const KEY: QueryKey = QueryKey::Blogs;

    fn slot(cache: &QueryCache) -> &Slot<Self> {
        &cache.blogs
    }
}

impl Cached for ContactMessage {
    const KEY: QueryKey = QueryKey::ContactMessages;

    fn slot(cache: &QueryCache) -> &Slot<Self> {
        &cache.contact_messages
    }
}

/// Snapshot of a populated slot.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: Arc<Vec<T>>,
    pub stale: bool,
    /// Epoch at which the data was stored.
    pub epoch: Epoch,
}

struct SlotState<T> {
    data: Option<Arc<Vec<T>>>,
    stored_epoch: Epoch,
    stored_at: Option<Instant>,
    invalidated_epoch: Epoch,
    stale: bool,
    fetching: bool,
    error: Option<Arc<RepoError>>,
}

impl<T> Default for SlotState<T> {
    fn default() -> Self {
        Self {
            data: None,
            stored_epoch: 0,
            stored_at: None,
            invalidated_epoch: 0,
            stale: false,
            fetching: false,
            error: None,
        }
    }
}

pub struct Slot<T> {
    state: RwLock<SlotState<T>>,
    fetch_gate: AsyncMutex<()>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(SlotState::default()),
            fetch_gate: AsyncMutex::new(()),
        }
    }
}

impl<T> Slot<T> {
    fn mark_invalidated(&self, epoch: Epoch) {
        let mut state = rw_write(&self.state, SOURCE, "invalidate");
        state.invalidated_epoch = epoch;
        state.stale = true;
    }
}

/// Marks a slot as fetching until dropped, so an abandoned fetch never
/// leaves the slot reporting a load in progress.
pub struct FetchGuard<'a, T> {
    slot: &'a Slot<T>,
    started: Epoch,
}

impl<T> FetchGuard<'_, T> {
    pub fn started(&self) -> Epoch {
        self.started
    }
}

impl<T> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        rw_write(&self.slot.state, SOURCE, "fetch_guard.drop").fetching = false;
    }
}

/// Process-wide cache of collection reads.
pub struct QueryCache {
    config: CacheConfig,
    clock: EpochClock,
    notices: broadcast::Sender<CacheNotice>,
    blogs: Slot<BlogPost>,
    contact_messages: Slot<ContactMessage>,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        Self {
            config,
            clock: EpochClock::default(),
            notices,
            blogs: Slot::default(),
            contact_messages: Slot::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current entry for `T`, or `None` when nothing has been stored yet.
    pub fn get<T: Cached>(&self) -> Option<CacheEntry<T>> {
        let entry = self.peek::<T>();
        let outcome = match &entry {
            Some(entry) if !entry.stale => "akasite_query_cache_hit_total",
            _ => "akasite_query_cache_miss_total",
        };
        counter!(outcome, "key" => T::KEY.as_str()).increment(1);
        entry
    }

    /// Same as [`QueryCache::get`] without recording a hit or miss.
    pub fn peek<T: Cached>(&self) -> Option<CacheEntry<T>> {
        let state = rw_read(&T::slot(self).state, SOURCE, "peek");
        state.data.as_ref().map(|data| CacheEntry {
            data: Arc::clone(data),
            stale: state.stale || self.expired(state.stored_at),
            epoch: state.stored_epoch,
        })
    }

    /// Replace the data for `T` with a fresh value.
    pub fn set<T: Cached>(&self, data: Vec<T>) -> Arc<Vec<T>> {
        let epoch = self.clock.advance();
        let data = Arc::new(data);
        let mut state = rw_write(&T::slot(self).state, SOURCE, "set");
        state.data = Some(Arc::clone(&data));
        state.stored_epoch = epoch;
        state.stored_at = Some(Instant::now());
        state.stale = false;
        state.error = None;
        data
    }

    /// Store the result of a fetch that started at `guard.started()`.
    ///
    /// The entry stays stale when an invalidation arrived while the fetch ran.
    pub fn store_fetched<T: Cached>(&self, data: Vec<T>, guard: &FetchGuard<'_, T>) -> Arc<Vec<T>> {
        let epoch = self.clock.advance();
        let data = Arc::new(data);
        let mut state = rw_write(&T::slot(self).state, SOURCE, "store_fetched");
        let overtaken = state.invalidated_epoch > guard.started;
        state.data = Some(Arc::clone(&data));
        state.stored_epoch = epoch;
        state.stored_at = Some(Instant::now());
        state.stale = overtaken;
        state.error = None;
        drop(state);

        if overtaken {
            debug!(
                key = T::KEY.as_str(),
                started = guard.started,
                "fetch overtaken by invalidation; entry left stale"
            );
        }
        data
    }

    /// Record a failed fetch; existing data is kept.
    pub fn record_error<T: Cached>(&self, error: Arc<RepoError>) {
        rw_write(&T::slot(self).state, SOURCE, "record_error").error = Some(error);
    }

    pub fn last_error<T: Cached>(&self) -> Option<Arc<RepoError>> {
        rw_read(&T::slot(self).state, SOURCE, "last_error").error.clone()
    }

    pub fn is_fetching<T: Cached>(&self) -> bool {
        rw_read(&T::slot(self).state, SOURCE, "is_fetching").fetching
    }

    pub fn begin_fetch<T: Cached>(&self) -> FetchGuard<'_, T> {
        let slot = T::slot(self);
        rw_write(&slot.state, SOURCE, "begin_fetch").fetching = true;
        FetchGuard {
            slot,
            started: self.clock.current(),
        }
    }

    /// Serializes fetches of `T` so concurrent readers share one store round trip.
    pub fn fetch_gate<T: Cached>(&self) -> &AsyncMutex<()> {
        &T::slot(self).fetch_gate
    }

    /// Mark `key` stale and notify subscribers; data is kept until replaced.
    pub fn invalidate(&self, key: QueryKey, cause: InvalidationCause) -> Epoch {
        let epoch = self.clock.advance();
        match key {
            QueryKey::Blogs => self.blogs.mark_invalidated(epoch),
            QueryKey::ContactMessages => self.contact_messages.mark_invalidated(epoch),
        }

        counter!(
            "akasite_query_cache_invalidation_total",
            "key" => key.as_str(),
            "cause" => cause.as_str()
        )
        .increment(1);

        let notice = CacheNotice { key, epoch, cause };
        // No subscribers is not an error.
        let _ = self.notices.send(notice);
        epoch
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheNotice> {
        self.notices.subscribe()
    }

    fn expired(&self, stored_at: Option<Instant>) -> bool {
        match (self.config.max_age, stored_at) {
            (Some(max_age), Some(stored_at)) => stored_at.elapsed() >= max_age,
            _ => false,
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("max_age", &self.config.max_age)
            .field("epoch", &self.clock.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::domain::types::MessageStatus;

    fn message(subject: &str) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            subject: subject.to_string(),
            message: "Hello".to_string(),
            status: MessageStatus::Unread,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_slot_reports_absent() {
        let cache = QueryCache::default();
        assert!(cache.get::<ContactMessage>().is_none());
        assert!(!cache.is_fetching::<ContactMessage>());
    }

    #[test]
    fn set_then_get_is_fresh() {
        let cache = QueryCache::default();
        cache.set(vec![message("one")]);

        let entry = cache.get::<ContactMessage>().expect("entry");
        assert!(!entry.stale);
        assert_eq!(entry.data.len(), 1);
    }

    #[test]
    fn invalidate_keeps_data_but_marks_stale_and_notifies() {
        let cache = QueryCache::default();
        let mut notices = cache.subscribe();
        cache.set(vec![message("one")]);

        let epoch = cache.invalidate(QueryKey::ContactMessages, InvalidationCause::Mutation);

        let entry = cache.get::<ContactMessage>().expect("entry");
        assert!(entry.stale);
        assert_eq!(entry.data.len(), 1);

        let notice = notices.try_recv().expect("notice");
        assert_eq!(notice.key, QueryKey::ContactMessages);
        assert_eq!(notice.epoch, epoch);
        assert_eq!(notice.cause, InvalidationCause::Mutation);
    }

    #[test]
    fn invalidating_one_key_leaves_the_other_fresh() {
        let cache = QueryCache::default();
        cache.set(vec![message("one")]);
        cache.set::<BlogPost>(Vec::new());

        cache.invalidate(QueryKey::Blogs, InvalidationCause::ChangeFeed);

        assert!(!cache.get::<ContactMessage>().expect("messages").stale);
        assert!(cache.get::<BlogPost>().expect("blogs").stale);
    }

    #[test]
    fn fetch_overtaken_by_invalidation_stays_stale() {
        let cache = QueryCache::default();
        {
            let guard = cache.begin_fetch::<ContactMessage>();
            assert!(cache.is_fetching::<ContactMessage>());
            cache.invalidate(QueryKey::ContactMessages, InvalidationCause::ChangeFeed);
            cache.store_fetched(vec![message("old")], &guard);
        }

        assert!(!cache.is_fetching::<ContactMessage>());
        assert!(cache.get::<ContactMessage>().expect("entry").stale);
    }

    #[test]
    fn fetch_without_concurrent_invalidation_is_fresh() {
        let cache = QueryCache::default();
        cache.invalidate(QueryKey::ContactMessages, InvalidationCause::Refetch);
        {
            let guard = cache.begin_fetch::<ContactMessage>();
            cache.store_fetched(vec![message("new")], &guard);
        }

        assert!(!cache.get::<ContactMessage>().expect("entry").stale);
    }

    #[test]
    fn entries_expire_after_max_age() {
        let cache = QueryCache::new(CacheConfig {
            max_age: Some(Duration::ZERO),
            ..CacheConfig::default()
        });
        cache.set(vec![message("one")]);

        assert!(cache.get::<ContactMessage>().expect("entry").stale);
    }

    #[test]
    fn errors_are_cleared_by_the_next_store() {
        let cache = QueryCache::default();
        cache.record_error::<ContactMessage>(Arc::new(RepoError::Timeout));
        assert!(cache.last_error::<ContactMessage>().is_some());

        cache.set(vec![message("one")]);
        assert!(cache.last_error::<ContactMessage>().is_none());
    }
}
