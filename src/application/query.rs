//! Cached collection reads.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{debug, warn};

use crate::cache::{Cached, InvalidationCause, QueryCache};

use super::repos::{CollectionRepo, RepoError};

/// What a view binds to: the rows, whether a first load is pending, and the
/// last fetch error.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub data: Arc<Vec<T>>,
    pub is_loading: bool,
    pub error: Option<Arc<RepoError>>,
}

impl<T> QueryResult<T> {
    fn ready(data: Arc<Vec<T>>) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// An error with nothing cached to fall back on.
    pub fn failed_without_data(&self) -> bool {
        self.error.is_some() && self.data.is_empty()
    }
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

pub struct QueryService<T: Cached> {
    cache: Arc<QueryCache>,
    repo: Arc<dyn CollectionRepo<T>>,
}

impl<T: Cached> Clone for QueryService<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<T: Cached> QueryService<T> {
    pub fn new(cache: Arc<QueryCache>, repo: Arc<dyn CollectionRepo<T>>) -> Self {
        Self { cache, repo }
    }

    /// Return the cached collection, fetching first when it is absent or stale.
    ///
    /// When another reader's fetch is already in flight this does not wait:
    /// it answers with the stale data, or with `is_loading` when nothing is
    /// cached yet.
    pub async fn read(&self) -> QueryResult<T> {
        if let Some(entry) = self.cache.get::<T>() {
            if !entry.stale {
                return QueryResult::ready(entry.data);
            }
        }

        let Ok(_gate) = self.cache.fetch_gate::<T>().try_lock() else {
            return self.in_flight();
        };

        if let Some(entry) = self.cache.peek::<T>() {
            if !entry.stale {
                return QueryResult::ready(entry.data);
            }
        }

        self.fetch().await
    }

    /// Like [`QueryService::read`], but waits for an in-flight fetch instead of
    /// answering early. Live views and action replies use this so they never
    /// render a loading state that nothing would replace.
    pub async fn read_settled(&self) -> QueryResult<T> {
        if let Some(entry) = self.cache.get::<T>() {
            if !entry.stale {
                return QueryResult::ready(entry.data);
            }
        }

        let _gate = self.cache.fetch_gate::<T>().lock().await;

        // Another reader may have completed the fetch while we waited.
        if let Some(entry) = self.cache.peek::<T>() {
            if !entry.stale {
                return QueryResult::ready(entry.data);
            }
        }

        self.fetch().await
    }

    /// Invalidate and read again.
    pub async fn refetch(&self) -> QueryResult<T> {
        self.cache.invalidate(T::KEY, InvalidationCause::Refetch);
        self.read().await
    }

    fn in_flight(&self) -> QueryResult<T> {
        let error = self.cache.last_error::<T>();
        match self.cache.peek::<T>() {
            Some(entry) => QueryResult {
                data: entry.data,
                is_loading: false,
                error,
            },
            None => QueryResult {
                data: Arc::default(),
                is_loading: true,
                error,
            },
        }
    }

    async fn fetch(&self) -> QueryResult<T> {
        let guard = self.cache.begin_fetch::<T>();
        let started = Instant::now();
        let result = self.repo.list_all().await;
        histogram!("akasite_query_fetch_ms", "key" => T::KEY.as_str())
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(rows) => {
                debug!(
                    target = "akasite::application::query",
                    key = T::KEY.as_str(),
                    rows = rows.len(),
                    "collection fetched"
                );
                QueryResult::ready(self.cache.store_fetched(rows, &guard))
            }
            Err(err) => {
                warn!(
                    target = "akasite::application::query",
                    key = T::KEY.as_str(),
                    error = %err,
                    "collection fetch failed; keeping cached data"
                );
                let err = Arc::new(err);
                self.cache.record_error::<T>(Arc::clone(&err));
                let data = self
                    .cache
                    .peek::<T>()
                    .map(|entry| entry.data)
                    .unwrap_or_default();
                QueryResult {
                    data,
                    is_loading: false,
                    error: Some(err),
                }
            }
        }
    }
}
