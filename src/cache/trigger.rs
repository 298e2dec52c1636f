//! Entry point for "a table changed" signals.

use std::sync::Arc;

use tracing::info;

use crate::domain::types::{ChangeKind, Table};

use super::events::InvalidationCause;
use super::registry::keys_for;
use super::store::QueryCache;

/// Invalidates every cache key derived from a changed table.
#[derive(Clone)]
pub struct CacheTrigger {
    cache: Arc<QueryCache>,
}

impl CacheTrigger {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn table_changed(&self, table: Table, cause: InvalidationCause) {
        for key in keys_for(table) {
            let epoch = self.cache.invalidate(*key, cause);
            info!(
                target = "akasite::cache::trigger",
                table = table.as_str(),
                key = key.as_str(),
                cause = cause.as_str(),
                epoch,
                "Cache entry invalidated"
            );
        }
    }

    /// A row change reported by the change feed; every kind invalidates.
    pub fn row_changed(&self, table: Table, kind: ChangeKind) {
        metrics::counter!(
            "akasite_realtime_event_total",
            "table" => table.as_str(),
            "op" => kind.as_str()
        )
        .increment(1);
        self.table_changed(table, InvalidationCause::ChangeFeed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryKey;
    use crate::domain::entities::BlogPost;

    #[test]
    fn row_change_invalidates_mapped_key() {
        let cache = Arc::new(QueryCache::default());
        cache.set::<BlogPost>(Vec::new());
        let mut notices = cache.subscribe();
        let trigger = CacheTrigger::new(Arc::clone(&cache));

        trigger.row_changed(Table::Blogs, ChangeKind::Delete);

        assert!(cache.get::<BlogPost>().expect("entry").stale);
        let notice = notices.try_recv().expect("notice");
        assert_eq!(notice.key, QueryKey::Blogs);
        assert_eq!(notice.cause, InvalidationCause::ChangeFeed);
    }
}
