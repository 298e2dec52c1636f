//! Change-feed subscriptions that keep the query cache coherent.
//!
//! Events are signals only: a change to a table invalidates the keys the
//! registry maps it to, and the next read re-fetches the whole collection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use metrics::gauge;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheTrigger, lock_mutex};
use crate::domain::types::{ChangeKind, Table};

const SOURCE: &str = "application::realtime";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("change feed connection failed: {0}")]
    Connect(String),
    #[error("change feed subscription failed: {0}")]
    Subscribe(String),
}

/// Live stream of row changes for one table; dropping it unsubscribes.
pub struct ChangeSubscription {
    table: Table,
    events: BoxStream<'static, ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(table: Table, events: BoxStream<'static, ChangeEvent>) -> Self {
        Self { table, events }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Next event, or `None` once the feed has closed.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.events.next().await
    }
}

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, table: Table) -> Result<ChangeSubscription, FeedError>;
}

struct Mount {
    count: usize,
    dispatcher: JoinHandle<()>,
}

/// Reference-counted change-feed mounts, one subscription per table.
pub struct RealtimeHub {
    feed: Arc<dyn ChangeFeed>,
    trigger: CacheTrigger,
    mounts: Mutex<HashMap<Table, Mount>>,
}

/// Keeps a table's subscription open; the last dropped guard releases it.
pub struct MountGuard {
    hub: Arc<RealtimeHub>,
    table: Table,
}

impl std::fmt::Debug for MountGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountGuard")
            .field("table", &self.table)
            .finish()
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.hub.release(self.table);
    }
}

impl RealtimeHub {
    pub fn new(feed: Arc<dyn ChangeFeed>, trigger: CacheTrigger) -> Arc<Self> {
        Arc::new(Self {
            feed,
            trigger,
            mounts: Mutex::new(HashMap::new()),
        })
    }

    pub async fn mount(self: &Arc<Self>, table: Table) -> Result<MountGuard, FeedError> {
        if self.try_join(table) {
            return Ok(self.guard(table));
        }

        let subscription = self.feed.subscribe(table).await?;

        let mut mounts = lock_mutex(&self.mounts, SOURCE, "mount");
        if let Some(mount) = mounts.get_mut(&table) {
            // Lost a race with a concurrent first mount; ours is dropped here.
            mount.count += 1;
            publish_count(table, mount.count);
            return Ok(self.guard(table));
        }

        let dispatcher = tokio::spawn(dispatch(subscription, self.trigger.clone()));
        mounts.insert(
            table,
            Mount {
                count: 1,
                dispatcher,
            },
        );
        drop(mounts);

        publish_count(table, 1);
        info!(
            target = "akasite::application::realtime",
            table = table.as_str(),
            "change feed mounted"
        );
        Ok(self.guard(table))
    }

    pub fn mount_count(&self, table: Table) -> usize {
        lock_mutex(&self.mounts, SOURCE, "mount_count")
            .get(&table)
            .map_or(0, |mount| mount.count)
    }

    fn try_join(&self, table: Table) -> bool {
        let mut mounts = lock_mutex(&self.mounts, SOURCE, "try_join");
        match mounts.get_mut(&table) {
            Some(mount) => {
                mount.count += 1;
                publish_count(table, mount.count);
                true
            }
            None => false,
        }
    }

    fn guard(self: &Arc<Self>, table: Table) -> MountGuard {
        MountGuard {
            hub: Arc::clone(self),
            table,
        }
    }

    fn release(&self, table: Table) {
        let mut mounts = lock_mutex(&self.mounts, SOURCE, "release");
        let Some(mount) = mounts.get_mut(&table) else {
            return;
        };
        mount.count = mount.count.saturating_sub(1);
        publish_count(table, mount.count);
        if mount.count > 0 {
            return;
        }
        if let Some(mount) = mounts.remove(&table) {
            mount.dispatcher.abort();
            info!(
                target = "akasite::application::realtime",
                table = table.as_str(),
                "change feed released"
            );
        }
    }
}

fn publish_count(table: Table, count: usize) {
    gauge!("akasite_realtime_mounts", "table" => table.as_str()).set(count as f64);
}

async fn dispatch(mut subscription: ChangeSubscription, trigger: CacheTrigger) {
    let table = subscription.table();
    while let Some(event) = subscription.next().await {
        debug!(
            target = "akasite::application::realtime",
            table = event.table.as_str(),
            kind = event.kind.as_str(),
            "change event received"
        );
        trigger.row_changed(event.table, event.kind);
    }
    warn!(
        target = "akasite::application::realtime",
        table = table.as_str(),
        "change feed closed; dispatcher stopped"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_stream::stream;
    use tokio::sync::broadcast;

    use super::*;
    use crate::cache::{QueryCache, QueryKey};
    use crate::domain::entities::BlogPost;

    struct FakeFeed {
        sender: broadcast::Sender<ChangeEvent>,
        subscribes: AtomicUsize,
    }

    impl FakeFeed {
        fn new() -> Arc<Self> {
            let (sender, _) = broadcast::channel(16);
            Arc::new(Self {
                sender,
                subscribes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChangeFeed for FakeFeed {
        async fn subscribe(&self, table: Table) -> Result<ChangeSubscription, FeedError> {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            let mut receiver = self.sender.subscribe();
            let events = stream! {
                while let Ok(event) = receiver.recv().await {
                    if event.table == table {
                        yield event;
                    }
                }
            };
            Ok(ChangeSubscription::new(table, events.boxed()))
        }
    }

    async fn eventually(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    fn hub_with(feed: Arc<FakeFeed>) -> (Arc<QueryCache>, Arc<RealtimeHub>) {
        let cache = Arc::new(QueryCache::default());
        let hub = RealtimeHub::new(feed, CacheTrigger::new(Arc::clone(&cache)));
        (cache, hub)
    }

    #[tokio::test]
    async fn mounts_share_one_subscription_per_table() {
        let feed = FakeFeed::new();
        let (_cache, hub) = hub_with(Arc::clone(&feed));

        let first = hub.mount(Table::Blogs).await.expect("mount");
        let second = hub.mount(Table::Blogs).await.expect("mount");

        assert_eq!(feed.subscribes.load(Ordering::SeqCst), 1);
        assert_eq!(hub.mount_count(Table::Blogs), 2);

        drop(first);
        assert_eq!(hub.mount_count(Table::Blogs), 1);
        drop(second);
        assert_eq!(hub.mount_count(Table::Blogs), 0);

        assert!(eventually(|| feed.sender.receiver_count() == 0).await);
    }

    #[tokio::test]
    async fn change_events_invalidate_only_their_table() {
        let feed = FakeFeed::new();
        let (cache, hub) = hub_with(Arc::clone(&feed));
        cache.set::<BlogPost>(Vec::new());
        let mut notices = cache.subscribe();

        let _guard = hub.mount(Table::Blogs).await.expect("mount");
        assert!(eventually(|| feed.sender.receiver_count() == 1).await);

        feed.sender
            .send(ChangeEvent {
                table: Table::ContactMessages,
                kind: ChangeKind::Insert,
            })
            .expect("send");
        feed.sender
            .send(ChangeEvent {
                table: Table::Blogs,
                kind: ChangeKind::Update,
            })
            .expect("send");

        let notice = tokio::time::timeout(Duration::from_secs(1), notices.recv())
            .await
            .expect("notice in time")
            .expect("notice");
        assert_eq!(notice.key, QueryKey::Blogs);
        assert!(cache.get::<BlogPost>().expect("entry").stale);
    }
}
