mod common;

use akasite::domain::types::PostStatus;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use common::{harness, post};

fn counter(entries: &[(String, DebugValue)], name: &str) -> u64 {
    entries
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| match value {
            DebugValue::Counter(count) => *count,
            _ => 0,
        })
        .sum()
}

#[tokio::test]
async fn reads_record_hits_misses_and_invalidations() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("install recorder");

    let h = harness();
    h.backend
        .insert_posts(vec![post("Metered", PostStatus::Published, false)]);

    h.app.blogs.read().await;
    h.app.blogs.read().await;
    h.app.blogs.refetch().await;

    let entries: Vec<(String, DebugValue)> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, value)| (key.key().name().to_string(), value))
        .collect();

    assert!(counter(&entries, "akasite_query_cache_miss_total") >= 2);
    assert!(counter(&entries, "akasite_query_cache_hit_total") >= 1);
    assert!(counter(&entries, "akasite_query_cache_invalidation_total") >= 1);
    assert!(
        entries
            .iter()
            .any(|(key, _)| key == "akasite_query_fetch_ms"),
        "fetch latency recorded"
    );
}
