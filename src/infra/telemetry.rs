use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(InfraError::from)
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "akasite_query_cache_hit_total",
            Unit::Count,
            "Reads answered from a fresh cache entry."
        );
        describe_counter!(
            "akasite_query_cache_miss_total",
            Unit::Count,
            "Reads that found no entry or a stale one."
        );
        describe_counter!(
            "akasite_query_cache_invalidation_total",
            Unit::Count,
            "Cache invalidations, labelled by key and cause."
        );
        describe_histogram!(
            "akasite_query_fetch_ms",
            Unit::Milliseconds,
            "Store round trip for a full collection fetch."
        );
        describe_counter!(
            "akasite_realtime_event_total",
            Unit::Count,
            "Change-feed events received, labelled by table and operation."
        );
        describe_gauge!(
            "akasite_realtime_mounts",
            Unit::Count,
            "Active change-feed mounts per table."
        );
    });
}
