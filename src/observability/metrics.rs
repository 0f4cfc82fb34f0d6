//! # Metrics
//!
//! Prometheus metrics for monitoring the hook server.
//!
//! ## Metrics Exposed
//!
//! - `hpcr_hook_requests_total{hook,outcome}` - Hook invocations by outcome (ready, pending, error, rejected)
//! - `hpcr_hook_duration_seconds{hook}` - Duration of hook invocations

use anyhow::Result;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static HOOK_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("hpcr_hook_requests_total", "Total number of hook invocations"),
        &["hook", "outcome"],
    )
    .expect("Failed to create HOOK_REQUESTS_TOTAL metric - this should never happen")
});

static HOOK_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hpcr_hook_duration_seconds",
            "Duration of hook invocations in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["hook"],
    )
    .expect("Failed to create HOOK_DURATION metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(HOOK_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HOOK_DURATION.clone()))?;

    Ok(())
}

pub fn record_hook(hook: &str, outcome: &str, duration: f64) {
    HOOK_REQUESTS_TOTAL.with_label_values(&[hook, outcome]).inc();
    HOOK_DURATION.with_label_values(&[hook]).observe(duration);
}

pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_hook_counts_by_outcome() {
        let before = HOOK_REQUESTS_TOTAL
            .with_label_values(&["test/sync", "pending"])
            .get();
        record_hook("test/sync", "pending", 0.2);
        record_hook("test/sync", "pending", 0.3);

        let after = HOOK_REQUESTS_TOTAL
            .with_label_values(&["test/sync", "pending"])
            .get();
        assert_eq!(after - before, 2);
    }
}
