//! Prometheus metrics export.
//!
//! A run is a one-shot process, so metrics are rendered once at the end and
//! written to a file for a node exporter textfile collector to pick up.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Unix time at which the last run finished.
pub static LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "faretrack_last_run_timestamp_seconds",
        "Unix time at which the last tracking run finished",
    )
    .unwrap()
});

/// Deals tracked in the last run.
pub static DEALS_TRACKED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("faretrack_deals_tracked", "Deals tracked in the last run").unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(LAST_RUN_TIMESTAMP.clone()))
        .unwrap();
    registry.register(Box::new(DEALS_TRACKED.clone())).unwrap();

    for metric in faretrack_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Write the current metrics to `path`.
pub async fn write_metrics(path: &Path) -> Result<()> {
    let text = encode_metrics()?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics to {:?}", path))
}
