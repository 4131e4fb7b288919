//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Identifier resolution (lookups, persistence)
//! - Price search (checks per leg, permit pool usage)
//! - Notifications (SMS and email delivery)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Resolution
// =============================================================================

/// Identifier lookups by result.
pub static IDENTIFIER_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "faretrack_identifier_lookups_total",
            "Total IATA code lookups",
        ),
        &["result"], // "resolved", "not_found", "lookup_failed", "persist_failed"
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Price checks by leg and result.
pub static PRICE_CHECKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faretrack_price_checks_total", "Total price checks"),
        &["leg", "result"], // leg: "direct", "indirect"; result: "found", "no_offer", "failed"
    )
    .unwrap()
});

/// Price check duration in seconds.
pub static PRICE_CHECK_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "faretrack_price_check_duration_seconds",
            "Duration of a single price check",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["leg"],
    )
    .unwrap()
});

/// Completed search units by outcome.
pub static SEARCH_UNITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faretrack_search_units_total", "Total search units run"),
        &["outcome"], // "notified", "no_deal", "no_result"
    )
    .unwrap()
});

/// Search permits currently held.
pub static SEARCH_PERMITS_IN_USE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "faretrack_search_permits_in_use",
        "Search permits currently held",
    )
    .unwrap()
});

// =============================================================================
// Notifications
// =============================================================================

/// Notifications sent by channel and result.
pub static NOTIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faretrack_notifications_total", "Total notifications"),
        &["channel", "result"], // channel: "sms", "email"; result: "sent", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(IDENTIFIER_LOOKUPS.clone()),
        Box::new(PRICE_CHECKS.clone()),
        Box::new(PRICE_CHECK_DURATION.clone()),
        Box::new(SEARCH_UNITS.clone()),
        Box::new(SEARCH_PERMITS_IN_USE.clone()),
        Box::new(NOTIFICATIONS.clone()),
    ]
}
