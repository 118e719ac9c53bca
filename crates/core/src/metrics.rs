//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog requests (TMDB)
//! - Search lifecycle (debounce commits, stale responses)
//! - Trending search reports

use once_cell::sync::Lazy;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog requests by endpoint and result.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_catalog_requests_total", "Total catalog requests"),
        &["endpoint", "result"], // "discover"/"search", "ok"/"rejected"/"error"
    )
    .unwrap()
});

/// Catalog request duration in seconds.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "marquee_catalog_request_duration_seconds",
            "Duration of catalog requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Search Lifecycle Metrics
// =============================================================================

/// Debounced terms committed (each one starts a fetch).
pub static DEBOUNCE_COMMITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_debounce_commits_total",
        "Debounced search terms committed",
    )
    .unwrap()
});

/// Fetch completions discarded because a newer request superseded them.
pub static STALE_RESPONSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_stale_responses_total",
        "Catalog responses discarded as stale",
    )
    .unwrap()
});

// =============================================================================
// Trending Metrics
// =============================================================================

/// Search reports by result.
pub static SEARCH_REPORTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_search_reports_total", "Total search reports"),
        &["result"], // "recorded", "failed", "dropped"
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(DEBOUNCE_COMMITS.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(SEARCH_REPORTS.clone()),
    ]
}
