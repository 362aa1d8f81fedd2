//! Prometheus metrics for the trust center server.
//!
//! Exposes cache effectiveness (hits, misses, invalidations) and database
//! read latency per resource.
//!
//! # Security Note
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! Restrict it to scraper addresses at the network level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};
use trustcenter_core::Resource;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Cache metrics
pub static CACHE_HITS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trustcenter_cache_hits_total",
            "Total number of reads served from the cache",
        ),
        &["resource"],
    )
    .expect("metric creation failed")
});

pub static CACHE_MISSES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trustcenter_cache_misses_total",
            "Total number of reads that populated the cache from the database",
        ),
        &["resource"],
    )
    .expect("metric creation failed")
});

pub static CACHE_INVALIDATIONS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "trustcenter_cache_invalidations_total",
        "Total number of explicit cache invalidations",
    )
    .expect("metric creation failed")
});

// Database metrics
pub static DB_QUERY_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trustcenter_db_query_errors_total",
            "Total number of failed resource reads",
        ),
        &["resource"],
    )
    .expect("metric creation failed")
});

pub static DB_QUERY_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trustcenter_db_query_duration_seconds",
            "Time taken to read a resource from the database",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["resource"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests can build many routers in one process.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(CACHE_HITS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CACHE_MISSES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CACHE_INVALIDATIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DB_QUERY_ERRORS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DB_QUERY_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

pub fn record_cache_hit(resource: Resource) {
    CACHE_HITS.with_label_values(&[resource.as_str()]).inc();
}

pub fn record_cache_miss(resource: Resource) {
    CACHE_MISSES.with_label_values(&[resource.as_str()]).inc();
}

pub fn record_query_error(resource: Resource) {
    DB_QUERY_ERRORS.with_label_values(&[resource.as_str()]).inc();
}
