//! Prometheus Metrics Definitions
//!
//! Defines the faculty metrics and exposes a /metrics endpoint for
//! Prometheus scraping.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use faculty_storage::CacheStats;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec, Encoder,
    HistogramVec, IntGaugeVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<FacultyMetrics>> = Lazy::new(FacultyMetrics::new);

/// Container for all faculty metrics.
#[derive(Clone)]
pub struct FacultyMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Lookup counter - labels: source (cache, store, error)
    pub lookups_total: CounterVec,

    /// Read-through cache counters mirrored from `CacheStats` - labels: event
    pub cache_events: IntGaugeVec,
}

impl FacultyMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "faculty_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "faculty_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            lookups_total: register_counter_vec!(
                "faculty_lookups_total",
                "Teacher-of-lesson lookups by where the answer came from",
                &["source"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register lookups_total: {}", e)))?,

            cache_events: register_int_gauge_vec!(
                "faculty_cache_events",
                "Read-through cache counters since process start",
                &["event"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_events: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a lookup outcome.
    pub fn record_lookup(&self, source: &str) {
        self.lookups_total.with_label_values(&[source]).inc();
    }

    /// Copy a cache statistics snapshot into the gauges.
    pub fn observe_cache_stats(&self, stats: &CacheStats) {
        let events = [
            ("hit", stats.hits),
            ("miss_absent", stats.misses_absent),
            ("miss_corrupt", stats.misses_corrupt),
            ("miss_unavailable", stats.misses_unavailable),
            ("miss_timed_out", stats.misses_timed_out),
            ("store_fetch", stats.store_fetches),
            ("store_error", stats.store_errors),
            ("write_back", stats.write_backs),
            ("write_failure", stats.write_failures),
        ];
        for (event, count) in events {
            self.cache_events
                .with_label_values(&[event])
                .set(i64::try_from(count).unwrap_or(i64::MAX));
        }
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.observe_cache_stats(&state.lookup.stats());
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        // Force initialization
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_lookup() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let before = metrics.lookups_total.with_label_values(&["cache"]).get();
        metrics.record_lookup("cache");
        assert!(metrics.lookups_total.with_label_values(&["cache"]).get() >= before + 1.0);
        Ok(())
    }

    #[test]
    fn test_observe_cache_stats() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let stats = CacheStats {
            hits: 3,
            write_failures: 2,
            ..Default::default()
        };
        metrics.observe_cache_stats(&stats);
        assert_eq!(metrics.cache_events.with_label_values(&["hit"]).get(), 3);
        assert_eq!(metrics.cache_events.with_label_values(&["write_failure"]).get(), 2);
        Ok(())
    }
}
