//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a tracing span and records Prometheus metrics
//! keyed by a normalized path.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::METRICS;

/// Numeric path segment. Every resource id in this API is an integer.
static ID_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/[+-]?\d+(/|$)").ok());

/// Normalize path for metrics/spans (replace IDs with placeholders).
///
/// This prevents high-cardinality label explosion in Prometheus.
fn normalize_path(path: &str) -> String {
    match ID_SEGMENT.as_ref() {
        Some(pattern) => pattern.replace_all(path, "/{id}$1").to_string(),
        None => path.to_string(),
    }
}

/// Observability middleware for Axum.
///
/// This middleware wraps every request with:
/// 1. A tracing span carrying method and route
/// 2. Prometheus metrics recording
/// 3. A completion log line
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        let path = "/get-teacher-of-lesson/12345";
        assert_eq!(normalize_path(path), "/get-teacher-of-lesson/{id}");
    }

    #[test]
    fn test_normalize_path_signed_id() {
        assert_eq!(
            normalize_path("/get-teacher-of-lesson/-3"),
            "/get-teacher-of-lesson/{id}"
        );
    }

    #[test]
    fn test_normalize_path_non_numeric_segment_kept() {
        assert_eq!(
            normalize_path("/get-teacher-of-lesson/abc"),
            "/get-teacher-of-lesson/abc"
        );
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/add-lesson"), "/add-lesson");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
