//! Health Check Endpoints
//!
//! Provides Kubernetes-compatible health check endpoints:
//! - /health/ping - Simple liveness check
//! - /health/ready - Store and cache connectivity check
//! - /health/live - Process alive check
//!
//! The store is required for readiness. A cache that cannot be reached only
//! degrades the service, since every lookup can still be answered from the
//! store.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub database: ComponentHealth,
    pub cache: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn from_check(result: Result<u64, String>, failed: HealthStatus) -> Self {
        match result {
            Ok(latency) => Self {
                status: HealthStatus::Healthy,
                latency_ms: Some(latency),
                error: None,
            },
            Err(e) => Self {
                status: failed,
                latency_ms: None,
                error: Some(e),
            },
        }
    }
}

/// Combine component states. Only the database can make the service unhealthy.
fn overall_status(database: HealthStatus, cache: HealthStatus) -> HealthStatus {
    match (database, cache) {
        (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
        (HealthStatus::Healthy, _) => HealthStatus::Degraded,
        _ => HealthStatus::Unhealthy,
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check (store and cache connectivity)
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = ComponentHealth::from_check(check_database(&state).await, HealthStatus::Unhealthy);
    let cache = ComponentHealth::from_check(check_cache(&state).await, HealthStatus::Degraded);

    let status = overall_status(database.status, cache.status);
    let response = HealthResponse {
        status,
        message: None,
        details: Some(HealthDetails {
            database,
            cache,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

async fn check_database(state: &AppState) -> Result<u64, String> {
    let start = Instant::now();
    let limit = state.lookup.config().store_timeout;

    match tokio::time::timeout(limit, state.lookup.store().health_check()).await {
        Ok(Ok(())) => Ok(elapsed_ms(start)),
        Ok(Err(e)) => Err(format!("Database check failed: {}", e)),
        Err(_) => Err(format!("Database check timed out after {:?}", limit)),
    }
}

async fn check_cache(state: &AppState) -> Result<u64, String> {
    let start = Instant::now();
    let limit = state.lookup.config().cache_timeout;
    let cache = state.lookup.cache();

    match tokio::time::timeout(limit, cache.health_check()).await {
        Ok(Ok(true)) => Ok(elapsed_ms(start)),
        Ok(Ok(false)) => Err(format!("{} cache answered unexpectedly", cache.provider_name())),
        Ok(Err(e)) => Err(format!("Cache check failed: {}", e)),
        Err(_) => Err(format!("Cache check timed out after {:?}", limit)),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: Some("All systems operational".to_string()),
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_overall_status() {
        use HealthStatus::*;
        assert_eq!(overall_status(Healthy, Healthy), Healthy);
        assert_eq!(overall_status(Healthy, Degraded), Degraded);
        assert_eq!(overall_status(Unhealthy, Healthy), Unhealthy);
        assert_eq!(overall_status(Unhealthy, Degraded), Unhealthy);
    }

    #[test]
    fn test_component_health_with_error() {
        let component = ComponentHealth::from_check(
            Err("Connection refused".to_string()),
            HealthStatus::Degraded,
        );

        let json = serde_json::to_string(&component).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("Connection refused"));
        assert!(!json.contains("latency_ms"));
    }
}
