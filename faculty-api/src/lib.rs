//! Faculty API - HTTP Surface for Teacher-of-Lesson Lookups
//!
//! Serves `GET /get-teacher-of-lesson/:id` through a read-through cache in
//! front of PostgreSQL, and `PUT /add-lesson` straight to the store.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod macros;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

use std::sync::Arc;

use faculty_storage::{CacheBackend, InMemoryCacheBackend, RedisCacheBackend};

// Re-export commonly used types
pub use config::{ApiConfig, CacheBackendKind, CacheSettings};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
pub use types::CreateLessonRequest;

/// Build the cache backend named by `settings`.
///
/// Redis is opened without connecting. A failed startup ping is logged and
/// tolerated: lookups fall back to the store until Redis answers.
pub async fn connect_cache(settings: &CacheSettings) -> ApiResult<Arc<dyn CacheBackend>> {
    match settings.backend {
        CacheBackendKind::Memory => {
            tracing::warn!("Using in-process cache; entries are not shared between instances");
            Ok(Arc::new(InMemoryCacheBackend::new()))
        }
        CacheBackendKind::Redis => {
            let backend = RedisCacheBackend::open(&settings.redis_url)
                .map_err(|e| ApiError::internal_error(e.to_string()))?;

            match tokio::time::timeout(settings.cache_timeout, backend.health_check()).await {
                Ok(Ok(true)) => tracing::info!(backend = ?backend, "Redis cache reachable"),
                Ok(Ok(false)) => tracing::warn!(backend = ?backend, "Redis answered PING unexpectedly"),
                Ok(Err(e)) => tracing::warn!(backend = ?backend, error = %e, "Redis unreachable at startup"),
                Err(_) => tracing::warn!(backend = ?backend, "Redis PING timed out at startup"),
            }

            Ok(Arc::new(backend))
        }
    }
}
