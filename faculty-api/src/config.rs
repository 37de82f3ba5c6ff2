//! API Configuration Module
//!
//! Server, CORS and cache settings. Configuration is loaded from environment
//! variables with sensible defaults for development.

use std::str::FromStr;
use std::time::Duration;

use faculty_core::DEFAULT_CACHE_TTL;
use faculty_storage::CacheConfig;

use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_CACHE_TIMEOUT, DEFAULT_PORT, DEFAULT_REDIS_URL,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_STORE_TIMEOUT,
};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Upper bound for handling one request.
    pub request_timeout: Duration,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `FACULTY_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT` or `FACULTY_API_PORT`: Port (default: 8080)
    /// - `FACULTY_REQUEST_TIMEOUT_SECS`: Per-request bound (default: 30)
    /// - `FACULTY_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `FACULTY_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    ///
    /// Fails only on a port that is set but not a valid port number.
    pub fn from_env() -> ApiResult<Self> {
        let bind_host =
            std::env::var("FACULTY_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("FACULTY_API_PORT").ok())
        {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let request_timeout = std::env::var("FACULTY_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let cors_origins = std::env::var("FACULTY_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("FACULTY_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Ok(Self {
            bind_host,
            port,
            request_timeout,
            cors_origins,
            cors_max_age_secs,
        })
    }

    /// `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

/// Which cache backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Shared Redis instance.
    Redis,
    /// Process-local map. Single-process development only.
    Memory,
}

impl FromStr for CacheBackendKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(ApiError::invalid_input(format!(
                "Unknown cache backend '{}', expected 'redis' or 'memory'",
                other
            ))),
        }
    }
}

/// Cache backend selection and read-through timing.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackendKind,
    pub redis_url: String,
    pub entry_ttl: Duration,
    pub cache_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            entry_ttl: DEFAULT_CACHE_TTL,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl CacheSettings {
    /// Create CacheSettings from environment variables.
    ///
    /// Environment variables:
    /// - `FACULTY_CACHE_BACKEND`: `redis` or `memory` (default: redis)
    /// - `FACULTY_REDIS_URL`: Redis endpoint (default: redis://localhost:6379)
    /// - `FACULTY_CACHE_TTL_SECS`: Entry lifetime (default: 7200)
    /// - `FACULTY_CACHE_TIMEOUT_MS`: Bound for one cache call (default: 250)
    /// - `FACULTY_STORE_TIMEOUT_MS`: Bound for one store call (default: 5000)
    pub fn from_env() -> ApiResult<Self> {
        let backend = match std::env::var("FACULTY_CACHE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => CacheBackendKind::Redis,
        };

        Ok(Self {
            backend,
            redis_url: std::env::var("FACULTY_REDIS_URL")
                .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            entry_ttl: std::env::var("FACULTY_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CACHE_TTL),
            cache_timeout: std::env::var("FACULTY_CACHE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_CACHE_TIMEOUT),
            store_timeout: std::env::var("FACULTY_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
        })
    }

    /// Read-through configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_ttl(self.entry_ttl)
            .with_cache_timeout(self.cache_timeout)
            .with_store_timeout(self.store_timeout)
    }
}
