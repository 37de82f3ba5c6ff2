//! Cache backend traits and cacheable entity marker.
//!
//! This module defines the traits that must be implemented by cache backends
//! and entities that can be cached.

use async_trait::async_trait;
use faculty_core::{CacheResult, Teacher};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Marker trait for types that can be cached.
///
/// Cached values are stored as JSON, so implementations must round-trip
/// through `serde_json`.
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Short name used in logs and metrics.
    fn entity_kind() -> &'static str;
}

impl CacheableEntity for Teacher {
    fn entity_kind() -> &'static str {
        "teacher"
    }
}

/// Cache backend trait for pluggable cache implementations.
///
/// A backend is a string-keyed store with per-entry TTL. The backend owns
/// entry lifetime (expiry, eviction); the read-through layer only reads and
/// writes, it never deletes.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from the cache.
    ///
    /// Returns `Ok(Some(value))` on hit, `Ok(None)` when the key is absent or
    /// expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, expiring `ttl` after the write.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Check if the cache backend is reachable.
    async fn health_check(&self) -> CacheResult<bool>;

    /// Name of the backend, for logs.
    fn provider_name(&self) -> &'static str;
}

/// Statistics about read-through cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from the cache.
    pub hits: u64,
    /// Key not present in the cache.
    pub misses_absent: u64,
    /// Cached payload could not be deserialized.
    pub misses_corrupt: u64,
    /// Cache backend returned an error.
    pub misses_unavailable: u64,
    /// Cache backend did not answer in time.
    pub misses_timed_out: u64,
    /// Fallback fetches issued to the durable store.
    pub store_fetches: u64,
    /// Fallback fetches that failed (not counting not-found).
    pub store_errors: u64,
    /// Successful write-backs.
    pub write_backs: u64,
    /// Write-backs that failed and were swallowed.
    pub write_failures: u64,
}

impl CacheStats {
    pub fn misses(&self) -> u64 {
        self.misses_absent + self.misses_corrupt + self.misses_unavailable + self.misses_timed_out
    }

    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
