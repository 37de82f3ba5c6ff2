//! Read-through cache with an explicit degrade-to-store contract.
//!
//! One read is a short sequential pipeline: probe the cache, on any miss
//! fetch from storage, write the fetched value back, return. The three steps
//! are strictly ordered. Nothing is shared between concurrent reads except
//! the backend handle, so two concurrent misses for one key both fetch and
//! both write back; the last write wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use faculty_core::{LessonId, LookupError, LookupResult, StoreError, StoreResult, DEFAULT_CACHE_TTL};
use tokio::time::{timeout, Instant};
use tracing::{debug, error, warn};

use super::outcome::{CacheLookupOutcome, CacheRead, MissReason};
use super::traits::{CacheBackend, CacheStats, CacheableEntity};

/// Configuration for the read-through cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied to every write-back.
    pub entry_ttl: Duration,
    /// Upper bound for a single cache call (read or write-back).
    pub cache_timeout: Duration,
    /// Upper bound for a single store fetch.
    pub store_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_CACHE_TTL,
            cache_timeout: Duration::from_millis(250),
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the per-call cache timeout.
    pub fn with_cache_timeout(mut self, duration: Duration) -> Self {
        self.cache_timeout = duration;
        self
    }

    /// Set the per-call store timeout.
    pub fn with_store_timeout(mut self, duration: Duration) -> Self {
        self.store_timeout = duration;
        self
    }
}

/// Storage fetcher trait for retrieving entities from the durable store.
///
/// Implementations report an absent row as `StoreError::NotFound` and every
/// other failure with one of the failure variants.
#[async_trait]
pub trait StorageFetcher<T: CacheableEntity>: Send + Sync {
    /// Fetch an entity from storage by key.
    async fn fetch(&self, key: LessonId) -> StoreResult<T>;
}

#[derive(Debug, Default)]
struct StatsCounters {
    hits: AtomicU64,
    misses_absent: AtomicU64,
    misses_corrupt: AtomicU64,
    misses_unavailable: AtomicU64,
    misses_timed_out: AtomicU64,
    store_fetches: AtomicU64,
    store_errors: AtomicU64,
    write_backs: AtomicU64,
    write_failures: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self, reason: MissReason) {
        match reason {
            MissReason::Absent => Self::bump(&self.misses_absent),
            MissReason::Corrupt => Self::bump(&self.misses_corrupt),
            MissReason::Unavailable => Self::bump(&self.misses_unavailable),
            MissReason::TimedOut => Self::bump(&self.misses_timed_out),
        }
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses_absent: self.misses_absent.load(Ordering::Relaxed),
            misses_corrupt: self.misses_corrupt.load(Ordering::Relaxed),
            misses_unavailable: self.misses_unavailable.load(Ordering::Relaxed),
            misses_timed_out: self.misses_timed_out.load(Ordering::Relaxed),
            store_fetches: self.store_fetches.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            write_backs: self.write_backs.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Time left for one call: the configured timeout, shortened to what remains
/// of the caller's deadline. `None` once the deadline has passed.
fn call_budget(configured: Duration, deadline: Option<Instant>) -> Option<Duration> {
    match deadline {
        None => Some(configured),
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                None
            } else {
                Some(remaining.min(configured))
            }
        }
    }
}

/// Read-through cache in front of a durable store.
///
/// Cache faults are absorbed here: an unreachable backend, a corrupt entry or
/// a slow response all read as a miss, and a failed write-back never fails
/// the read. Only store failures reach the caller.
pub struct ReadThroughCache {
    /// The cache backend.
    backend: Arc<dyn CacheBackend>,
    /// Cache configuration.
    config: CacheConfig,
    stats: Arc<StatsCounters>,
}

impl ReadThroughCache {
    /// Create a new read-through cache.
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Create a new read-through cache with default configuration.
    pub fn with_defaults(backend: Arc<dyn CacheBackend>) -> Self {
        Self::new(backend, CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &dyn CacheBackend {
        self.backend.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Get an entity from the cache, falling back to storage on any miss.
    pub async fn get<T, S>(&self, key: LessonId, storage: &S) -> LookupResult<CacheRead<T>>
    where
        T: CacheableEntity,
        S: StorageFetcher<T> + ?Sized,
    {
        self.get_with_deadline(key, storage, None).await
    }

    /// Like [`get`](Self::get), with every network call also bounded by
    /// `deadline`.
    pub async fn get_with_deadline<T, S>(
        &self,
        key: LessonId,
        storage: &S,
        deadline: Option<Instant>,
    ) -> LookupResult<CacheRead<T>>
    where
        T: CacheableEntity,
        S: StorageFetcher<T> + ?Sized,
    {
        let cache_key = key.cache_key();

        let miss = match self.probe::<T>(&cache_key, deadline).await {
            CacheLookupOutcome::Hit(value) => {
                StatsCounters::bump(&self.stats.hits);
                debug!(key = %cache_key, entity = T::entity_kind(), "Cache HIT");
                return Ok(CacheRead::from_cache(value));
            }
            CacheLookupOutcome::Miss(reason) => {
                self.stats.record_miss(reason);
                debug!(
                    key = %cache_key,
                    entity = T::entity_kind(),
                    miss_reason = %reason,
                    "Cache MISS, falling back to store"
                );
                reason
            }
        };

        let value = self.fetch_from_storage(key, storage, deadline).await?;
        let written_back = self.write_back(&cache_key, &value, deadline).await;

        Ok(CacheRead::from_storage(value, miss, written_back))
    }

    /// Probe the cache for `cache_key` without touching storage.
    pub async fn probe<T: CacheableEntity>(
        &self,
        cache_key: &str,
        deadline: Option<Instant>,
    ) -> CacheLookupOutcome<T> {
        let Some(limit) = call_budget(self.config.cache_timeout, deadline) else {
            return CacheLookupOutcome::Miss(MissReason::TimedOut);
        };

        let raw = match timeout(limit, self.backend.get(cache_key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => return CacheLookupOutcome::Miss(MissReason::Absent),
            Ok(Err(e)) => {
                warn!(
                    key = cache_key,
                    provider = self.backend.provider_name(),
                    error = %e,
                    "Cache read failed"
                );
                return CacheLookupOutcome::Miss(MissReason::Unavailable);
            }
            Err(_) => {
                warn!(
                    key = cache_key,
                    provider = self.backend.provider_name(),
                    timeout_ms = limit.as_millis() as u64,
                    "Cache read timed out"
                );
                return CacheLookupOutcome::Miss(MissReason::TimedOut);
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => CacheLookupOutcome::Hit(value),
            Err(e) => {
                warn!(key = cache_key, error = %e, "Ignoring undecodable cache entry");
                CacheLookupOutcome::Miss(MissReason::Corrupt)
            }
        }
    }

    async fn fetch_from_storage<T, S>(
        &self,
        key: LessonId,
        storage: &S,
        deadline: Option<Instant>,
    ) -> LookupResult<T>
    where
        T: CacheableEntity,
        S: StorageFetcher<T> + ?Sized,
    {
        StatsCounters::bump(&self.stats.store_fetches);

        let Some(limit) = call_budget(self.config.store_timeout, deadline) else {
            StatsCounters::bump(&self.stats.store_errors);
            return Err(LookupError::Upstream(StoreError::Timeout {
                after: Duration::ZERO,
            }));
        };

        let result = match timeout(limit, storage.fetch(key)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { after: limit }),
        };

        result.map_err(|e| {
            if !e.is_not_found() {
                StatsCounters::bump(&self.stats.store_errors);
                error!(lesson_id = %key, error = %e, "Store fetch failed");
            }
            LookupError::from(e)
        })
    }

    /// Best-effort write-back. Returns whether the entry was stored.
    async fn write_back<T: CacheableEntity>(
        &self,
        cache_key: &str,
        value: &T,
        deadline: Option<Instant>,
    ) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                StatsCounters::bump(&self.stats.write_failures);
                warn!(key = cache_key, error = %e, "Cache write skipped: serialization failed");
                return false;
            }
        };

        let Some(limit) = call_budget(self.config.cache_timeout, deadline) else {
            StatsCounters::bump(&self.stats.write_failures);
            warn!(key = cache_key, "Cache write skipped: deadline exceeded");
            return false;
        };

        let ttl = self.config.entry_ttl;
        match timeout(limit, self.backend.set(cache_key, &payload, ttl)).await {
            Ok(Ok(())) => {
                StatsCounters::bump(&self.stats.write_backs);
                debug!(key = cache_key, ttl_seconds = ttl.as_secs(), "Cache SET");
                true
            }
            Ok(Err(e)) => {
                StatsCounters::bump(&self.stats.write_failures);
                warn!(
                    key = cache_key,
                    provider = self.backend.provider_name(),
                    error = %e,
                    "Cache write failed"
                );
                false
            }
            Err(_) => {
                StatsCounters::bump(&self.stats.write_failures);
                warn!(key = cache_key, provider = self.backend.provider_name(), "Cache write timed out");
                false
            }
        }
    }
}

impl Clone for ReadThroughCache {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}
