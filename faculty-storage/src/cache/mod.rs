//! Read-through cache layer.
//!
//! The cache is purely an optimization in front of the durable store. A read
//! consults the cache backend first; anything other than a well-formed hit
//! (absent key, corrupt payload, unreachable backend, timeout) collapses into
//! a single [`CacheLookupOutcome::Miss`] and the read falls back to storage.
//! After a successful store fetch the record is written back with a bounded
//! TTL, best-effort.
//!
//! # Example
//!
//! ```ignore
//! let cache = ReadThroughCache::new(backend, CacheConfig::default());
//! let read = cache.get::<Teacher, _>(lesson_id, &fetcher).await?;
//!
//! if read.was_cache_miss() {
//!     tracing::debug!(reason = ?read.miss_reason(), "served from store");
//! }
//! ```

pub mod memory_backend;
pub mod outcome;
pub mod read_through;
#[cfg(feature = "redis")]
pub mod redis_backend;
pub mod traits;

pub use memory_backend::InMemoryCacheBackend;
pub use outcome::{CacheLookupOutcome, CacheRead, MissReason, ReadSource};
pub use read_through::{CacheConfig, ReadThroughCache, StorageFetcher};
#[cfg(feature = "redis")]
pub use redis_backend::RedisCacheBackend;
pub use traits::{CacheBackend, CacheStats, CacheableEntity};
