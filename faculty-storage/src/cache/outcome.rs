//! Outcomes of cache probes and read-through reads.
//!
//! A probe either hits or misses; the reason for a miss is kept only for
//! logs and statistics. Every miss takes the same fallback path.

use std::fmt;

/// Why a cache probe did not produce a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissReason {
    /// The key is not in the cache (never written, or expired).
    Absent,
    /// A payload was present but did not deserialize.
    Corrupt,
    /// The cache backend returned an error.
    Unavailable,
    /// The cache backend did not answer within the deadline.
    TimedOut,
}

impl MissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Corrupt => "corrupt",
            Self::Unavailable => "unavailable",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing the cache for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookupOutcome<T> {
    /// A valid cached value.
    Hit(T),
    /// No usable value; fall back to the store.
    Miss(MissReason),
}

impl<T> CacheLookupOutcome<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_hit(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss(_) => None,
        }
    }
}

/// Where a read-through result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Served from the cache; no store call was made.
    Cache,
    /// Fetched from the store after a miss.
    Storage {
        miss: MissReason,
        /// Whether the write-back to the cache succeeded.
        written_back: bool,
    },
}

impl ReadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Storage { .. } => "store",
        }
    }
}

/// Result of a read-through read, carrying its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRead<T> {
    value: T,
    source: ReadSource,
}

impl<T> CacheRead<T> {
    /// Create a read answered by the cache.
    pub fn from_cache(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Cache,
        }
    }

    /// Create a read answered by the store after a miss.
    pub fn from_storage(value: T, miss: MissReason, written_back: bool) -> Self {
        Self {
            value,
            source: ReadSource::Storage { miss, written_back },
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    /// Check if this was a cache hit.
    pub fn was_cache_hit(&self) -> bool {
        matches!(self.source, ReadSource::Cache)
    }

    /// Check if this was a cache miss (fetched from storage).
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit()
    }

    pub fn miss_reason(&self) -> Option<MissReason> {
        match self.source {
            ReadSource::Cache => None,
            ReadSource::Storage { miss, .. } => Some(miss),
        }
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            source: self.source,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_read_from_cache() {
        let read = CacheRead::from_cache("test_value".to_string());

        assert!(read.was_cache_hit());
        assert!(!read.was_cache_miss());
        assert_eq!(read.miss_reason(), None);
        assert_eq!(read.source().as_str(), "cache");
        assert_eq!(read.value(), "test_value");
    }

    #[test]
    fn test_cache_read_from_storage() {
        let read = CacheRead::from_storage(42i32, MissReason::Corrupt, false);

        assert!(read.was_cache_miss());
        assert_eq!(read.miss_reason(), Some(MissReason::Corrupt));
        assert_eq!(
            read.source(),
            ReadSource::Storage {
                miss: MissReason::Corrupt,
                written_back: false
            }
        );
        assert_eq!(read.into_value(), 42);
    }

    #[test]
    fn test_cache_read_map_keeps_source() {
        let read = CacheRead::from_storage(42i32, MissReason::Absent, true);
        let mapped = read.map(|v| v.to_string());

        assert_eq!(mapped.miss_reason(), Some(MissReason::Absent));
        assert_eq!(mapped.into_value(), "42");
    }

    #[test]
    fn test_outcome_into_hit() {
        assert_eq!(CacheLookupOutcome::Hit(3).into_hit(), Some(3));
        let miss: CacheLookupOutcome<i32> = CacheLookupOutcome::Miss(MissReason::TimedOut);
        assert!(!miss.is_hit());
        assert_eq!(miss.into_hit(), None);
        assert_eq!(MissReason::TimedOut.to_string(), "timed_out");
    }
}
