//! Error types for faculty operations

use std::time::Duration;
use thiserror::Error;

use crate::identity::LessonId;

/// Rejection of a raw lookup key. Raised before any I/O happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("id {raw:?} is not an integer: {reason}")]
    NotNumeric { raw: String, reason: String },

    #[error("id must be a positive integer, got {value}")]
    NotPositive { value: i64 },
}

impl KeyError {
    pub fn is_not_numeric(&self) -> bool {
        matches!(self, Self::NotNumeric { .. })
    }
}

/// Request payload validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Durable store errors.
///
/// `NotFound` is kept apart from the failure variants so callers can tell
/// an absent row from an unreachable store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No lesson with id {lesson_id}")]
    NotFound { lesson_id: LessonId },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Store call timed out after {after:?}")]
    Timeout { after: Duration },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Cache backend errors. Never surfaced past the read-through layer.
///
/// Timeouts and undecodable payloads are not backend errors; the
/// read-through layer classifies those itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Failed to connect to cache backend
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// Generic backend error
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Errors a lookup can return to its caller.
///
/// Cache faults never appear here; they degrade to the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("No lesson with id {lesson_id}")]
    NotFound { lesson_id: LessonId },

    #[error("Upstream error: {0}")]
    Upstream(StoreError),
}

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { lesson_id } => Self::NotFound { lesson_id },
            other => Self::Upstream(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type CacheResult<T> = Result<T, CacheError>;
pub type LookupResult<T> = Result<T, LookupError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_display() {
        let err = KeyError::NotPositive { value: -3 };
        assert_eq!(err.to_string(), "id must be a positive integer, got -3");

        let err = KeyError::NotNumeric {
            raw: "abc".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("invalid digit"));
    }

    #[test]
    fn test_store_not_found_becomes_lookup_not_found() -> Result<(), KeyError> {
        let lesson_id = LessonId::new(9)?;
        let err = LookupError::from(StoreError::NotFound { lesson_id });
        assert_eq!(err, LookupError::NotFound { lesson_id });
        Ok(())
    }

    #[test]
    fn test_store_failure_becomes_upstream() {
        let err = LookupError::from(StoreError::Unavailable {
            reason: "connection refused".to_string(),
        });
        assert!(matches!(err, LookupError::Upstream(StoreError::Unavailable { .. })));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Cache connection error: refused");
        let err = CacheError::Backend("READONLY".to_string());
        assert_eq!(err.to_string(), "Cache backend error: READONLY");
    }

    #[test]
    fn test_store_timeout_display() {
        let err = StoreError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert!(err.to_string().contains("1.5s"));
        assert!(!err.is_not_found());
    }
}
