//! Constants for the faculty API
//!
//! Defaults for every setting that can be overridden from the environment.

use std::time::Duration;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Upper bound for a whole request, lookups included
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// DATABASE
// ============================================================================

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "postgres";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_POOL_SIZE: usize = 16;
pub const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// CACHE
// ============================================================================

/// Default Redis endpoint
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default upper bound for one cache call
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

/// Default upper bound for one store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// HTTP ERRORS
// ============================================================================

/// Key of the single field in every error body. The trailing colon is part
/// of the wire format clients already parse.
pub const ERROR_BODY_KEY: &str = "message:";

/// Message returned for a zero or negative lesson id
pub const NON_POSITIVE_ID_MESSAGE: &str = "id cannot be negative";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_are_ordered() {
        assert!(DEFAULT_CACHE_TIMEOUT < DEFAULT_STORE_TIMEOUT);
        assert!(DEFAULT_STORE_TIMEOUT < DEFAULT_REQUEST_TIMEOUT);
    }
}
