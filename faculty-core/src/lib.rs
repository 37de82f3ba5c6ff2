//! Faculty Core - Entity Types
//!
//! Pure data structures shared by the storage and API crates.
//! This crate contains ONLY data types, key parsing and errors - no I/O.

pub mod entities;
pub mod error;
pub mod identity;

pub use entities::{Lesson, NewLesson, Teacher};
pub use error::{
    CacheError, CacheResult, KeyError, LookupError, LookupResult, StoreError, StoreResult,
    ValidationError,
};
pub use identity::{LessonId, TeacherId};

use std::time::Duration;

/// Lifetime of a cached teacher record, measured from write time.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
