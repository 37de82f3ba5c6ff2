//! Identity types for lessons and teachers
//!
//! Both identifiers are positive integers assigned by the durable store.
//! Construction goes through [`LessonId::parse`] / [`LessonId::new`] so a
//! non-positive id can never reach the cache or the store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KeyError;

/// Identifier of a lesson row. Always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LessonId(i64);

impl LessonId {
    /// Wrap an already-parsed integer, rejecting zero and negatives.
    pub fn new(value: i64) -> Result<Self, KeyError> {
        if value <= 0 {
            return Err(KeyError::NotPositive { value });
        }
        Ok(Self(value))
    }

    /// Parse a raw path segment.
    ///
    /// Accepts exactly what a decimal integer parser accepts: an optional
    /// sign followed by ASCII digits that fit in an `i64`. Surrounding
    /// whitespace is not trimmed.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let value = raw.parse::<i64>().map_err(|e| KeyError::NotNumeric {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;
        Self::new(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Key under which the teacher of this lesson is cached: the decimal
    /// string form of the id.
    pub fn cache_key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for LessonId {
    type Error = KeyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LessonId> for i64 {
    fn from(id: LessonId) -> Self {
        id.0
    }
}

/// Identifier of a teacher row. Always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TeacherId(i64);

impl TeacherId {
    pub fn new(value: i64) -> Result<Self, KeyError> {
        if value <= 0 {
            return Err(KeyError::NotPositive { value });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for TeacherId {
    type Error = KeyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeacherId> for i64 {
    fn from(id: TeacherId) -> Self {
        id.0
    }
}
