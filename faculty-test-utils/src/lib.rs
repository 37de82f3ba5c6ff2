//! Faculty Test Utilities
//!
//! Shared test infrastructure for the faculty workspace:
//! - A fault-injecting cache backend
//! - Proptest generators for keys and teacher records
//! - Fixtures for the common lookup scenarios
//! - Assertions over lookup errors

pub use faculty_core::{
    KeyError, Lesson, LessonId, LookupError, LookupResult, NewLesson, StoreError, Teacher,
    TeacherId, DEFAULT_CACHE_TTL,
};
pub use faculty_storage::{
    CacheBackend, CacheConfig, InMemoryCacheBackend, InMemoryLessonStore, LessonStore,
    TeacherLookup,
};

use async_trait::async_trait;
use faculty_core::{CacheError, CacheResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// FAULT-INJECTING CACHE
// ============================================================================

/// Cache backend that wraps [`InMemoryCacheBackend`] and can be told to fail.
///
/// Counts every call, including failed ones, and records the TTL of every
/// successful `set`.
#[derive(Debug, Default)]
pub struct FaultyCache {
    inner: InMemoryCacheBackend,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    get_delay: Mutex<Option<Duration>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    writes: Mutex<Vec<(String, Duration)>>,
}

impl FaultyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get` return a connection error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` return a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Delay every `get` by `delay` before answering.
    pub fn delay_reads(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.get_delay.lock() {
            *slot = delay;
        }
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Total calls of either kind.
    pub fn calls(&self) -> usize {
        self.get_calls() + self.set_calls()
    }

    /// `(key, ttl)` of every successful write, in order.
    pub fn writes(&self) -> Vec<(String, Duration)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Plant a raw payload, bypassing counters and fault switches.
    pub async fn plant(&self, key: &str, payload: &str) {
        self.inner.insert_raw(key, payload, DEFAULT_CACHE_TTL).await;
    }

    /// Read a stored payload, bypassing counters and fault switches.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.ok().flatten()
    }

    pub fn inner(&self) -> &InMemoryCacheBackend {
        &self.inner
    }
}

#[async_trait]
impl CacheBackend for FaultyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let delay = self.get_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("injected read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("injected write failure".to_string()));
        }
        self.inner.set(key, value, ttl).await?;
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((key.to_string(), ttl));
        }
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(!self.fail_get.load(Ordering::SeqCst))
    }

    fn provider_name(&self) -> &'static str {
        "faulty"
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for keys and teacher records.

    use super::*;
    use proptest::prelude::*;

    /// Generate a positive lesson id.
    pub fn arb_lesson_id() -> impl Strategy<Value = LessonId> {
        (1i64..=i64::MAX).prop_filter_map("positive", |v| LessonId::new(v).ok())
    }

    /// Generate a teacher with printable, possibly non-ASCII fields.
    pub fn arb_teacher() -> impl Strategy<Value = Teacher> {
        ("\\PC{1,24}", "\\PC{1,24}", "[A-Za-z. ]{0,12}")
            .prop_map(|(name, surname, degree)| Teacher::new(name, surname, degree))
    }

    /// Generate a raw key that parses to a non-positive integer.
    pub fn arb_non_positive_key() -> impl Strategy<Value = String> {
        (i64::MIN..=0i64).prop_map(|v| v.to_string())
    }

    /// Generate a raw key that does not parse as an integer at all.
    pub fn arb_non_numeric_key() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z]{1,8}",
            "[0-9]{1,4}\\.[0-9]{1,4}",
            " [0-9]{1,4}",
            Just(String::new()),
            Just("99999999999999999999".to_string()),
        ]
    }

    /// Generate any raw key that must be rejected before I/O.
    pub fn arb_invalid_key() -> impl Strategy<Value = String> {
        prop_oneof![arb_non_positive_key(), arb_non_numeric_key()]
    }

    /// Generate a payload that is not a valid teacher record.
    pub fn arb_corrupt_payload() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("{".to_string()),
            Just("null".to_string()),
            Just(r#"{"name":"Jane"}"#.to_string()),
            Just(r#"["Jane","Doe","PhD"]"#.to_string()),
            "[a-z]{1,16}",
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built stores and lookups for common scenarios.

    use super::*;

    /// Jane Doe, PhD.
    pub fn jane_doe() -> Teacher {
        Teacher::new("Jane", "Doe", "PhD")
    }

    /// A store holding lesson 7 ("Calculus") taught by teacher 1, Jane Doe.
    pub fn calculus_store() -> InMemoryLessonStore {
        let store = InMemoryLessonStore::new();
        if let (Ok(lesson_id), Ok(teacher_id)) = (LessonId::new(7), TeacherId::new(1)) {
            // A fresh store cannot be poisoned.
            let _ = store.seed(lesson_id, "Calculus", teacher_id, jane_doe());
        }
        store
    }

    /// A store holding a single lesson taught by `teacher`.
    pub fn store_with(lesson_id: LessonId, teacher: Teacher) -> InMemoryLessonStore {
        let store = InMemoryLessonStore::new();
        if let Ok(teacher_id) = TeacherId::new(1) {
            let _ = store.seed(lesson_id, "Lesson", teacher_id, teacher);
        }
        store
    }

    /// Wire a lookup over the given cache and store with default config.
    pub fn lookup_over(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn LessonStore>,
    ) -> TeacherLookup {
        TeacherLookup::new(cache, store, CacheConfig::default())
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over lookup results.

    use super::*;

    /// Assert that a lookup failed with an invalid key.
    #[track_caller]
    pub fn assert_invalid_key<T: std::fmt::Debug>(result: &LookupResult<T>) {
        match result {
            Err(LookupError::InvalidKey(_)) => {}
            other => panic!("Expected InvalidKey, got: {:?}", other),
        }
    }

    /// Assert that a lookup failed upstream (store failure, not absence).
    #[track_caller]
    pub fn assert_upstream<T: std::fmt::Debug>(result: &LookupResult<T>) {
        match result {
            Err(LookupError::Upstream(_)) => {}
            other => panic!("Expected Upstream error, got: {:?}", other),
        }
    }

    /// Assert that a lookup reported the lesson as absent.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &LookupResult<T>) {
        match result {
            Err(LookupError::NotFound { .. }) => {}
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }
}
