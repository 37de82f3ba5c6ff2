//! Faculty Storage - Lesson Store Contract and Cache Layer
//!
//! Defines the durable store abstraction (`LessonStore`), an in-memory
//! implementation of it, and the read-through cache that fronts it.
//! The PostgreSQL implementation lives in faculty-api.

pub mod cache;
pub mod lookup;

pub use cache::{
    CacheBackend, CacheConfig, CacheLookupOutcome, CacheRead, CacheStats, CacheableEntity,
    InMemoryCacheBackend, MissReason, ReadSource, ReadThroughCache, StorageFetcher,
};
#[cfg(feature = "redis")]
pub use cache::RedisCacheBackend;
pub use lookup::{TeacherLookup, TeacherOfLessonFetcher};

use async_trait::async_trait;
use faculty_core::{Lesson, LessonId, NewLesson, StoreError, StoreResult, Teacher, TeacherId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Durable store adapter for lessons and their teachers.
///
/// Implementations must be safe for concurrent use; one shared handle serves
/// every request.
#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Resolve the teacher of a lesson by joining the lesson to its teacher.
    ///
    /// The key is assumed valid. Zero matching rows is `StoreError::NotFound`;
    /// every other failure is one of the failure variants.
    async fn fetch_teacher_of_lesson(&self, lesson_id: LessonId) -> StoreResult<Teacher>;

    /// Insert a lesson. Read paths are not touched.
    async fn create_lesson(&self, lesson: &NewLesson) -> StoreResult<()>;

    /// Check store connectivity.
    async fn health_check(&self) -> StoreResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory `LessonStore` with the same join semantics as the SQL adapter.
///
/// Counts fetches and can simulate an outage or slow responses, which makes
/// it the store of choice for tests and single-process development.
#[derive(Debug, Default)]
pub struct InMemoryLessonStore {
    teachers: RwLock<HashMap<TeacherId, Teacher>>,
    lessons: RwLock<HashMap<LessonId, Lesson>>,
    fetch_count: AtomicUsize,
    outage: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        reason: "in-memory store lock poisoned".to_string(),
    }
}

impl InMemoryLessonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_teacher(&self, teacher_id: TeacherId, teacher: Teacher) -> StoreResult<()> {
        self.teachers
            .write()
            .map_err(|_| poisoned())?
            .insert(teacher_id, teacher);
        Ok(())
    }

    /// Insert a lesson under an explicit id, bypassing the foreign key check.
    pub fn insert_lesson(&self, lesson: Lesson) -> StoreResult<()> {
        self.lessons
            .write()
            .map_err(|_| poisoned())?
            .insert(lesson.lesson_id, lesson);
        Ok(())
    }

    /// Seed a teacher and a lesson taught by them in one call.
    pub fn seed(
        &self,
        lesson_id: LessonId,
        lesson_name: impl Into<String>,
        teacher_id: TeacherId,
        teacher: Teacher,
    ) -> StoreResult<()> {
        self.insert_teacher(teacher_id, teacher)?;
        self.insert_lesson(Lesson {
            lesson_id,
            name: lesson_name.into(),
            teacher_id,
        })
    }

    /// Number of `fetch_teacher_of_lesson` calls observed, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Simulate the store being unreachable.
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    /// Delay every store call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) -> StoreResult<()> {
        *self.latency.lock().map_err(|_| poisoned())? = latency;
        Ok(())
    }

    pub fn lesson_count(&self) -> StoreResult<usize> {
        Ok(self.lessons.read().map_err(|_| poisoned())?.len())
    }

    pub fn lessons(&self) -> StoreResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.lesson_id);
        Ok(lessons)
    }

    async fn simulate_io(&self) -> StoreResult<()> {
        let latency = *self.latency.lock().map_err(|_| poisoned())?;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.outage.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LessonStore for InMemoryLessonStore {
    async fn fetch_teacher_of_lesson(&self, lesson_id: LessonId) -> StoreResult<Teacher> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_io().await?;

        let teacher_id = self
            .lessons
            .read()
            .map_err(|_| poisoned())?
            .get(&lesson_id)
            .map(|lesson| lesson.teacher_id)
            .ok_or(StoreError::NotFound { lesson_id })?;

        // Inner join: a lesson whose teacher row is gone yields no row.
        self.teachers
            .read()
            .map_err(|_| poisoned())?
            .get(&teacher_id)
            .cloned()
            .ok_or(StoreError::NotFound { lesson_id })
    }

    async fn create_lesson(&self, lesson: &NewLesson) -> StoreResult<()> {
        self.simulate_io().await?;

        if !self
            .teachers
            .read()
            .map_err(|_| poisoned())?
            .contains_key(&lesson.teacher_id)
        {
            return Err(StoreError::QueryFailed {
                reason: format!(
                    "insert violates foreign key: no teacher with id {}",
                    lesson.teacher_id
                ),
            });
        }

        let mut lessons = self.lessons.write().map_err(|_| poisoned())?;
        let next = lessons
            .keys()
            .map(|id| id.get())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StoreError::QueryFailed {
                reason: "lesson id sequence exhausted".to_string(),
            })?;
        let lesson_id = LessonId::new(next).map_err(|e| StoreError::QueryFailed {
            reason: e.to_string(),
        })?;
        lessons.insert(
            lesson_id,
            Lesson {
                lesson_id,
                name: lesson.name.clone(),
                teacher_id: lesson.teacher_id,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.simulate_io().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(lesson: i64, teacher: i64) -> (LessonId, TeacherId) {
        (
            LessonId::new(lesson).expect("positive lesson id"),
            TeacherId::new(teacher).expect("positive teacher id"),
        )
    }

    #[tokio::test]
    async fn test_fetch_joins_lesson_to_teacher() -> StoreResult<()> {
        let store = InMemoryLessonStore::new();
        let (lesson_id, teacher_id) = ids(7, 1);
        store.seed(lesson_id, "Calculus", teacher_id, Teacher::new("Jane", "Doe", "PhD"))?;

        let teacher = store.fetch_teacher_of_lesson(lesson_id).await?;
        assert_eq!(teacher, Teacher::new("Jane", "Doe", "PhD"));
        assert_eq!(store.fetch_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_lesson_is_not_found() {
        let store = InMemoryLessonStore::new();
        let (lesson_id, _) = ids(42, 1);
        let err = store.fetch_teacher_of_lesson(lesson_id).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound { lesson_id });
    }

    #[tokio::test]
    async fn test_fetch_orphaned_lesson_is_not_found() -> StoreResult<()> {
        let store = InMemoryLessonStore::new();
        let (lesson_id, teacher_id) = ids(3, 99);
        store.insert_lesson(Lesson {
            lesson_id,
            name: "Orphan".to_string(),
            teacher_id,
        })?;
        let err = store.fetch_teacher_of_lesson(lesson_id).await.unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_outage_fails_every_call() {
        let store = InMemoryLessonStore::new();
        store.set_outage(true);
        let (lesson_id, _) = ids(1, 1);

        let err = store.fetch_teacher_of_lesson(lesson_id).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(store.health_check().await.is_err());
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_create_lesson_assigns_next_id() -> StoreResult<()> {
        let store = InMemoryLessonStore::new();
        let (lesson_id, teacher_id) = ids(4, 2);
        store.seed(lesson_id, "Algebra", teacher_id, Teacher::new("Ada", "Byron", "MSc"))?;

        let new_lesson = NewLesson::new("Geometry", 2).expect("valid lesson");
        store.create_lesson(&new_lesson).await?;

        let lessons = store.lessons()?;
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[1].lesson_id.get(), 5);
        assert_eq!(lessons[1].name, "Geometry");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_lesson_after_max_id_fails_cleanly() -> StoreResult<()> {
        let store = InMemoryLessonStore::new();
        let (lesson_id, teacher_id) = ids(i64::MAX, 1);
        store.seed(lesson_id, "Last", teacher_id, Teacher::new("Ada", "Byron", "MSc"))?;

        let new_lesson = NewLesson::new("Overflow", 1).expect("valid lesson");
        let err = store.create_lesson(&new_lesson).await.unwrap_err();
        assert!(matches!(err, StoreError::QueryFailed { .. }));
        assert_eq!(store.lesson_count()?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_poisoned_teacher_table_is_unavailable_not_absent() -> StoreResult<()> {
        let store = std::sync::Arc::new(InMemoryLessonStore::new());
        let (lesson_id, teacher_id) = ids(7, 1);
        store.seed(lesson_id, "Calculus", teacher_id, Teacher::new("Jane", "Doe", "PhD"))?;

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.teachers.write().unwrap();
            panic!("poison the teacher table");
        })
        .join();

        let err = store.fetch_teacher_of_lesson(lesson_id).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_lesson_enforces_teacher_reference() {
        let store = InMemoryLessonStore::new();
        let new_lesson = NewLesson::new("Geometry", 8).expect("valid lesson");
        let err = store.create_lesson(&new_lesson).await.unwrap_err();
        assert!(matches!(err, StoreError::QueryFailed { .. }));
        assert_eq!(store.lesson_count().ok(), Some(0));
    }
}
