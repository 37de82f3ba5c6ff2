//! Teacher-of-lesson lookup: key parsing in front of the read-through cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use faculty_core::{
    LessonId, LookupResult, NewLesson, StoreError, StoreResult, Teacher,
};
use tokio::time::{timeout, Instant};
use tracing::{debug, instrument};

use crate::cache::{CacheBackend, CacheConfig, CacheRead, CacheStats, ReadThroughCache, StorageFetcher};
use crate::LessonStore;

/// Adapts a [`LessonStore`] to the fetcher the read-through cache expects.
pub struct TeacherOfLessonFetcher<'a> {
    store: &'a dyn LessonStore,
}

impl<'a> TeacherOfLessonFetcher<'a> {
    pub fn new(store: &'a dyn LessonStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'a> StorageFetcher<Teacher> for TeacherOfLessonFetcher<'a> {
    async fn fetch(&self, key: LessonId) -> StoreResult<Teacher> {
        self.store.fetch_teacher_of_lesson(key).await
    }
}

/// Resolves which teacher gives a lesson.
///
/// Holds the shared cache and store handles. Cheap to share behind an `Arc`;
/// every method takes `&self` and no state is kept between calls apart from
/// statistics.
pub struct TeacherLookup {
    cache: ReadThroughCache,
    store: Arc<dyn LessonStore>,
}

impl TeacherLookup {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn LessonStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache: ReadThroughCache::new(cache, config),
            store,
        }
    }

    /// Look up the teacher of the lesson named by `raw_key`.
    ///
    /// The key is validated before any cache or store call; an invalid key
    /// fails with `LookupError::InvalidKey`.
    #[instrument(skip(self))]
    pub async fn lookup(&self, raw_key: &str) -> LookupResult<CacheRead<Teacher>> {
        let key = LessonId::parse(raw_key)?;
        self.lookup_id(key, None).await
    }

    /// Like [`lookup`](Self::lookup), with the whole pipeline bounded by
    /// `budget`.
    #[instrument(skip(self))]
    pub async fn lookup_within(
        &self,
        raw_key: &str,
        budget: Duration,
    ) -> LookupResult<CacheRead<Teacher>> {
        let key = LessonId::parse(raw_key)?;
        self.lookup_id(key, Some(Instant::now() + budget)).await
    }

    /// Look up by an already-validated id.
    pub async fn lookup_id(
        &self,
        key: LessonId,
        deadline: Option<Instant>,
    ) -> LookupResult<CacheRead<Teacher>> {
        let fetcher = TeacherOfLessonFetcher::new(self.store.as_ref());
        let read = self.cache.get_with_deadline(key, &fetcher, deadline).await?;
        debug!(lesson_id = %key, source = read.source().as_str(), "Lookup served");
        Ok(read)
    }

    /// Insert a lesson. Cached lookups are left untouched; a changed
    /// teacher becomes visible once the cached entry expires.
    pub async fn create_lesson(&self, lesson: &NewLesson) -> StoreResult<()> {
        let limit = self.cache.config().store_timeout;
        match timeout(limit, self.store.create_lesson(lesson)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { after: limit }),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn store(&self) -> &dyn LessonStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &dyn CacheBackend {
        self.cache.backend()
    }

    pub fn config(&self) -> &CacheConfig {
        self.cache.config()
    }
}
