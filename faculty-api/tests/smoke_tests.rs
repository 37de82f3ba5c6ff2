//! End-to-end smoke tests against a live PostgreSQL loaded with
//! `sql/schema.sql`. Run with `--features db-tests`.

#![cfg(feature = "db-tests")]

use std::sync::Arc;

use faculty_api::{ApiResult, DbClient, DbConfig};
use faculty_core::{LessonId, NewLesson};
use faculty_storage::{InMemoryCacheBackend, LessonStore};
use faculty_test_utils::fixtures::lookup_over;

fn test_db() -> ApiResult<DbClient> {
    let config = DbConfig::from_env();
    DbClient::from_config(&config)
}

#[tokio::test]
async fn smoke_test_store_health() -> ApiResult<()> {
    let db = test_db()?;
    db.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn smoke_test_missing_lesson_is_not_found() -> ApiResult<()> {
    let db = test_db()?;
    let lesson_id = LessonId::new(i64::MAX).map_err(faculty_api::ApiError::from)?;
    let err = db.fetch_teacher_of_lesson(lesson_id).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn smoke_test_seeded_lesson_reads_through() -> ApiResult<()> {
    let db = Arc::new(test_db()?);
    let cache = Arc::new(InMemoryCacheBackend::new());
    let lookup = lookup_over(cache.clone(), db.clone());

    let cold = lookup.lookup("1").await?;
    assert!(cold.was_cache_miss());
    assert!(!cache.is_empty().await);

    let warm = lookup.lookup("1").await?;
    assert!(warm.was_cache_hit());
    assert_eq!(cold.into_value(), warm.into_value());
    Ok(())
}

#[tokio::test]
async fn smoke_test_add_lesson_for_seeded_teacher() -> ApiResult<()> {
    let db = test_db()?;
    let lesson = NewLesson::new("smoke-test-lesson", 1)?;
    db.create_lesson(&lesson).await?;
    Ok(())
}
