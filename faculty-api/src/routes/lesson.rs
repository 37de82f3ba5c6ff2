//! Lesson REST API Routes
//!
//! - `GET /get-teacher-of-lesson/:id` - teacher of a lesson, read through the cache
//! - `PUT /add-lesson` - insert a lesson

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use faculty_core::Teacher;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::METRICS,
    types::CreateLessonRequest,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

fn record_lookup(source: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_lookup(source);
    }
}

/// GET /get-teacher-of-lesson/:id - Resolve which teacher gives a lesson
///
/// The id segment is taken as raw text so that a non-numeric id reaches
/// key validation instead of being rejected by the extractor.
pub async fn get_teacher_of_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Teacher>> {
    match state.lookup.lookup_within(&id, state.request_timeout).await {
        Ok(read) => {
            record_lookup(read.source().as_str());
            Ok(Json(read.into_value()))
        }
        Err(err) => {
            record_lookup("error");
            Err(err.into())
        }
    }
}

/// PUT /add-lesson - Insert a lesson taught by an existing teacher
///
/// Responds with a JSON `null` body on success.
pub async fn add_lesson(
    State(state): State<AppState>,
    payload: Result<Json<CreateLessonRequest>, JsonRejection>,
) -> ApiResult<Json<()>> {
    let Json(req) = payload?;
    let lesson = req.validate()?;

    state.lookup.create_lesson(&lesson).await.map_err(ApiError::from)?;

    tracing::info!(
        name = %lesson.name,
        teacher_id = %lesson.teacher_id,
        "Lesson added"
    );
    Ok(Json(()))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the lesson router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/get-teacher-of-lesson/:id", get(get_teacher_of_lesson))
        .route("/add-lesson", put(add_lesson))
}
