use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use faculty_api::{create_api_router, ApiConfig, AppState};
use faculty_storage::{CacheBackend, LessonStore};
use faculty_test_utils::fixtures::lookup_over;
use tower::ServiceExt;

pub fn test_router(cache: Arc<dyn CacheBackend>, store: Arc<dyn LessonStore>) -> Router {
    let lookup = Arc::new(lookup_over(cache, store));
    create_api_router(AppState::with_lookup(lookup), &ApiConfig::default())
}

/// Send one request and return the status with the raw body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

pub fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}
