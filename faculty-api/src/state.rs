//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use faculty_storage::TeacherLookup;

use crate::constants::DEFAULT_REQUEST_TIMEOUT;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Read-through lookup over the shared cache and store handles.
    pub lookup: Arc<TeacherLookup>,
    /// Budget handed to every lookup.
    pub request_timeout: Duration,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(lookup: Arc<TeacherLookup>, request_timeout: Duration) -> Self {
        Self {
            lookup,
            request_timeout,
            start_time: Instant::now(),
        }
    }

    /// State with the default request budget.
    pub fn with_lookup(lookup: Arc<TeacherLookup>) -> Self {
        Self::new(lookup, DEFAULT_REQUEST_TIMEOUT)
    }
}

crate::impl_from_ref!(Arc<TeacherLookup>, lookup);
crate::impl_from_ref!(Instant, start_time);
