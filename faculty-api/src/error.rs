//! Error Types for the faculty API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct carrying a code and a human-readable message
//! - ErrorCode enum mapping each error category to a status code
//! - IntoResponse implementation producing the legacy error body
//! - Conversions from the lookup, store and validation errors
//!
//! Every error is rendered as `{"message:": <detail>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faculty_core::{KeyError, LookupError, StoreError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ERROR_BODY_KEY, NON_POSITIVE_ID_MESSAGE};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Client Errors (400)
    // ========================================================================
    /// Lesson id is zero or negative
    InvalidKey,

    /// Request body is not valid JSON for the endpoint
    InvalidInput,

    /// Required field is missing or blank
    MissingField,

    /// Field value is out of its valid range
    InvalidRange,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Requested lesson does not exist. Kept apart from `DatabaseError` in
    /// logs; clients see the same status for both.
    LessonNotFound,

    /// Lesson id is not an integer. Reported as a server error for
    /// compatibility with existing clients.
    MalformedKey,

    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Database did not answer in time
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidKey
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,

            ErrorCode::LessonNotFound
            | ErrorCode::MalformedKey
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidKey => NON_POSITIVE_ID_MESSAGE,
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",
            ErrorCode::LessonNotFound => "Lesson not found",
            ErrorCode::MalformedKey => "id is not an integer",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// The JSON body sent to the client.
    pub fn body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::with_capacity(1);
        body.insert(
            ERROR_BODY_KEY.to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        serde_json::Value::Object(body)
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(field: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("Field '{}' is out of range: {}", field, reason),
        )
    }

    /// Create a LessonNotFound error.
    pub fn lesson_not_found(lesson_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::LessonNotFound,
            format!("Lesson {} not found", lesson_id),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a DatabaseError.
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create a Timeout error.
    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation '{}' timed out", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::NotPositive { .. } => ApiError::from_code(ErrorCode::InvalidKey),
            KeyError::NotNumeric { .. } => ApiError::new(ErrorCode::MalformedKey, err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { lesson_id } => ApiError::lesson_not_found(lesson_id),
            StoreError::Timeout { .. } => ApiError::new(ErrorCode::Timeout, err.to_string()),
            StoreError::Unavailable { .. } | StoreError::QueryFailed { .. } => {
                ApiError::database_error(err.to_string())
            }
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidKey(key) => key.into(),
            LookupError::NotFound { lesson_id } => ApiError::lesson_not_found(lesson_id),
            LookupError::Upstream(store) => store.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::invalid_range(&field, reason)
            }
        }
    }
}

/// Malformed or mistyped JSON bodies are client errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use faculty_core::LessonId;
    use std::time::Duration;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidKey.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::LessonNotFound.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::MalformedKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DatabaseError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::Timeout.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_keeps_legacy_key() {
        let err = ApiError::from_code(ErrorCode::InvalidKey);
        assert_eq!(
            serde_json::to_string(&err.body()).unwrap(),
            r#"{"message:":"id cannot be negative"}"#
        );
    }

    #[test]
    fn test_key_error_mapping() {
        let err: ApiError = KeyError::NotPositive { value: 0 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = KeyError::NotNumeric {
            raw: "abc".to_string(),
            reason: "invalid digit found in string".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("abc"));
    }

    #[test]
    fn test_lookup_error_mapping() {
        let lesson_id = LessonId::new(9).unwrap();

        let err: ApiError = LookupError::NotFound { lesson_id }.into();
        assert_eq!(err.code, ErrorCode::LessonNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains('9'));

        let err: ApiError = LookupError::Upstream(StoreError::Unavailable {
            reason: "connection refused".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("connection refused"));

        let err: ApiError = LookupError::Upstream(StoreError::Timeout {
            after: Duration::from_secs(5),
        })
        .into();
        assert_eq!(err.code, ErrorCode::Timeout);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_mapping() {
        let err: ApiError = ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("name"));

        let err: ApiError = ValidationError::InvalidValue {
            field: "teacher_id".to_string(),
            reason: "id must be a positive integer, got 0".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::database_error("Connection failed");
        let display = format!("{}", err);

        assert!(display.contains("DatabaseError"));
        assert!(display.contains("Connection failed"));
    }
}
