//! Error bodies shared by the API routes.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::lab::CurriculumError;
use shared::models::UnsupportedDialect;
use shared::query::QueryError;
use shared::storage::StoreError;
use validator::ValidationErrors;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// Rejection returned by handlers.
pub type ApiError = (StatusCode, Json<ErrorBody>);

impl ErrorBody {
    fn new(error: &str, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<QueryError> for ErrorBody {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::UnsupportedDialect(e) => Self::from(e),
            QueryError::Parse(e) => Self::new("parse_error", e),
        }
    }
}

impl From<UnsupportedDialect> for ErrorBody {
    fn from(e: UnsupportedDialect) -> Self {
        Self::new("unsupported_dialect", e)
    }
}

impl From<StoreError> for ErrorBody {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownDataSource(e) => Self::new("unknown_data_source", e),
            StoreError::LockError => Self::new("storage_error", e),
        }
    }
}

impl From<CurriculumError> for ErrorBody {
    fn from(e: CurriculumError) -> Self {
        match e {
            CurriculumError::UnknownLesson { .. } => Self::new("unknown_lesson", e),
            CurriculumError::NoExercise { .. } => Self::new("no_exercise", e),
            CurriculumError::Json(_) | CurriculumError::Incomplete { .. } => {
                Self::new("curriculum_error", e)
            }
        }
    }
}

impl From<ValidationErrors> for ErrorBody {
    fn from(e: ValidationErrors) -> Self {
        Self::new("validation_error", e)
    }
}

/// Maps a query failure to its status code.
pub fn query_rejection(e: QueryError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(e.into()))
}

/// Maps a store failure to its status code.
pub fn store_rejection(e: StoreError) -> ApiError {
    let status = match &e {
        StoreError::UnknownDataSource(_) => StatusCode::NOT_FOUND,
        StoreError::LockError => {
            tracing::error!(error = %e, "Dataset store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(e.into()))
}

/// Maps a curriculum lookup failure to its status code.
pub fn curriculum_rejection(e: CurriculumError) -> ApiError {
    let status = match &e {
        CurriculumError::UnknownLesson { .. } => StatusCode::NOT_FOUND,
        CurriculumError::NoExercise { .. } => StatusCode::BAD_REQUEST,
        CurriculumError::Json(_) | CurriculumError::Incomplete { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(e.into()))
}

/// Rejects a request body that failed validation.
pub fn validation_rejection(e: ValidationErrors) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(e.into()))
}

/// Rejects an unknown dialect tag.
pub fn dialect_rejection(e: UnsupportedDialect) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(e.into()))
}
