//! Lesson endpoints.
//!
//! Lists and serves curriculum lessons, and grades attempts. Grading is
//! stateless: callers keep their own progress.

use super::error::{
    curriculum_rejection, dialect_rejection, query_rejection, store_rejection, validation_rejection,
    ApiError,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::lab::{Lesson, LessonKind};
use shared::models::{DataSource, Dataset, Dialect};
use shared::query::run_query;
use validator::Validate;

/// One entry of a lesson listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonSummary {
    /// Zero-based lesson index.
    pub index: usize,
    /// Lesson kind.
    pub kind: LessonKind,
    /// Lesson title.
    pub title: String,
    /// Dataset an exercise runs against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
}

/// Response for a lesson listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct LessonListResponse {
    /// The dialect listed.
    pub dialect: Dialect,
    /// Lessons in order.
    pub lessons: Vec<LessonSummary>,
}

/// Response for a single lesson.
#[derive(Debug, Serialize)]
pub struct LessonDetailResponse {
    /// The lesson's dialect.
    pub dialect: Dialect,
    /// Zero-based lesson index.
    pub index: usize,
    /// Number of lessons in the dialect.
    pub total: usize,
    /// The lesson content.
    #[serde(flatten)]
    pub lesson: Lesson,
}

/// Request body for an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct AttemptRequest {
    /// Query text in the lesson's dialect.
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,
}

/// Graded attempt.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptResponse {
    /// The results satisfied the lesson's check.
    pub passed: bool,
    /// Number of records returned.
    pub returned_count: usize,
    /// The transformed records.
    pub results: Dataset,
}

/// Creates the lesson routes with application state.
pub fn lesson_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/lessons/{dialect}", get(list_lessons))
        .route("/api/v1/lessons/{dialect}/{index}", get(get_lesson))
        .route(
            "/api/v1/lessons/{dialect}/{index}/attempts",
            post(attempt_lesson),
        )
        .with_state(state)
}

fn parse_dialect(tag: &str) -> Result<Dialect, ApiError> {
    tag.parse().map_err(dialect_rejection)
}

async fn list_lessons(
    State(state): State<AppState>,
    Path(dialect): Path<String>,
) -> Result<Json<LessonListResponse>, ApiError> {
    let dialect = parse_dialect(&dialect)?;
    let lessons = state
        .curriculum()
        .lessons(dialect)
        .iter()
        .enumerate()
        .map(|(index, lesson)| LessonSummary {
            index,
            kind: lesson.kind,
            title: lesson.title.clone(),
            data_source: lesson.data_source,
        })
        .collect();

    Ok(Json(LessonListResponse { dialect, lessons }))
}

async fn get_lesson(
    State(state): State<AppState>,
    Path((dialect, index)): Path<(String, usize)>,
) -> Result<Json<LessonDetailResponse>, ApiError> {
    let dialect = parse_dialect(&dialect)?;
    let curriculum = state.curriculum();
    let lesson = curriculum
        .lesson(dialect, index)
        .map_err(curriculum_rejection)?;

    Ok(Json(LessonDetailResponse {
        dialect,
        index,
        total: curriculum.len(dialect),
        lesson: lesson.clone(),
    }))
}

/// Runs the query against the lesson's data source and applies its check.
async fn attempt_lesson(
    State(state): State<AppState>,
    Path((dialect, index)): Path<(String, usize)>,
    Json(request): Json<AttemptRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    request.validate().map_err(validation_rejection)?;
    let dialect = parse_dialect(&dialect)?;

    let exercise = state
        .curriculum()
        .exercise(dialect, index)
        .map_err(curriculum_rejection)?;
    let data = state
        .dataset_store()
        .get(exercise.data_source)
        .map_err(store_rejection)?;

    let result = run_query(&request.query, &data, dialect).map_err(query_rejection)?;
    let passed = exercise.check.evaluate(&result.results);

    tracing::debug!(%dialect, index, passed, "Graded lesson attempt");

    Ok(Json(AttemptResponse {
        passed,
        returned_count: result.returned_count(),
        results: result.results,
    }))
}
