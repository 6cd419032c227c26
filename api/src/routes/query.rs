//! Ad-hoc query endpoint.
//!
//! Runs a query in any supported dialect against a named data source or an
//! inline dataset.

use super::error::{dialect_rejection, query_rejection, store_rejection, validation_rejection, ApiError};
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use shared::models::{DataSource, Dataset, Dialect, Record};
use shared::query::{run_query, Pipeline};
use validator::Validate;

/// Data source used when a request names neither a source nor a dataset.
const DEFAULT_SOURCE: DataSource = DataSource::AuthLogs;

/// Request body for query execution.
#[derive(Debug, Deserialize, Validate)]
pub struct QueryRequest {
    /// The query text.
    #[validate(length(min = 1, message = "query must not be empty"))]
    pub query: String,

    /// Dialect tag: `sql`, `spl`, `kql` or `sigma`.
    pub dialect: String,

    /// Named data source to query.
    #[serde(default)]
    pub data_source: Option<String>,

    /// Inline records to query instead of a named source.
    #[serde(default)]
    pub dataset: Option<Dataset>,
}

/// Response for successful query execution.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The transformed records.
    pub results: Dataset,

    /// Number of records returned.
    pub returned_count: usize,

    /// Column names of the first record.
    pub columns: Vec<String>,

    /// The compiled pipeline (for transparency).
    pub pipeline: Pipeline,
}

/// Creates the query routes with application state.
pub fn query_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/query", post(execute_query))
        .with_state(state)
}

/// Handler for query execution.
///
/// An inline `dataset` wins over `data_source`; with neither, the query runs
/// against `auth_logs`.
async fn execute_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    request.validate().map_err(validation_rejection)?;

    let dialect: Dialect = request.dialect.parse().map_err(|e| {
        tracing::debug!(dialect = %request.dialect, "Unsupported dialect");
        dialect_rejection(e)
    })?;

    let stored;
    let data: &[Record] = if let Some(dataset) = request.dataset.as_deref() {
        dataset
    } else {
        let name = request.data_source.as_deref().unwrap_or(DEFAULT_SOURCE.name());
        stored = state.dataset_store().get_named(name).map_err(store_rejection)?;
        &stored
    };

    let result = run_query(&request.query, data, dialect).map_err(|e| {
        tracing::debug!(query = %request.query, %dialect, error = %e, "Failed to compile query");
        query_rejection(e)
    })?;

    tracing::debug!(
        %dialect,
        returned = result.returned_count(),
        "Query executed successfully"
    );

    Ok(Json(QueryResponse {
        returned_count: result.returned_count(),
        columns: result.columns(),
        pipeline: result.pipeline,
        results: result.results,
    }))
}
