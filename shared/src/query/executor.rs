//! Query execution engine.
//!
//! Dispatches query text to the front-end for its dialect and runs the
//! compiled pipeline over a borrowed dataset.

use super::ast::Pipeline;
use super::parser::{kql, sigma, spl, sql, ParseError};
use crate::models::{Dataset, Dialect, Record, UnsupportedDialect};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while executing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The dialect tag is not one of `sql`, `spl`, `kql`, `sigma`.
    #[error(transparent)]
    UnsupportedDialect(#[from] UnsupportedDialect),

    /// The query text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The output of one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// The compiled pipeline.
    pub pipeline: Pipeline,
    /// The transformed records.
    pub results: Dataset,
}

impl QueryResult {
    /// Number of records returned.
    #[must_use]
    pub fn returned_count(&self) -> usize {
        self.results.len()
    }

    /// Column names, taken from the first record.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.results
            .first()
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Compiles query text in the given dialect to a pipeline.
///
/// # Errors
///
/// Returns [`ParseError::MissingSelect`] for a SQL statement that is not a
/// `SELECT`, and [`ParseError::MissingSelection`] for a Sigma rule without a
/// selection. SPL and KQL never fail.
///
/// # Example
///
/// ```
/// use shared::models::Dialect;
/// use shared::query::compile;
///
/// let pipeline = compile("search user=root | head 1", Dialect::Spl).unwrap();
/// assert_eq!(pipeline.to_string(), "FILTER user CONTAINS 'root' | LIMIT 1");
/// ```
pub fn compile(query: &str, dialect: Dialect) -> Result<Pipeline, ParseError> {
    match dialect {
        Dialect::Sql => sql::compile(query),
        Dialect::Spl => spl::compile(query),
        Dialect::Kql => kql::compile(query),
        Dialect::Sigma => sigma::compile(query),
    }
}

/// Compiles and runs a query, keeping the pipeline alongside the results.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] if the query cannot be compiled.
pub fn run_query(query: &str, data: &[Record], dialect: Dialect) -> Result<QueryResult, QueryError> {
    let pipeline = compile(query, dialect)?;
    let results = pipeline.apply(data);

    tracing::debug!(
        %dialect,
        input_rows = data.len(),
        output_rows = results.len(),
        operations = pipeline.len(),
        pipeline = %pipeline,
        "Executed query"
    );

    Ok(QueryResult { pipeline, results })
}

/// Runs a query over a dataset. The input is never modified.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] if the query cannot be compiled.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use shared::models::{dataset_from_json, Dialect};
/// use shared::query::execute;
///
/// let data = dataset_from_json(json!([
///     {"user": "root", "action": "failed_login"},
///     {"user": "alice", "action": "successful_login"}
/// ]))
/// .unwrap();
///
/// let results = execute("SELECT user WHERE action = 'failed_login'", &data, Dialect::Sql).unwrap();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0]["user"], json!("root"));
/// ```
pub fn execute(query: &str, data: &[Record], dialect: Dialect) -> Result<Dataset, QueryError> {
    run_query(query, data, dialect).map(|result| result.results)
}

/// Runs a query given the dialect as a string tag (`"sql"`, `"SPL"`, ...).
///
/// # Errors
///
/// Returns [`QueryError::UnsupportedDialect`] for an unknown tag, or
/// [`QueryError::Parse`] if the query cannot be compiled.
pub fn execute_tagged(query: &str, data: &[Record], tag: &str) -> Result<Dataset, QueryError> {
    let dialect: Dialect = tag.parse()?;
    execute(query, data, dialect)
}
