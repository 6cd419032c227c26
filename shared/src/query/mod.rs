//! Multi-dialect query engine.
//!
//! Query text in one of four dialects is compiled by a front-end in
//! [`parser`] into a [`Pipeline`] of relational operations, which is then
//! applied to a borrowed dataset.
//!
//! # Supported Dialects
//!
//! ```text
//! SQL    SELECT username, COUNT(*) FROM auth_logs GROUP BY username
//! SPL    search action=failed_login | stats count by username | sort -count
//! KQL    auth_logs | where bytes > 1000 | project src_ip, bytes | take 10
//! Sigma  detection: / selection: / field|startswith: value
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shared::models::dataset_from_json;
//! use shared::query::execute_tagged;
//!
//! let data = dataset_from_json(json!([
//!     {"user": "a", "action": "failed_login"},
//!     {"user": "b", "action": "failed_login"},
//!     {"user": "a", "action": "failed_login"},
//! ]))
//! .unwrap();
//!
//! let results = execute_tagged(
//!     "search action=failed_login | stats count by user | sort -count | head 1",
//!     &data,
//!     "spl",
//! )
//! .unwrap();
//! assert_eq!(results[0]["user"], json!("a"));
//! assert_eq!(results[0]["count"], json!(2));
//! ```

mod ast;
mod condition;
mod executor;
mod operators;
pub mod parser;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use condition::like_match;
pub use executor::{compile, execute, execute_tagged, run_query, QueryError, QueryResult};
pub use operators::{apply_limit, compare_values, filter, group_aggregate, project, sort};
pub use parser::ParseError;
