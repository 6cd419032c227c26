//! Dialect front-ends that compile query text into a [`Pipeline`].
//!
//! Every front-end is lenient: clauses or commands it cannot understand are
//! skipped (and logged at debug level) rather than rejected. Only two
//! structural problems are errors, a SQL statement that is not a `SELECT` and
//! a Sigma rule without a `detection.selection` block.
//!
//! [`Pipeline`]: super::ast::Pipeline

mod lexer;
pub mod kql;
pub mod sigma;
pub mod spl;
pub mod sql;

use thiserror::Error;

/// Errors that can occur during query parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A SQL statement does not begin with `SELECT`.
    #[error("Query must start with SELECT")]
    MissingSelect,

    /// A Sigma rule has no `detection:` block with a `selection:` inside it.
    #[error("Invalid Sigma rule format: no detection.selection block found")]
    MissingSelection,
}
