//! SIEM Query Lab Shared Library
//!
//! This crate contains the query engine and lab logic used by the API server
//! and the command-line practice tool.
//!
//! # Modules
//!
//! - [`models`] - Records, dialects and data sources
//! - [`query`] - Dialect front-ends and the relational operators they compile to
//! - [`storage`] - Dataset storage traits and implementations
//! - [`lab`] - Curriculum, result checks and learner sessions
//!
//! # Example
//!
//! ```
//! use shared::models::{DataSource, Dialect};
//! use shared::query::execute;
//! use shared::storage::{DatasetStore, InMemoryDatasetStore};
//!
//! let store = InMemoryDatasetStore::with_samples();
//! let auth_logs = store.get(DataSource::AuthLogs).unwrap();
//!
//! let results = execute(
//!     "auth_logs | where action == 'failed_login' | summarize count() by username | where count > 2",
//!     &auth_logs,
//!     Dialect::Kql,
//! )
//! .unwrap();
//! assert!(!results.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod lab;
pub mod models;
pub mod query;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
