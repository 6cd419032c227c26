//! API route definitions.
//!
//! This module organizes all HTTP routes for the SIEM Query Lab API server.

mod error;
mod health;
mod lessons;
mod query;

pub use error::ErrorBody;
pub use health::health_routes;
pub use lessons::lesson_routes;
pub use query::query_routes;
