//! Data models for SIEM Query Lab.
//!
//! This module contains the record representation every dialect consumes and
//! produces, plus the dialect and data source identifiers.

pub mod dialect;
pub mod record;

pub use dialect::{DataSource, Dialect, UnknownDataSource, UnsupportedDialect};
pub use record::{coerce_number, dataset_from_json, field, number_value, text, Dataset, Record};
