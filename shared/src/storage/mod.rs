//! Storage traits and implementations.
//!
//! This module provides the abstraction queries read their input from. The
//! `DatasetStore` trait defines the interface, allowing different
//! implementations (bundled samples, a data directory, tests).

pub mod dataset_store;

pub use dataset_store::{DatasetStore, InMemoryDatasetStore, StoreError};
