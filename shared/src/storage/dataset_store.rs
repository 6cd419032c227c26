//! Dataset storage trait and implementations.
//!
//! Provides the `DatasetStore` trait for looking up the record sets lessons
//! and ad-hoc queries run against, and an `InMemoryDatasetStore` that is
//! filled from bundled samples or from a directory of JSON files.

use crate::models::{dataset_from_json, DataSource, Dataset, UnknownDataSource};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during dataset store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on dataset store")]
    LockError,

    /// The requested data source does not exist.
    #[error(transparent)]
    UnknownDataSource(#[from] UnknownDataSource),
}

/// Trait for dataset storage implementations.
///
/// Implementations must be thread-safe (Send + Sync). Datasets are handed
/// out behind an `Arc` and are never mutated in place.
pub trait DatasetStore: Send + Sync {
    /// Returns the dataset for a source. A source with no loaded data yields
    /// an empty dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, source: DataSource) -> Result<Arc<Dataset>, StoreError>;

    /// Replaces the dataset for a source.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn replace(&self, source: DataSource, data: Dataset) -> Result<(), StoreError>;

    /// Looks a dataset up by its source name (`auth_logs`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownDataSource`] if the name is not a known
    /// source.
    fn get_named(&self, name: &str) -> Result<Arc<Dataset>, StoreError> {
        let source: DataSource = name.parse()?;
        self.get(source)
    }
}

/// In-memory dataset store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatasetStore {
    datasets: Arc<RwLock<HashMap<DataSource, Arc<Dataset>>>>,
}

fn bundled_json(source: DataSource) -> &'static str {
    match source {
        DataSource::AuthLogs => include_str!("../../data/auth_logs.json"),
        DataSource::NetworkTraffic => include_str!("../../data/network_traffic.json"),
        DataSource::DnsLogs => include_str!("../../data/dns_logs.json"),
        DataSource::ProcessEvents => include_str!("../../data/process_events.json"),
    }
}

/// Parses a JSON array of objects, logging and returning an empty dataset
/// on failure.
fn parse_or_empty(source: DataSource, origin: &str, text: &str) -> Dataset {
    match serde_json::from_str(text).and_then(dataset_from_json) {
        Ok(data) => data,
        Err(e) => {
            warn!(%source, origin, error = %e, "Malformed dataset, using empty data");
            Dataset::new()
        }
    }
}

impl InMemoryDatasetStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the bundled sample datasets.
    #[must_use]
    pub fn with_samples() -> Self {
        let datasets = DataSource::ALL
            .into_iter()
            .map(|source| {
                let data = parse_or_empty(source, "bundled", bundled_json(source));
                (source, Arc::new(data))
            })
            .collect();
        Self {
            datasets: Arc::new(RwLock::new(datasets)),
        }
    }

    /// Creates a store from `<dir>/<source>.json` files.
    ///
    /// A missing or malformed file is logged and leaves that source empty.
    #[must_use]
    pub fn load_dir(dir: &Path) -> Self {
        let mut datasets = HashMap::new();
        for source in DataSource::ALL {
            let path = dir.join(format!("{}.json", source.name()));
            let data = match std::fs::read_to_string(&path) {
                Ok(text) => parse_or_empty(source, &path.display().to_string(), &text),
                Err(e) => {
                    warn!(%source, path = %path.display(), error = %e, "Dataset file unavailable, using empty data");
                    Dataset::new()
                }
            };
            info!(%source, records = data.len(), "Loaded dataset");
            datasets.insert(source, Arc::new(data));
        }
        Self {
            datasets: Arc::new(RwLock::new(datasets)),
        }
    }

    /// Loads from `dir` when given, otherwise uses the bundled samples.
    #[must_use]
    pub fn from_data_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::load_dir(dir),
            None => Self::with_samples(),
        }
    }

    /// Creates a new store wrapped in an Arc.
    ///
    /// This is useful when sharing the store across multiple handlers.
    #[must_use]
    pub fn new_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl DatasetStore for InMemoryDatasetStore {
    fn get(&self, source: DataSource) -> Result<Arc<Dataset>, StoreError> {
        let datasets = self.datasets.read().map_err(|_| StoreError::LockError)?;
        Ok(datasets.get(&source).cloned().unwrap_or_default())
    }

    fn replace(&self, source: DataSource, data: Dataset) -> Result<(), StoreError> {
        let mut datasets = self.datasets.write().map_err(|_| StoreError::LockError)?;
        datasets.insert(source, Arc::new(data));
        Ok(())
    }
}
