//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use shared::lab::{Curriculum, CurriculumError};
use shared::storage::{DatasetStore, InMemoryDatasetStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds the datasets queries run against and the lesson curriculum. Both
/// are read-only after startup, so clones share them freely.
#[derive(Clone)]
pub struct AppState {
    /// The dataset storage backend.
    dataset_store: Arc<dyn DatasetStore>,
    /// The lessons served by the lesson endpoints.
    curriculum: Arc<Curriculum>,
}

impl AppState {
    /// Creates a new application state from its parts.
    pub fn new(dataset_store: Arc<dyn DatasetStore>, curriculum: Arc<Curriculum>) -> Self {
        Self {
            dataset_store,
            curriculum,
        }
    }

    /// Creates the state described by a server configuration: datasets from
    /// `data_dir` when set, bundled samples otherwise, and the bundled
    /// curriculum.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled curriculum is invalid.
    pub fn from_config(config: &Config) -> Result<Self, CurriculumError> {
        let store = InMemoryDatasetStore::from_data_dir(config.data_dir.as_deref());
        Ok(Self::new(store.new_shared(), Arc::new(Curriculum::builtin()?)))
    }

    /// Creates a state with the bundled sample datasets and curriculum.
    ///
    /// This is useful for development and testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled curriculum is invalid.
    pub fn with_samples() -> Result<Self, CurriculumError> {
        Self::from_config(&Config::default())
    }

    /// Returns a reference to the dataset store.
    #[must_use]
    pub fn dataset_store(&self) -> &dyn DatasetStore {
        self.dataset_store.as_ref()
    }

    /// Returns a reference to the curriculum.
    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{dataset_from_json, DataSource, Dialect};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_app_state_with_samples() {
        let state = AppState::with_samples().unwrap();
        assert!(!state.dataset_store().get(DataSource::AuthLogs).unwrap().is_empty());
        assert!(state.curriculum().len(Dialect::Sql) > 0);
    }

    #[test]
    fn test_app_state_from_config_reads_data_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dns_logs.json"), r#"[{"query": "example.com"}]"#).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.dataset_store().get(DataSource::DnsLogs).unwrap().len(), 1);
        assert!(state.dataset_store().get(DataSource::AuthLogs).unwrap().is_empty());
    }

    #[test]
    fn test_app_state_is_clone() {
        let state = AppState::with_samples().unwrap();
        let state2 = state.clone();

        // Both should share the same store
        let data = dataset_from_json(json!([{"host": "ws-01"}])).unwrap();
        state
            .dataset_store()
            .replace(DataSource::ProcessEvents, data)
            .unwrap();

        assert_eq!(
            state2.dataset_store().get(DataSource::ProcessEvents).unwrap().len(),
            1
        );
    }
}
