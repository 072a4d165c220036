//! CSV loading and per-process memoization of prepared datasets

use crate::config::DataSources;
use crate::error::{CalorieError, Result};
use parking_lot::Mutex;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::dataset::Dataset;
use super::prepare::prepare;

/// CSV loader for the two source tables
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Load a comma-separated file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| CalorieError::DataLoad(format!("{}: {}", path.display(), e)))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| CalorieError::DataLoad(format!("{}: {}", path.display(), e)))
    }

    /// Read both sources and run the preparation steps
    pub fn load_and_prepare(&self, sources: &DataSources) -> Result<Dataset> {
        let exercise = self.load_csv(&sources.exercise)?;
        let calories = self.load_csv(&sources.calories)?;
        info!(
            exercise = %sources.exercise.display(),
            calories = %sources.calories.display(),
            rows = exercise.height(),
            "Loaded source tables"
        );
        prepare(&exercise, &calories)
    }
}

/// Load and prepare `sources` with the default loader
pub fn load_and_prepare(sources: &DataSources) -> Result<Dataset> {
    DataLoader::new().load_and_prepare(sources)
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<DataSources, Arc<Dataset>>,
    hits: u64,
    misses: u64,
}

/// Memoizes prepared datasets by source paths for the life of the process.
///
/// Entries are never invalidated; the sources are static files.
pub struct DataCache {
    loader: DataLoader,
    state: Mutex<CacheState>,
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(DataLoader::new())
    }
}

impl DataCache {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Return the prepared dataset for `sources`, loading it on first use
    pub fn get_or_load(&self, sources: &DataSources) -> Result<Arc<Dataset>> {
        {
            let mut state = self.state.lock();
            if let Some(dataset) = state.entries.get(sources).cloned() {
                state.hits += 1;
                debug!(exercise = %sources.exercise.display(), "Dataset cache hit");
                return Ok(dataset);
            }
            state.misses += 1;
        }

        let dataset = Arc::new(self.loader.load_and_prepare(sources)?);
        self.state
            .lock()
            .entries
            .insert(sources.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
        }
    }
}
