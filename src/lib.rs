//! Calorie Burn - calorie expenditure prediction from exercise data
//!
//! Two row-aligned tables (exercise sessions and the calories burned in
//! each) are merged, encoded and used to fit a gradient-boosted tree
//! regressor that answers single-session estimates.
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Loading, merging, Gender encoding and the feature/target views
//! - [`training`] - Train/test split, XGBoost regressor, prediction and metrics
//! - [`pipeline`] - The load → split → train → evaluate run
//!
//! ## Supporting
//! - [`config`] - Data sources, split and model parameters
//! - [`stats`] - Descriptive statistics and histograms for the data report
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;
pub mod training;

// Services
pub mod cli;

pub use error::{CalorieError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CalorieError, Result};

    // Configuration
    pub use crate::config::{AppConfig, DataSources, SplitConfig};

    // Data
    pub use crate::data::{DataCache, Dataset, ExerciseInput, FeatureMatrix, FeatureRecord, Gender};

    // Training
    pub use crate::training::{
        EvaluationMetrics, Regressor, TrainedPredictor, XGBoostConfig, XGBoostRegressor,
    };

    // Pipeline
    pub use crate::pipeline::PipelineContext;
}
