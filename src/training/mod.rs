//! Model training and evaluation
//!
//! - [`split`] - seeded train/test partition
//! - [`xgboost`] - second-order gradient-boosted tree regressor
//! - [`predictor`] - the [`Regressor`] seam and the schema-checked [`TrainedPredictor`]
//! - [`metrics`] - R² and mean absolute error

pub mod metrics;
pub mod predictor;
pub mod split;
pub mod xgboost;

pub use metrics::EvaluationMetrics;
pub use predictor::{Regressor, TrainedPredictor};
pub use split::{
    split_indices, train_test_split, TrainTestSplit, DEFAULT_SEED, DEFAULT_TEST_FRACTION,
};
pub use xgboost::{XGBoostConfig, XGBoostRegressor};
