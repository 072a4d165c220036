//! End-to-end pipeline: load → prepare → split → train → evaluate

use crate::config::AppConfig;
use crate::data::{DataCache, Dataset, ExerciseInput, FeatureRecord};
use crate::error::Result;
use crate::training::{
    train_test_split, EvaluationMetrics, Regressor, TrainTestSplit, TrainedPredictor,
    XGBoostRegressor,
};
use std::sync::Arc;
use tracing::info;

/// Everything a run computes once and its consumers read afterwards
#[derive(Debug)]
pub struct PipelineContext<R = XGBoostRegressor> {
    pub dataset: Arc<Dataset>,
    pub split: TrainTestSplit,
    pub predictor: TrainedPredictor<R>,
    /// Held-out metrics, computed once at build time
    pub metrics: EvaluationMetrics,
}

impl PipelineContext<XGBoostRegressor> {
    /// Build the context with the configured XGBoost regressor
    pub fn build(config: &AppConfig, cache: &DataCache) -> Result<Self> {
        config.validate()?;
        Self::build_with(config, cache, XGBoostRegressor::new(config.model.clone()))
    }
}

impl<R: Regressor> PipelineContext<R> {
    /// Build the context around any regressor
    pub fn build_with(config: &AppConfig, cache: &DataCache, regressor: R) -> Result<Self> {
        let dataset = cache.get_or_load(&config.data)?;
        Self::from_dataset(dataset, config, regressor)
    }

    /// Split, train and evaluate on an already prepared dataset
    pub fn from_dataset(dataset: Arc<Dataset>, config: &AppConfig, regressor: R) -> Result<Self> {
        let split = train_test_split(
            dataset.features(),
            dataset.target(),
            config.split.test_fraction,
            config.split.seed,
        )?;
        info!(
            train = split.train_indices.len(),
            test = split.test_indices.len(),
            "Prepared train/test split"
        );

        let predictor = TrainedPredictor::train(&split.x_train, &split.y_train, regressor)?;
        let metrics = predictor.evaluate(&split.x_test, &split.y_test)?;

        Ok(Self {
            dataset,
            split,
            predictor,
            metrics,
        })
    }

    /// Estimate calories for one form submission
    pub fn predict_input(&self, input: &ExerciseInput) -> Result<f64> {
        self.predict_record(&input.to_record()?)
    }

    pub fn predict_record(&self, record: &FeatureRecord) -> Result<f64> {
        self.predictor.predict_one(record)
    }
}
