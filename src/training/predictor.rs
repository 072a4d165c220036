//! Trained predictor: a fitted regressor bound to its feature schema

use crate::data::{FeatureMatrix, FeatureRecord};
use crate::error::{CalorieError, Result};
use ndarray::{Array1, Array2, Axis};
use std::time::Instant;
use tracing::info;

use super::metrics::EvaluationMetrics;

/// Black-box regression capability: fit on a matrix, predict one value per row
pub trait Regressor: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict one value per row of `x`, in row order
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// A regressor fitted on a training split, read-only after construction
#[derive(Debug, Clone)]
pub struct TrainedPredictor<R> {
    model: R,
    feature_columns: Vec<String>,
    n_train: usize,
}

impl<R: Regressor> TrainedPredictor<R> {
    /// Fit `model` on the training split.
    ///
    /// Non-finite values in X or Y are a [`CalorieError::Model`].
    pub fn train(x_train: &FeatureMatrix, y_train: &Array1<f64>, mut model: R) -> Result<Self> {
        if x_train.is_empty() {
            return Err(CalorieError::Model("training split is empty".to_string()));
        }
        if x_train.nrows() != y_train.len() {
            return Err(CalorieError::Model(format!(
                "{} target values for {} training rows",
                y_train.len(),
                x_train.nrows()
            )));
        }
        ensure_finite(x_train.values(), x_train.columns())?;
        if let Some(row) = y_train.iter().position(|v| !v.is_finite()) {
            return Err(CalorieError::Model(format!(
                "non-finite target value at training row {row}"
            )));
        }

        let start = Instant::now();
        model.fit(x_train.values(), y_train)?;
        info!(
            rows = x_train.nrows(),
            features = x_train.ncols(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Trained predictor"
        );

        Ok(Self {
            model,
            feature_columns: x_train.columns().to_vec(),
            n_train: x_train.nrows(),
        })
    }

    /// Feature columns, in the order the model was trained on
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn n_train(&self) -> usize {
        self.n_train
    }

    pub fn model(&self) -> &R {
        &self.model
    }

    /// One estimate per row of `features`, in input order.
    ///
    /// Column names and order must match the training features exactly.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        if features.columns() != self.feature_columns.as_slice() {
            return Err(CalorieError::SchemaMismatch {
                expected: self.feature_columns.join(", "),
                actual: features.columns().join(", "),
            });
        }
        self.predict_values(features.values())
    }

    /// Estimate for a single record, reordered into training column order
    pub fn predict_one(&self, record: &FeatureRecord) -> Result<f64> {
        let row = record.align(&self.feature_columns)?;
        let matrix = row.insert_axis(Axis(0));
        let predictions = self.predict_values(&matrix)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| CalorieError::Model("regressor returned no prediction".to_string()))
    }

    /// R² and MAE of predictions on a held-out split
    pub fn evaluate(
        &self,
        x_test: &FeatureMatrix,
        y_test: &Array1<f64>,
    ) -> Result<EvaluationMetrics> {
        let predictions = Array1::from_vec(self.predict(x_test)?);
        let metrics = EvaluationMetrics::compute(y_test, &predictions)?;
        info!(rows = y_test.len(), r2 = metrics.r2, mae = metrics.mae, "Evaluated on test split");
        Ok(metrics)
    }

    fn predict_values(&self, values: &Array2<f64>) -> Result<Vec<f64>> {
        ensure_finite(values, &self.feature_columns)?;
        let predictions = self.model.predict(values)?;
        if predictions.len() != values.nrows() {
            return Err(CalorieError::Model(format!(
                "regressor returned {} predictions for {} rows",
                predictions.len(),
                values.nrows()
            )));
        }
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(CalorieError::Model("regressor produced a non-finite estimate".to_string()));
        }
        Ok(predictions.to_vec())
    }
}

fn ensure_finite(values: &Array2<f64>, columns: &[String]) -> Result<()> {
    for ((row, col), v) in values.indexed_iter() {
        if !v.is_finite() {
            let name = columns.get(col).map(String::as_str).unwrap_or("?");
            return Err(CalorieError::Model(format!(
                "non-finite value {v} in column {name} at row {row}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Predicts the training mean for every row
    #[derive(Default)]
    struct MeanRegressor {
        mean: f64,
    }

    impl Regressor for MeanRegressor {
        fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
            self.mean = y.mean().unwrap_or(0.0);
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.nrows(), self.mean))
        }
    }

    fn columns() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    fn training() -> (FeatureMatrix, Array1<f64>) {
        let x = FeatureMatrix::new(columns(), array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        (x, array![1.0, 2.0, 3.0])
    }

    #[test]
    fn test_any_regressor_is_substitutable() {
        let (x, y) = training();
        let predictor = TrainedPredictor::train(&x, &y, MeanRegressor::default()).unwrap();
        assert_eq!(predictor.predict(&x).unwrap(), vec![2.0, 2.0, 2.0]);
        assert_eq!(predictor.n_train(), 3);
    }

    #[test]
    fn test_predict_rejects_reordered_columns() {
        let (x, y) = training();
        let predictor = TrainedPredictor::train(&x, &y, MeanRegressor::default()).unwrap();
        let swapped = FeatureMatrix::new(vec!["b".into(), "a".into()], array![[2.0, 1.0]]).unwrap();
        assert!(matches!(
            predictor.predict(&swapped),
            Err(CalorieError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_predict_one_aligns_record() {
        let (x, y) = training();
        let predictor = TrainedPredictor::train(&x, &y, MeanRegressor::default()).unwrap();
        let record = FeatureRecord::new().with("b", 4.0).with("a", 3.0);
        assert_eq!(predictor.predict_one(&record).unwrap(), 2.0);

        let wrong = FeatureRecord::new().with("a", 3.0).with("z", 4.0);
        assert!(matches!(
            predictor.predict_one(&wrong),
            Err(CalorieError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_nan_is_model_error() {
        let (_, y) = training();
        let values = array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0]];
        let x = FeatureMatrix::new(columns(), values).unwrap();
        assert!(matches!(
            TrainedPredictor::train(&x, &y, MeanRegressor::default()),
            Err(CalorieError::Model(_))
        ));

        let (x, y) = training();
        let predictor = TrainedPredictor::train(&x, &y, MeanRegressor::default()).unwrap();
        let record = FeatureRecord::new().with("a", f64::INFINITY).with("b", 1.0);
        assert!(matches!(predictor.predict_one(&record), Err(CalorieError::Model(_))));
    }

    #[test]
    fn test_evaluate_mean_model() {
        let (x, y) = training();
        let predictor = TrainedPredictor::train(&x, &y, MeanRegressor::default()).unwrap();
        let metrics = predictor.evaluate(&x, &y).unwrap();
        assert_eq!(metrics.r2, 0.0);
        assert!((metrics.mae - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_training_split() {
        let x = FeatureMatrix::new(columns(), Array2::zeros((0, 2))).unwrap();
        let y = Array1::zeros(0);
        assert!(TrainedPredictor::train(&x, &y, MeanRegressor::default()).is_err());
    }
}
