//! Held-out evaluation metrics

use crate::error::{CalorieError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Goodness of fit and average absolute error over held-out predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Coefficient of determination, at most 1.0
    pub r2: f64,
    /// Mean absolute error, in target units (kcal)
    pub mae: f64,
}

impl EvaluationMetrics {
    /// Compute R² and MAE between actual and predicted values.
    ///
    /// With a constant `y_true` R² is 1.0 for an exact fit and 0.0 otherwise.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.is_empty() {
            return Err(CalorieError::Model(
                "cannot evaluate on an empty test split".to_string(),
            ));
        }
        if y_true.len() != y_pred.len() {
            return Err(CalorieError::Model(format!(
                "{} predictions for {} targets",
                y_pred.len(),
                y_true.len()
            )));
        }

        let n = y_true.len() as f64;
        let errors: Array1<f64> = y_true - y_pred;

        let mae = errors.mapv(f64::abs).sum() / n;

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        if !r2.is_finite() || !mae.is_finite() {
            return Err(CalorieError::Model(
                "metrics are not finite; predictions or targets contain NaN".to_string(),
            ));
        }

        Ok(Self { r2, mae })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = EvaluationMetrics::compute(&y_true, &y_pred).unwrap();
        assert!(metrics.r2 > 0.9);
        assert!(metrics.r2 <= 1.0);
        assert!((metrics.mae - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_fit() {
        let y = array![3.0, 1.0, 2.0];
        let metrics = EvaluationMetrics::compute(&y, &y).unwrap();
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.mae, 0.0);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![5.0, 5.0];
        let exact = EvaluationMetrics::compute(&y_true, &array![5.0, 5.0]).unwrap();
        assert_eq!(exact.r2, 1.0);

        let off = EvaluationMetrics::compute(&y_true, &array![4.0, 6.0]).unwrap();
        assert_eq!(off.r2, 0.0);
        assert_eq!(off.mae, 1.0);
    }

    #[test]
    fn test_single_record() {
        let metrics = EvaluationMetrics::compute(&array![10.0], &array![12.5]).unwrap();
        assert!(metrics.r2 <= 1.0);
        assert_eq!(metrics.mae, 2.5);
    }

    #[test]
    fn test_worse_than_mean_is_negative() {
        let metrics =
            EvaluationMetrics::compute(&array![1.0, 2.0, 3.0], &array![3.0, 2.0, 1.0]).unwrap();
        assert!(metrics.r2 < 0.0);
    }

    #[test]
    fn test_empty_and_mismatched() {
        let empty = Array1::<f64>::zeros(0);
        assert!(EvaluationMetrics::compute(&empty, &empty).is_err());
        assert!(EvaluationMetrics::compute(&array![1.0, 2.0], &array![1.0]).is_err());
    }
}
