//! Seeded train/test split

use crate::data::FeatureMatrix;
use crate::error::{CalorieError, Result};
use ndarray::{Array1, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Default held-out fraction
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Default shuffle seed
pub const DEFAULT_SEED: u64 = 2;

/// A single train/test partition of (X, Y)
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Shuffled row indices for a split of `n_samples` rows.
///
/// The first `ceil(n_samples * test_fraction)` shuffled indices form the test
/// side; both sides must be non-empty.
pub fn split_indices(
    n_samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CalorieError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(CalorieError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: format!("leaves an empty side when splitting {n_samples} rows"),
        });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Partition X and Y into train and test sides, keeping rows paired
pub fn train_test_split(
    x: &FeatureMatrix,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if x.nrows() != y.len() {
        return Err(CalorieError::InvalidParameter {
            name: "y".to_string(),
            value: y.len().to_string(),
            reason: format!("must have one value per feature row ({})", x.nrows()),
        });
    }

    let (train_indices, test_indices) = split_indices(x.nrows(), test_fraction, seed)?;
    debug!(
        train = train_indices.len(),
        test = test_indices.len(),
        seed,
        "Split dataset"
    );

    Ok(TrainTestSplit {
        x_train: x.select_rows(&train_indices),
        x_test: x.select_rows(&test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::collections::HashSet;

    fn matrix(n: usize) -> (FeatureMatrix, Array1<f64>) {
        let values = Array2::from_shape_fn((n, 2), |(r, c)| (r * 10 + c) as f64);
        let x = FeatureMatrix::new(vec!["a".into(), "b".into()], values).unwrap();
        let y = Array1::from_iter((0..n).map(|r| r as f64));
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = split_indices(10, 0.2, DEFAULT_SEED).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        // ceil(0.2 * 11) = 3
        let (train, test) = split_indices(11, 0.2, DEFAULT_SEED).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = split_indices(100, 0.2, 2).unwrap();
        let b = split_indices(100, 0.2, 2).unwrap();
        assert_eq!(a, b);

        let c = split_indices(100, 0.2, 3).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_is_a_partition() {
        let (train, test) = split_indices(57, 0.2, 2).unwrap();
        let train_set: HashSet<usize> = train.iter().copied().collect();
        let test_set: HashSet<usize> = test.iter().copied().collect();

        assert!(train_set.is_disjoint(&test_set));
        let union: HashSet<usize> = train_set.union(&test_set).copied().collect();
        assert_eq!(union, (0..57).collect::<HashSet<_>>());
    }

    #[test]
    fn test_rows_stay_paired() {
        let (x, y) = matrix(20);
        let split = train_test_split(&x, &y, 0.25, 9).unwrap();
        for (row, &idx) in split.test_indices.iter().enumerate() {
            assert_eq!(split.y_test[row], idx as f64);
            assert_eq!(split.x_test.values()[[row, 0]], (idx * 10) as f64);
        }
        for (row, &idx) in split.train_indices.iter().enumerate() {
            assert_eq!(split.y_train[row], idx as f64);
        }
        assert_eq!(split.x_train.columns(), x.columns());
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(split_indices(10, 0.0, 2).is_err());
        assert!(split_indices(10, 1.0, 2).is_err());
        assert!(split_indices(10, f64::NAN, 2).is_err());
        // A single row cannot be split
        assert!(split_indices(1, 0.2, 2).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let (x, _) = matrix(5);
        let y = Array1::zeros(4);
        assert!(matches!(
            train_test_split(&x, &y, 0.2, 2),
            Err(CalorieError::InvalidParameter { .. })
        ));
    }
}
