//! Second-order gradient-boosted regression trees

use crate::error::{CalorieError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::predictor::Regressor;

/// XGBoost configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XGBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    pub reg_alpha: f64,
    /// Minimum loss reduction to make a split (gamma)
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: Option<u64>,
}

impl Default for XGBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: Some(0),
        }
    }
}

/// A single node in a boosted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum XGBNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<XGBNode>,
        right: Box<XGBNode>,
    },
}

impl XGBNode {
    fn predict(&self, sample: ArrayView1<'_, f64>) -> f64 {
        match self {
            XGBNode::Leaf { weight } => *weight,
            XGBNode::Split { feature, threshold, left, right } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            XGBNode::Leaf { .. } => 0,
            XGBNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Best split candidate for one feature
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Gradient and hessian sums over a set of rows
#[derive(Debug, Clone, Copy, Default)]
struct GradStats {
    g: f64,
    h: f64,
}

impl GradStats {
    fn add(&mut self, g: f64, h: f64) {
        self.g += g;
        self.h += h;
    }

    fn minus(self, other: GradStats) -> GradStats {
        GradStats { g: self.g - other.g, h: self.h - other.h }
    }

    /// Structure score G² / (H + λ), with G soft-thresholded by α
    fn score(self, lambda: f64, alpha: f64) -> f64 {
        let g = soft_threshold(self.g, alpha);
        g * g / (self.h + lambda)
    }

    /// Regularized leaf weight -G / (H + λ), with G soft-thresholded by α
    fn weight(self, lambda: f64, alpha: f64) -> f64 {
        -soft_threshold(self.g, alpha) / (self.h + lambda)
    }
}

fn soft_threshold(g: f64, alpha: f64) -> f64 {
    g.signum() * (g.abs() - alpha).max(0.0)
}

/// Grows one tree by exact greedy split search over the gradients of a round
struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    grad: &'a Array1<f64>,
    hess: &'a Array1<f64>,
    features: &'a [usize],
    config: &'a XGBoostConfig,
}

impl TreeBuilder<'_> {
    fn stats(&self, rows: &[usize]) -> GradStats {
        rows.iter().fold(GradStats::default(), |mut acc, &i| {
            acc.add(self.grad[i], self.hess[i]);
            acc
        })
    }

    fn grow(&self, rows: &[usize], depth: usize) -> XGBNode {
        let cfg = self.config;
        let total = self.stats(rows);
        let leaf = XGBNode::Leaf { weight: total.weight(cfg.reg_lambda, cfg.reg_alpha) };

        if depth >= cfg.max_depth || rows.len() < 2 || total.h < cfg.min_child_weight {
            return leaf;
        }

        // Ties resolve to the later feature, independent of thread scheduling
        let best = self
            .features
            .par_iter()
            .filter_map(|&f| self.best_split(rows, f, total))
            .max_by(|a, b| a.gain.total_cmp(&b.gain));

        let Some(split) = best.filter(|s| s.gain > cfg.gamma) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| self.x[[i, split.feature]] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return leaf;
        }

        XGBNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(&left, depth + 1)),
            right: Box::new(self.grow(&right, depth + 1)),
        }
    }

    /// Scan the sorted values of `feature` for the highest-gain threshold
    fn best_split(
        &self,
        rows: &[usize],
        feature: usize,
        total: GradStats,
    ) -> Option<SplitCandidate> {
        let cfg = self.config;
        let value = |i: usize| self.x[[i, feature]];

        let mut sorted = rows.to_vec();
        sorted.sort_by(|&a, &b| value(a).total_cmp(&value(b)));

        let parent = total.score(cfg.reg_lambda, cfg.reg_alpha);
        let mut left = GradStats::default();
        let mut best: Option<SplitCandidate> = None;

        for pair in sorted.windows(2) {
            let (cur, next) = (pair[0], pair[1]);
            left.add(self.grad[cur], self.hess[cur]);

            // No threshold separates identical values
            if (value(cur) - value(next)).abs() < 1e-12 {
                continue;
            }

            let right = total.minus(left);
            if left.h < cfg.min_child_weight || right.h < cfg.min_child_weight {
                continue;
            }

            let gain = 0.5
                * (left.score(cfg.reg_lambda, cfg.reg_alpha)
                    + right.score(cfg.reg_lambda, cfg.reg_alpha)
                    - parent);
            if best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value(cur) + value(next)) / 2.0,
                    gain,
                });
            }
        }

        best
    }
}

/// XGBoost regressor (squared error loss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostRegressor {
    config: XGBoostConfig,
    trees: Vec<XGBNode>,
    base_score: f64,
    n_features: usize,
}

impl Default for XGBoostRegressor {
    fn default() -> Self {
        Self::new(XGBoostConfig::default())
    }
}

impl XGBoostRegressor {
    pub fn new(config: XGBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Depth of the deepest fitted tree
    pub fn max_fitted_depth(&self) -> usize {
        self.trees.iter().map(XGBNode::depth).max().unwrap_or(0)
    }

    fn raw_predict(&self, sample: ArrayView1<'_, f64>) -> f64 {
        self.trees.iter().fold(self.base_score, |acc, tree| {
            acc + self.config.learning_rate * tree.predict(sample)
        })
    }
}

impl Regressor for XGBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 || n_features == 0 {
            return Err(CalorieError::Model("cannot fit on an empty matrix".to_string()));
        }
        if y.len() != n_samples {
            return Err(CalorieError::Model(format!(
                "{} target values for {} rows",
                y.len(),
                n_samples
            )));
        }
        self.n_features = n_features;

        // Base prediction = mean(y)
        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.trees.clear();
        let hess = Array1::from_elem(n_samples, 1.0);

        for _ in 0..self.config.n_estimators {
            // Squared error: grad = pred - y, hess = 1.0
            let grad: Array1<f64> = &preds - y;

            let row_indices = subsample(&mut rng, n_samples, self.config.subsample);
            let col_indices = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let builder = TreeBuilder {
                x,
                grad: &grad,
                hess: &hess,
                features: &col_indices,
                config: &self.config,
            };
            let tree = builder.grow(&row_indices, 0);

            for (i, row) in x.rows().into_iter().enumerate() {
                preds[i] += self.config.learning_rate * tree.predict(row);
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CalorieError::Model("regressor has not been fitted".to_string()));
        }
        if x.ncols() != self.n_features {
            return Err(CalorieError::Model(format!(
                "expected {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.rows().into_iter().map(|row| self.raw_predict(row)).collect())
    }
}

fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}
