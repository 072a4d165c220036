//! Application configuration

use crate::error::{CalorieError, Result};
use crate::training::{XGBoostConfig, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the two source tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSources {
    /// Exercise/physiology table (features)
    pub exercise: PathBuf,
    /// Calories table (target), row-aligned with `exercise`
    pub calories: PathBuf,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            exercise: PathBuf::from("data/exercise.csv"),
            calories: PathBuf::from("data/calories.csv"),
        }
    }
}

impl DataSources {
    pub fn new(exercise: impl Into<PathBuf>, calories: impl Into<PathBuf>) -> Self {
        Self {
            exercise: exercise.into(),
            calories: calories.into(),
        }
    }
}

/// Train/test split settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataSources,
    pub split: SplitConfig,
    pub model: XGBoostConfig,
}

impl AppConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CalorieError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| CalorieError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_sources(mut self, sources: DataSources) -> Self {
        self.data = sources;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.split.test_fraction = fraction;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(CalorieError::InvalidParameter {
                name: "split.test_fraction".to_string(),
                value: fraction.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        if self.model.n_estimators == 0 {
            return Err(CalorieError::InvalidParameter {
                name: "model.n_estimators".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }
        if self.model.learning_rate <= 0.0 {
            return Err(CalorieError::InvalidParameter {
                name: "model.learning_rate".to_string(),
                value: self.model.learning_rate.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.split.test_fraction, 0.2);
        assert_eq!(config.split.seed, 2);
        assert_eq!(config.data.exercise, PathBuf::from("data/exercise.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"split": {{"seed": 7}}, "model": {{"n_estimators": 20}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_fraction, 0.2);
        assert_eq!(config.model.n_estimators, 20);
        assert_eq!(config.model.max_depth, 6);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = AppConfig::default().with_test_fraction(1.0);
        assert!(matches!(
            config.validate(),
            Err(CalorieError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let err = AppConfig::from_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, CalorieError::Config(_)));
    }
}
