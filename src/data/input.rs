//! User-facing prediction request

use crate::error::{CalorieError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::dataset::{FeatureRecord, Gender, GENDER_COLUMN};

/// Inclusive bounds and default of one numeric form field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    /// Column name in the feature view
    pub column: &'static str,
    /// Prompt label
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FieldBounds {
    pub fn range(&self) -> RangeInclusive<f64> {
        self.min..=self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.range().contains(&value)
    }
}

pub const AGE: FieldBounds = FieldBounds {
    column: "Age",
    label: "Age",
    min: 10.0,
    max: 80.0,
    default: 25.0,
};
pub const HEIGHT: FieldBounds = FieldBounds {
    column: "Height",
    label: "Height (cm)",
    min: 100.0,
    max: 220.0,
    default: 170.0,
};
pub const WEIGHT: FieldBounds = FieldBounds {
    column: "Weight",
    label: "Weight (kg)",
    min: 30.0,
    max: 150.0,
    default: 70.0,
};
pub const DURATION: FieldBounds = FieldBounds {
    column: "Duration",
    label: "Exercise Duration (minutes)",
    min: 5.0,
    max: 180.0,
    default: 30.0,
};
pub const HEART_RATE: FieldBounds = FieldBounds {
    column: "Heart_Rate",
    label: "Heart Rate (bpm)",
    min: 60.0,
    max: 200.0,
    default: 100.0,
};
pub const BODY_TEMP: FieldBounds = FieldBounds {
    column: "Body_Temp",
    label: "Body Temperature (°C)",
    min: 35.0,
    max: 42.0,
    default: 37.0,
};

/// Numeric form fields in feature order
pub const NUMERIC_FIELDS: [FieldBounds; 6] = [AGE, HEIGHT, WEIGHT, DURATION, HEART_RATE, BODY_TEMP];

/// A single prediction request, as entered on the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInput {
    pub gender: Gender,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub duration: f64,
    pub heart_rate: f64,
    pub body_temp: f64,
}

impl Default for ExerciseInput {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: AGE.default,
            height: HEIGHT.default,
            weight: WEIGHT.default,
            duration: DURATION.default,
            heart_rate: HEART_RATE.default,
            body_temp: BODY_TEMP.default,
        }
    }
}

impl ExerciseInput {
    /// Numeric values paired with their bounds, in feature order
    fn numeric_values(&self) -> [(FieldBounds, f64); 6] {
        let values = [
            self.age,
            self.height,
            self.weight,
            self.duration,
            self.heart_rate,
            self.body_temp,
        ];
        std::array::from_fn(|i| (NUMERIC_FIELDS[i], values[i]))
    }

    /// Check every numeric field against its form bounds
    pub fn validate(&self) -> Result<()> {
        for (bounds, value) in self.numeric_values() {
            if !bounds.contains(value) {
                return Err(CalorieError::InvalidInput(format!(
                    "{} = {} is outside [{}, {}]",
                    bounds.column, value, bounds.min, bounds.max
                )));
            }
        }
        Ok(())
    }

    /// Validate and convert to an encoded feature record
    pub fn to_record(&self) -> Result<FeatureRecord> {
        self.validate()?;
        let gender = FeatureRecord::new().with(GENDER_COLUMN, self.gender.encode());
        let record = self
            .numeric_values()
            .into_iter()
            .fold(gender, |record, (bounds, value)| record.with(bounds.column, value));
        Ok(record)
    }
}
