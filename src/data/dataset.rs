//! Prepared dataset and its derived feature/target views

use crate::error::{CalorieError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier column dropped during preparation
pub const ID_COLUMN: &str = "User_ID";
/// Categorical column encoded as 0/1
pub const GENDER_COLUMN: &str = "Gender";
/// Regression target
pub const TARGET_COLUMN: &str = "Calories";
/// Feature columns in canonical order
pub const FEATURE_COLUMNS: [&str; 7] = [
    GENDER_COLUMN,
    "Age",
    "Height",
    "Weight",
    "Duration",
    "Heart_Rate",
    "Body_Temp",
];

/// Gender as recorded in the exercise table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Numeric encoding fed to the model: male = 0, female = 1
    pub fn encode(self) -> f64 {
        match self {
            Gender::Male => 0.0,
            Gender::Female => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = CalorieError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(CalorieError::InvalidInput(format!(
                "unknown gender {other:?}, expected \"male\" or \"female\""
            ))),
        }
    }
}

/// Named feature columns over a dense row-major matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap a matrix, checking that there is one name per column
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(CalorieError::Schema(format!(
                "{} column names for a matrix with {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Extract named columns from a DataFrame.
    ///
    /// Values are cast to `f64`; nulls become NaN.
    pub fn from_frame(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let col_data = columns
            .iter()
            .map(|name| column_as_f64(df, name))
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        let values = Array2::from_shape_fn((df.height(), columns.len()), |(r, c)| col_refs[c][r]);
        Self::new(columns.to_vec(), values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.column(idx))
    }

    /// Rows at `indices`, in that order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), indices),
        }
    }
}

/// A single record of named feature values, without the target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    fields: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a named field
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reorder values into `columns` order.
    ///
    /// The field set must equal `columns` exactly; a missing or extra field
    /// is a [`CalorieError::SchemaMismatch`].
    pub fn align(&self, columns: &[String]) -> Result<Array1<f64>> {
        let mismatch = || CalorieError::SchemaMismatch {
            expected: columns.join(", "),
            actual: self.field_names().join(", "),
        };

        if self.fields.len() != columns.len() {
            return Err(mismatch());
        }

        columns
            .iter()
            .map(|name| self.get(name).ok_or_else(mismatch))
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from_vec)
    }
}

/// The merged, encoded table with its derived X and Y views
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    features: FeatureMatrix,
    target: Array1<f64>,
}

impl Dataset {
    /// Build the views from a prepared frame.
    ///
    /// `feature_columns` must not contain the target.
    pub fn from_frame(frame: DataFrame, feature_columns: &[String]) -> Result<Self> {
        if feature_columns.iter().any(|c| c == TARGET_COLUMN) {
            return Err(CalorieError::Schema(format!(
                "{TARGET_COLUMN} cannot be used as a feature"
            )));
        }

        let features = FeatureMatrix::from_frame(&frame, feature_columns)?;
        let target = Array1::from_vec(column_as_f64(&frame, TARGET_COLUMN)?);

        Ok(Self { frame, features, target })
    }

    /// Feature view X
    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    /// Target view Y
    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    /// The full prepared table, target included
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn feature_columns(&self) -> &[String] {
        self.features.columns()
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names of the prepared table
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Values of one prepared column as `f64`
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        column_as_f64(&self.frame, name)
    }

    pub fn head(&self, n: usize) -> DataFrame {
        self.frame.head(Some(n))
    }
}

pub(crate) fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| CalorieError::Schema(format!("column {name} not found")))?;
    let cast = column
        .cast(&DataType::Float64)
        .map_err(|e| CalorieError::Schema(format!("column {name} is not numeric: {e}")))?;
    let values = cast
        .f64()
        .map_err(|e| CalorieError::Schema(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}
