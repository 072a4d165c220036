//! Merge, identifier removal and categorical encoding

use crate::error::{CalorieError, Result};
use polars::prelude::*;
use tracing::{debug, warn};

use super::dataset::{Dataset, Gender, FEATURE_COLUMNS, GENDER_COLUMN, ID_COLUMN, TARGET_COLUMN};

/// Append the target column of `calories` to `exercise`, aligned by row position
pub fn merge_target(exercise: &DataFrame, calories: &DataFrame) -> Result<DataFrame> {
    if exercise.height() != calories.height() {
        return Err(CalorieError::DataLoad(format!(
            "row count mismatch: exercise source has {} rows, calories source has {}",
            exercise.height(),
            calories.height()
        )));
    }

    let target = calories.column(TARGET_COLUMN).map_err(|_| {
        CalorieError::Schema(format!("calories source has no {TARGET_COLUMN} column"))
    })?;

    if exercise.get_column_index(TARGET_COLUMN).is_some() {
        return Err(CalorieError::Schema(format!(
            "exercise source already has a {TARGET_COLUMN} column"
        )));
    }

    exercise
        .hstack(&[target.clone()])
        .map_err(|e| CalorieError::Schema(e.to_string()))
}

/// Drop the identifier column; a table without one is returned unchanged
pub fn drop_identifier(df: DataFrame) -> Result<DataFrame> {
    if df.get_column_index(ID_COLUMN).is_none() {
        return Ok(df);
    }
    debug!(column = ID_COLUMN, "Dropping identifier column");
    df.drop(ID_COLUMN)
        .map_err(|e| preparation_error("dropping identifier", e))
}

/// Replace the text Gender column with its 0/1 encoding.
///
/// Any value other than "male" or "female" (nulls included) is an
/// [`CalorieError::InvalidCategory`] naming the offending row.
pub fn encode_gender(mut df: DataFrame) -> Result<DataFrame> {
    let column = df
        .column(GENDER_COLUMN)
        .map_err(|_| CalorieError::Schema(format!("missing required column {GENDER_COLUMN}")))?;

    let values = column.str().map_err(|_| {
        CalorieError::Schema(format!(
            "{GENDER_COLUMN} must be a text column, found {}",
            column.dtype()
        ))
    })?;

    let encoded = values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let invalid = || CalorieError::InvalidCategory {
                column: GENDER_COLUMN.to_string(),
                value: value.unwrap_or("null").to_string(),
                row,
            };
            value
                .ok_or_else(invalid)?
                .parse::<Gender>()
                .map(Gender::encode)
                .map_err(|_| invalid())
        })
        .collect::<Result<Vec<f64>>>()?;

    df.with_column(Column::new(GENDER_COLUMN.into(), encoded))
        .map_err(|e| preparation_error("encoding Gender", e))?;
    Ok(df)
}

/// Feature columns of a merged table, in table order.
///
/// Every entry of [`FEATURE_COLUMNS`] and the target must be present.
/// Unrecognised columns are left out of the feature view.
pub fn feature_columns(df: &DataFrame) -> Result<Vec<String>> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .chain(std::iter::once(&TARGET_COLUMN))
        .filter(|required| !names.iter().any(|n| n == *required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(CalorieError::Schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let (features, ignored): (Vec<String>, Vec<String>) = names
        .into_iter()
        .filter(|n| n != TARGET_COLUMN)
        .partition(|n| FEATURE_COLUMNS.contains(&n.as_str()));

    if !ignored.is_empty() {
        warn!(columns = ?ignored, "Ignoring unrecognised columns");
    }

    Ok(features)
}

/// Polars failures after loading belong to the preparation stage
fn preparation_error(step: &str, err: PolarsError) -> CalorieError {
    CalorieError::Schema(format!("{step}: {err}"))
}

/// Run every preparation step on the two raw source tables.
///
/// The prepared frame keeps only the feature columns and the target.
pub fn prepare(exercise: &DataFrame, calories: &DataFrame) -> Result<Dataset> {
    let merged = drop_identifier(merge_target(exercise, calories)?)?;
    let features = feature_columns(&merged)?;
    let kept = merged
        .select(features.iter().map(String::as_str).chain(std::iter::once(TARGET_COLUMN)))
        .map_err(|e| preparation_error("selecting columns", e))?;
    let encoded = encode_gender(kept)?;
    let dataset = Dataset::from_frame(encoded, &features)?;

    debug!(
        rows = dataset.len(),
        features = ?dataset.feature_columns(),
        "Prepared dataset"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_df() -> DataFrame {
        df!(
            "User_ID" => &[1i64, 2, 3],
            "Gender" => &["male", "female", "male"],
            "Age" => &[68.0, 20.0, 69.0],
            "Height" => &[190.0, 166.0, 179.0],
            "Weight" => &[94.0, 60.0, 79.0],
            "Duration" => &[29.0, 14.0, 5.0],
            "Heart_Rate" => &[105.0, 94.0, 88.0],
            "Body_Temp" => &[40.8, 40.3, 38.7]
        )
        .unwrap()
    }

    fn calories_df() -> DataFrame {
        df!(
            "User_ID" => &[1i64, 2, 3],
            "Calories" => &[231.0, 66.0, 26.0]
        )
        .unwrap()
    }

    #[test]
    fn test_merge_appends_target() {
        let merged = merge_target(&exercise_df(), &calories_df()).unwrap();
        assert_eq!(merged.width(), 9);
        assert_eq!(merged.height(), 3);
        assert!(merged.column(TARGET_COLUMN).is_ok());
    }

    #[test]
    fn test_merge_row_mismatch() {
        let short = df!("Calories" => &[1.0, 2.0]).unwrap();
        let err = merge_target(&exercise_df(), &short).unwrap_err();
        assert!(matches!(err, CalorieError::DataLoad(_)));
    }

    #[test]
    fn test_merge_without_target_column() {
        let no_target = df!("User_ID" => &[1i64, 2, 3]).unwrap();
        let err = merge_target(&exercise_df(), &no_target).unwrap_err();
        assert!(matches!(err, CalorieError::Schema(_)));
    }

    #[test]
    fn test_drop_identifier_is_idempotent() {
        let once = drop_identifier(exercise_df()).unwrap();
        let twice = drop_identifier(once.clone()).unwrap();
        assert!(once.column(ID_COLUMN).is_err());
        assert_eq!(once.get_column_names(), twice.get_column_names());
        assert!(once.equals(&twice));
    }

    #[test]
    fn test_encode_gender() {
        let encoded = encode_gender(exercise_df()).unwrap();
        let values: Vec<Option<f64>> = encoded
            .column(GENDER_COLUMN)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(0.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_encode_gender_rejects_unknown() {
        let df = df!("Gender" => &["male", "unknown"]).unwrap();
        match encode_gender(df) {
            Err(CalorieError::InvalidCategory { value, row, .. }) => {
                assert_eq!(value, "unknown");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_gender_rejects_numeric_column() {
        let df = df!("Gender" => &[0.0, 1.0]).unwrap();
        assert!(matches!(encode_gender(df), Err(CalorieError::Schema(_))));
    }

    #[test]
    fn test_feature_columns_reports_missing() {
        let merged = merge_target(&exercise_df().drop("Age").unwrap(), &calories_df()).unwrap();
        match feature_columns(&merged) {
            Err(CalorieError::Schema(msg)) => assert!(msg.contains("Age")),
            other => panic!("expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_prepare_end_to_end() {
        let dataset = prepare(&exercise_df(), &calories_df()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_columns(), FEATURE_COLUMNS.map(String::from).as_slice());
        assert_eq!(dataset.target().to_vec(), vec![231.0, 66.0, 26.0]);
        assert!(dataset.column_names().iter().all(|c| c != ID_COLUMN));
    }

    #[test]
    fn test_prepare_ignores_extra_columns() {
        let mut exercise = exercise_df();
        exercise
            .with_column(Column::new("Notes".into(), &["easy", "hard", "easy"]))
            .unwrap();
        let dataset = prepare(&exercise, &calories_df()).unwrap();
        assert_eq!(dataset.feature_columns().len(), FEATURE_COLUMNS.len());

        let mut expected = FEATURE_COLUMNS.map(String::from).to_vec();
        expected.push(TARGET_COLUMN.to_string());
        assert_eq!(dataset.column_names(), expected);
    }

    #[test]
    fn test_preparation_errors_report_preparation_stage() {
        let err = exercise_df().drop("Missing").unwrap_err();
        let mapped = preparation_error("dropping identifier", err);
        assert!(matches!(mapped, CalorieError::Schema(_)));
        assert_eq!(mapped.stage(), "data preparation");
    }
}
