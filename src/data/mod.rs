//! Data preparation: loading, merging, encoding and the feature/target views

pub mod dataset;
pub mod input;
pub mod loader;
pub mod prepare;

pub use dataset::{
    Dataset, FeatureMatrix, FeatureRecord, Gender, FEATURE_COLUMNS, GENDER_COLUMN, ID_COLUMN,
    TARGET_COLUMN,
};
pub use input::{ExerciseInput, FieldBounds, NUMERIC_FIELDS};
pub use loader::{load_and_prepare, CacheStats, DataCache, DataLoader};
pub use prepare::{drop_identifier, encode_gender, feature_columns, merge_target, prepare};
