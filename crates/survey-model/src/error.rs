//! Error types for dataset preparation.

use std::fmt;

use thiserror::Error;

/// Which stage of the two-step stratified split an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStage {
    /// Splitting the test partition off the filtered dataset.
    Test,
    /// Splitting the validation partition off the remainder.
    Validation,
}

impl fmt::Display for SplitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => f.write_str("test"),
            Self::Validation => f.write_str("validation"),
        }
    }
}

/// Errors raised while selecting features or partitioning a dataset.
#[derive(Debug, Error)]
pub enum PrepError {
    // === Schema Errors ===
    /// Target or feature column absent from the dataset schema.
    #[error("column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Target column exists but does not hold numeric values.
    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// Fewer numeric candidate columns than requested.
    #[error("requested {requested} features but only {available} numeric candidate columns exist")]
    InsufficientColumns { requested: usize, available: usize },

    // === Option Errors ===
    /// `k` must select at least one feature.
    #[error("k must be at least 1")]
    InvalidK,

    /// Split fractions must lie strictly between 0 and 1.
    #[error("{name} must lie strictly between 0 and 1, got {value}")]
    InvalidFraction { name: &'static str, value: f64 },

    /// Stratification needs integer class codes in the target column.
    #[error("target column '{column}' holds non-integer value {value}")]
    NonIntegerTarget { column: String, value: f64 },

    // === Split Errors ===
    /// A target class lacks enough rows to appear in every partition.
    #[error("class {class} has {count} rows; stratified splitting needs at least {required}")]
    Stratification {
        class: i64,
        count: usize,
        required: usize,
    },

    /// A split stage cannot give every class a row on both sides.
    #[error(
        "{stage} split of {rows} rows yields {held_out} held-out rows, too few for {classes} classes"
    )]
    SplitTooSmall {
        stage: SplitStage,
        rows: usize,
        held_out: usize,
        classes: usize,
    },

    /// A partition would contain no rows.
    #[error("{partition} partition would be empty ({rows} rows available)")]
    EmptyPartition { partition: &'static str, rows: usize },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for PrepError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::ColumnNotFound {
            column: "SOC5B".to_string(),
        };
        assert_eq!(err.to_string(), "column 'SOC5B' not found in dataset");

        let err = PrepError::Stratification {
            class: 5,
            count: 1,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "class 5 has 1 rows; stratified splitting needs at least 3"
        );
    }

    #[test]
    fn test_split_too_small_names_stage() {
        let err = PrepError::SplitTooSmall {
            stage: SplitStage::Validation,
            rows: 8,
            held_out: 1,
            classes: 2,
        };
        assert!(err.to_string().starts_with("validation split of 8 rows"));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("SOC5B".into());
        let err: PrepError = polars_err.into();
        assert!(matches!(err, PrepError::DataFrame { .. }));
    }
}
