//! Polars helper functions.
//!
//! Cell text parsing, numeric dtype detection, header cleanup, and
//! extraction of a column as plain `f64` values for statistics.

use polars::prelude::*;

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Returns true for integer and floating-point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Reads a numeric column as `f64` values, keeping nulls as `None`.
///
/// # Errors
///
/// Returns an error if the column is missing or cannot be cast to `Float64`.
pub fn column_f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column.f64()?;
    Ok(values.into_iter().collect())
}

/// Normalizes a raw header: strips a BOM, trims, and collapses inner whitespace.
///
/// # Examples
///
/// ```
/// use survey_common::normalize_header;
///
/// assert_eq!(normalize_header("\u{feff} SOC5B "), "SOC5B");
/// assert_eq!(normalize_header("Age   group"), "Age group");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
