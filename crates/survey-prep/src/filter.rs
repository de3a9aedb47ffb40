//! Sentinel exclusion and row selection helpers.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, IdxCa, IdxSize};
use tracing::debug;

use survey_common::column_f64_values;
use survey_model::{ClassLabel, PrepError, Result};

/// Selects rows by position, preserving the given order.
///
/// # Errors
///
/// Returns [`PrepError::DataFrame`] if an index is out of bounds.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

fn target_values(df: &DataFrame, target: &str) -> Result<Vec<Option<f64>>> {
    if df.column(target).is_err() {
        return Err(PrepError::ColumnNotFound {
            column: target.to_string(),
        });
    }
    Ok(column_f64_values(df, target)?)
}

/// Drops rows whose `target` is null or one of `sentinel_codes`.
///
/// Returns the filtered frame and the number of rows removed. The input is
/// left untouched.
///
/// # Errors
///
/// [`PrepError::ColumnNotFound`] if `target` is absent.
pub fn exclude_sentinels(
    df: &DataFrame,
    target: &str,
    sentinel_codes: &BTreeSet<i64>,
) -> Result<(DataFrame, usize)> {
    let values = target_values(df, target)?;
    let keep: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| match value {
            Some(v) if !is_sentinel(*v, sentinel_codes) => Some(idx),
            _ => None,
        })
        .collect();
    let excluded = values.len() - keep.len();
    debug!(
        target = %target,
        rows = values.len(),
        excluded,
        "excluded sentinel target rows"
    );
    Ok((take_rows(df, &keep)?, excluded))
}

fn is_sentinel(value: f64, sentinel_codes: &BTreeSet<i64>) -> bool {
    value.fract() == 0.0 && sentinel_codes.contains(&(value as i64))
}

/// Reads `target` as integer class labels, one per row.
///
/// # Errors
///
/// [`PrepError::ColumnNotFound`] if `target` is absent,
/// [`PrepError::NonIntegerTarget`] for null or fractional values.
pub fn class_labels(df: &DataFrame, target: &str) -> Result<Vec<ClassLabel>> {
    target_values(df, target)?
        .into_iter()
        .map(|value| match value {
            Some(v) if v.fract() == 0.0 => Ok(ClassLabel(v as i64)),
            other => Err(PrepError::NonIntegerTarget {
                column: target.to_string(),
                value: other.unwrap_or(f64::NAN),
            }),
        })
        .collect()
}
