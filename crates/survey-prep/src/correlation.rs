//! Target correlation and top-K feature selection.
//!
//! Only target-vs-candidate coefficients are computed, so the cost is
//! O(columns x rows). Pairs with a null on either side are skipped.

use polars::prelude::DataFrame;
use tracing::{debug, info};

use survey_common::{column_f64_values, is_numeric_dtype};
use survey_model::{
    Correlation, CorrelationVector, FeatureSelection, PrepError, RankingPolicy, Result,
};

/// Pearson correlation over pairwise complete observations.
///
/// Returns NaN when fewer than two complete pairs exist or either side has
/// zero variance.
///
/// # Examples
///
/// ```
/// use survey_prep::pearson;
///
/// let x = [Some(1.0), Some(2.0), Some(3.0)];
/// let y = [Some(2.0), Some(4.0), Some(6.0)];
/// assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
///
/// let flat = [Some(5.0), Some(5.0), Some(5.0)];
/// assert!(pearson(&x, &flat).is_nan());
/// ```
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Correlation of every numeric non-target column with `target`, ranked by `policy`.
///
/// # Errors
///
/// [`PrepError::ColumnNotFound`] if `target` is absent,
/// [`PrepError::NonNumericColumn`] if it is not numeric.
pub fn correlation_vector(
    df: &DataFrame,
    target: &str,
    policy: RankingPolicy,
) -> Result<CorrelationVector> {
    let target_column = df
        .column(target)
        .map_err(|_| PrepError::ColumnNotFound {
            column: target.to_string(),
        })?;
    if !is_numeric_dtype(target_column.dtype()) {
        return Err(PrepError::NonNumericColumn {
            column: target.to_string(),
            dtype: target_column.dtype().to_string(),
        });
    }
    let target_values = column_f64_values(df, target)?;

    let mut entries = Vec::with_capacity(df.width().saturating_sub(1));
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == target {
            continue;
        }
        if !is_numeric_dtype(column.dtype()) {
            debug!(column = %name, dtype = %column.dtype(), "skipping non-numeric column");
            continue;
        }
        let values = column_f64_values(df, name)?;
        let coefficient = pearson(&values, &target_values);
        debug!(column = %name, coefficient, "correlation");
        entries.push(Correlation::new(name, coefficient));
    }
    Ok(CorrelationVector::new(target, policy, entries))
}

/// The `k` columns most correlated with `target`, ranked by signed coefficient.
///
/// # Errors
///
/// See [`compute_top_correlated_with_policy`].
pub fn compute_top_correlated(df: &DataFrame, target: &str, k: usize) -> Result<FeatureSelection> {
    compute_top_correlated_with_policy(df, target, k, RankingPolicy::Signed)
}

/// The `k` columns most correlated with `target` under an explicit ranking policy.
///
/// # Errors
///
/// [`PrepError::ColumnNotFound`], [`PrepError::NonNumericColumn`],
/// [`PrepError::InvalidK`], or [`PrepError::InsufficientColumns`].
pub fn compute_top_correlated_with_policy(
    df: &DataFrame,
    target: &str,
    k: usize,
    policy: RankingPolicy,
) -> Result<FeatureSelection> {
    if k == 0 {
        return Err(PrepError::InvalidK);
    }
    let vector = correlation_vector(df, target, policy)?;
    let selection = vector.top(k)?;
    info!(
        target = %target,
        k,
        candidates = vector.len(),
        features = ?selection.features(),
        "selected top correlated features"
    );
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(1.0), Some(100.0), Some(2.0), Some(3.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_negative() {
        let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let y = [Some(8.0), Some(6.0), Some(4.0), Some(2.0)];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_needs_two_pairs() {
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn vector_skips_text_columns() {
        let df = DataFrame::new(vec![
            Series::new("T".into(), vec![1.0, 2.0, 3.0]).into_column(),
            Series::new("A".into(), vec![1i64, 2, 3]).into_column(),
            Series::new("NOTE".into(), vec!["x", "y", "z"]).into_column(),
        ])
        .unwrap();
        let vector = correlation_vector(&df, "T", RankingPolicy::Signed).unwrap();
        assert_eq!(vector.len(), 1);
        assert_eq!(vector.entries()[0].column, "A");
    }

    #[test]
    fn text_target_is_rejected() {
        let df = DataFrame::new(vec![
            Series::new("T".into(), vec!["a", "b"]).into_column(),
            Series::new("A".into(), vec![1i64, 2]).into_column(),
        ])
        .unwrap();
        assert!(matches!(
            correlation_vector(&df, "T", RankingPolicy::Signed),
            Err(PrepError::NonNumericColumn { .. })
        ));
    }
}
