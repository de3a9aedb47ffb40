//! Class distribution summaries for prepared partitions.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use survey_model::{ClassLabel, Partitions, Result};

use crate::filter::class_labels;

/// Row and class counts for one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub name: &'static str,
    pub rows: usize,
    pub classes: BTreeMap<ClassLabel, usize>,
}

impl PartitionSummary {
    /// Share of `class` within the partition, 0 when empty.
    pub fn proportion(&self, class: ClassLabel) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.classes.get(&class).copied().unwrap_or(0) as f64 / self.rows as f64
    }
}

/// Counts rows per target class.
///
/// # Errors
///
/// Fails like [`class_labels`] on a missing or non-integer target.
pub fn class_distribution(df: &DataFrame, target: &str) -> Result<BTreeMap<ClassLabel, usize>> {
    let mut counts = BTreeMap::new();
    for label in class_labels(df, target)? {
        *counts.entry(label).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Summaries for train, validation, and test, in that order.
///
/// # Errors
///
/// See [`class_distribution`].
pub fn summarize_partitions(partitions: &Partitions) -> Result<Vec<PartitionSummary>> {
    let target = partitions.selection.target();
    partitions
        .named()
        .into_iter()
        .map(|(name, df)| {
            Ok(PartitionSummary {
                name,
                rows: df.height(),
                classes: class_distribution(df, target)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    #[test]
    fn distribution_counts_classes() {
        let df = DataFrame::new(vec![
            Series::new("Y".into(), vec![1i64, 2, 2, 3, 2]).into_column(),
        ])
        .unwrap();
        let counts = class_distribution(&df, "Y").unwrap();
        assert_eq!(counts.get(&ClassLabel(2)), Some(&3));
        assert_eq!(counts.len(), 3);

        let summary = PartitionSummary {
            name: "train",
            rows: 5,
            classes: counts,
        };
        assert!((summary.proportion(ClassLabel(2)) - 0.6).abs() < 1e-12);
        assert_eq!(summary.proportion(ClassLabel(9)), 0.0);
    }
}
