//! Feature selection and partition result types.

use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::options::RankingPolicy;

/// An integer target class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(pub i64);

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pearson coefficient of one column against the target.
///
/// `coefficient` is NaN when the correlation is undefined (constant column
/// or fewer than two complete pairs); it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub column: String,
    #[serde(with = "undefined_as_null")]
    pub coefficient: f64,
}

mod undefined_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = if value.is_nan() { None } else { Some(*value) };
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

impl Correlation {
    pub fn new(column: impl Into<String>, coefficient: f64) -> Self {
        Self {
            column: column.into(),
            coefficient,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.coefficient.is_nan()
    }
}

/// Correlations of every candidate column with a fixed target, ranked.
///
/// The target itself never appears in the vector. Entries are sorted
/// descending by the ranking policy; ties keep their input order and
/// undefined coefficients come last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationVector {
    target: String,
    policy: RankingPolicy,
    entries: Vec<Correlation>,
}

impl CorrelationVector {
    pub fn new(target: impl Into<String>, policy: RankingPolicy, entries: Vec<Correlation>) -> Self {
        let target = target.into();
        let mut entries: Vec<Correlation> = entries
            .into_iter()
            .filter(|entry| entry.column != target)
            .collect();
        entries.sort_by(|a, b| {
            policy
                .rank_key(b.coefficient)
                .total_cmp(&policy.rank_key(a.coefficient))
        });
        Self {
            target,
            policy,
            entries,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[Correlation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coefficient for a column, if it was a candidate.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.coefficient)
    }

    /// Takes the first `k` ranked columns.
    ///
    /// # Errors
    ///
    /// [`PrepError::InvalidK`] for `k == 0`, [`PrepError::InsufficientColumns`]
    /// when fewer than `k` candidates exist.
    pub fn top(&self, k: usize) -> Result<FeatureSelection> {
        if k == 0 {
            return Err(PrepError::InvalidK);
        }
        if self.entries.len() < k {
            return Err(PrepError::InsufficientColumns {
                requested: k,
                available: self.entries.len(),
            });
        }
        Ok(FeatureSelection {
            target: self.target.clone(),
            features: self
                .entries
                .iter()
                .take(k)
                .map(|entry| entry.column.clone())
                .collect(),
        })
    }
}

/// The top-K feature columns for a target, highest ranked first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSelection {
    target: String,
    features: Vec<String>,
}

impl FeatureSelection {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Selected features followed by the target column.
    pub fn working_columns(&self) -> Vec<String> {
        let mut columns = self.features.clone();
        columns.push(self.target.clone());
        columns
    }
}

/// Three row-disjoint, column-identical partitions of a filtered dataset.
#[derive(Debug, Clone)]
pub struct Partitions {
    pub selection: FeatureSelection,
    pub train: DataFrame,
    pub validation: DataFrame,
    pub test: DataFrame,
    /// Rows dropped because the target held a sentinel code or was null.
    pub excluded_rows: usize,
}

impl Partitions {
    /// Row count of the filtered dataset the partitions were drawn from.
    pub fn total_rows(&self) -> usize {
        self.train.height() + self.validation.height() + self.test.height()
    }

    /// Partitions in `(train, test, validation)` order.
    pub fn into_tuple(self) -> (DataFrame, DataFrame, DataFrame) {
        (self.train, self.test, self.validation)
    }

    /// Named partitions in output order.
    pub fn named(&self) -> [(&'static str, &DataFrame); 3] {
        [
            ("train", &self.train),
            ("validation", &self.validation),
            ("test", &self.test),
        ]
    }
}
