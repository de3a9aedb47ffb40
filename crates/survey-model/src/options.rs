//! Configuration options for dataset preparation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Number of top correlated features selected by default.
pub const DEFAULT_K: usize = 10;
/// Reserved "don't know", "skipped", and "refused" survey codes.
pub const DEFAULT_SENTINEL_CODES: [i64; 3] = [77, 98, 99];
/// Share of the filtered rows held out as the test partition.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Share of the post-test remainder held out as the validation partition.
pub const DEFAULT_VAL_FRACTION: f64 = 0.1;
/// Seed for the per-call shuffle.
pub const DEFAULT_SEED: u64 = 42;

/// Ordering used when ranking correlations with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Rank by the signed coefficient, highest first.
    #[default]
    Signed,
    /// Rank by the coefficient's magnitude, highest first.
    Absolute,
}

impl RankingPolicy {
    /// Sort key for a coefficient; undefined coefficients sort after every finite one.
    pub fn rank_key(self, coefficient: f64) -> f64 {
        if coefficient.is_nan() {
            return f64::NEG_INFINITY;
        }
        match self {
            Self::Signed => coefficient,
            Self::Absolute => coefficient.abs(),
        }
    }
}

/// Behavior when a target class is too small to populate every partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StratifyPolicy {
    /// Fail with a stratification error and let the caller pre-filter classes.
    #[default]
    Strict,
    /// Fall back to a seeded, non-stratified split for the affected stage.
    RandomFallback,
}

/// Options controlling feature selection and partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    /// Number of features to select.
    pub k: usize,
    /// Target codes treated as non-answers and excluded.
    pub sentinel_codes: BTreeSet<i64>,
    /// Fraction of filtered rows held out for test.
    pub test_fraction: f64,
    /// Fraction of the remainder held out for validation.
    pub val_fraction: f64,
    /// Shuffle seed.
    pub seed: u64,
    pub ranking: RankingPolicy,
    pub small_classes: StratifyPolicy,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            sentinel_codes: DEFAULT_SENTINEL_CODES.into_iter().collect(),
            test_fraction: DEFAULT_TEST_FRACTION,
            val_fraction: DEFAULT_VAL_FRACTION,
            seed: DEFAULT_SEED,
            ranking: RankingPolicy::default(),
            small_classes: StratifyPolicy::default(),
        }
    }
}

impl PrepareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_sentinel_codes(mut self, codes: impl IntoIterator<Item = i64>) -> Self {
        self.sentinel_codes = codes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_val_fraction(mut self, fraction: f64) -> Self {
        self.val_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_ranking(mut self, ranking: RankingPolicy) -> Self {
        self.ranking = ranking;
        self
    }

    #[must_use]
    pub fn with_small_classes(mut self, policy: StratifyPolicy) -> Self {
        self.small_classes = policy;
        self
    }

    /// Checks `k` and both fractions.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidK`] or [`PrepError::InvalidFraction`].
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(PrepError::InvalidK);
        }
        check_fraction("test_fraction", self.test_fraction)?;
        check_fraction("val_fraction", self.val_fraction)?;
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(PrepError::InvalidFraction { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_survey_conventions() {
        let options = PrepareOptions::default();
        assert_eq!(options.k, 10);
        assert_eq!(
            options.sentinel_codes.iter().copied().collect::<Vec<_>>(),
            vec![77, 98, 99]
        );
        assert_eq!(options.ranking, RankingPolicy::Signed);
        assert_eq!(options.small_classes, StratifyPolicy::Strict);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            PrepareOptions::new().with_k(0).validate(),
            Err(PrepError::InvalidK)
        ));
        assert!(matches!(
            PrepareOptions::new().with_test_fraction(1.0).validate(),
            Err(PrepError::InvalidFraction {
                name: "test_fraction",
                ..
            })
        ));
        assert!(matches!(
            PrepareOptions::new().with_val_fraction(0.0).validate(),
            Err(PrepError::InvalidFraction {
                name: "val_fraction",
                ..
            })
        ));
        assert!(
            PrepareOptions::new()
                .with_test_fraction(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn rank_key_orders_nan_last() {
        assert!(RankingPolicy::Signed.rank_key(-0.9) > RankingPolicy::Signed.rank_key(f64::NAN));
        assert_eq!(RankingPolicy::Absolute.rank_key(-0.9), 0.9);
        assert_eq!(RankingPolicy::Signed.rank_key(-0.9), -0.9);
    }
}
