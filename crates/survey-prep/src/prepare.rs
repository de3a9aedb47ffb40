//! Train/validation/test partitioning over the top correlated features.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span, warn};

use survey_model::{
    ClassLabel, FeatureSelection, Partitions, PrepError, PrepareOptions, Result, SplitStage,
    StratifyPolicy,
};

use crate::correlation::compute_top_correlated_with_policy;
use crate::filter::{class_labels, exclude_sentinels, take_rows};
use crate::stratify::{Split, random_split, stratified_split};

/// Rows per class kept back by the test split so validation can still stratify.
const TEST_STAGE_RESERVE: usize = 2;
const VALIDATION_STAGE_RESERVE: usize = 1;

/// Stateless preparer configured once and reused across target columns.
#[derive(Debug, Clone, Default)]
pub struct DatasetPreparer {
    options: PrepareOptions,
}

impl DatasetPreparer {
    pub fn new(options: PrepareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrepareOptions {
        &self.options
    }

    /// Top `k` features for `target` under the configured ranking policy.
    ///
    /// # Errors
    ///
    /// See [`compute_top_correlated_with_policy`].
    pub fn top_correlated(&self, df: &DataFrame, target: &str) -> Result<FeatureSelection> {
        compute_top_correlated_with_policy(df, target, self.options.k, self.options.ranking)
    }

    /// Selects features, drops sentinel targets, and splits into partitions.
    ///
    /// Features are ranked on the unfiltered frame; sentinel rows are removed
    /// afterwards, before splitting.
    ///
    /// # Errors
    ///
    /// Option, schema, and feature selection errors are returned unchanged;
    /// split failures follow the configured [`StratifyPolicy`].
    pub fn prepare(&self, df: &DataFrame, target: &str) -> Result<Partitions> {
        let span = info_span!("prepare", target = %target);
        let _guard = span.enter();
        self.options.validate()?;

        let selection = self.top_correlated(df, target)?;
        let (filtered, excluded_rows) = exclude_sentinels(df, target, &self.options.sentinel_codes)?;
        let working = filtered.select(selection.working_columns())?;
        let labels = class_labels(&working, target)?;
        let mut rng = StdRng::seed_from_u64(self.options.seed);

        let first = self.split(
            &labels,
            self.options.test_fraction,
            SplitStage::Test,
            TEST_STAGE_RESERVE,
            &mut rng,
        )?;
        let remainder: Vec<ClassLabel> = first.remaining.iter().map(|&idx| labels[idx]).collect();
        let second = self.split(
            &remainder,
            self.options.val_fraction,
            SplitStage::Validation,
            VALIDATION_STAGE_RESERVE,
            &mut rng,
        )?;
        let validation_rows: Vec<usize> = second
            .held_out
            .iter()
            .map(|&pos| first.remaining[pos])
            .collect();
        let train_rows: Vec<usize> = second
            .remaining
            .iter()
            .map(|&pos| first.remaining[pos])
            .collect();

        let partitions = Partitions {
            train: take_rows(&working, &train_rows)?,
            validation: take_rows(&working, &validation_rows)?,
            test: take_rows(&working, &first.held_out)?,
            selection,
            excluded_rows,
        };
        info!(
            target = %target,
            excluded_rows,
            train = partitions.train.height(),
            validation = partitions.validation.height(),
            test = partitions.test.height(),
            "partitions ready"
        );
        Ok(partitions)
    }

    fn split(
        &self,
        labels: &[ClassLabel],
        fraction: f64,
        stage: SplitStage,
        reserve: usize,
        rng: &mut StdRng,
    ) -> Result<Split> {
        match stratified_split(labels, fraction, stage, reserve, rng) {
            Err(error @ (PrepError::Stratification { .. } | PrepError::SplitTooSmall { .. }))
                if self.options.small_classes == StratifyPolicy::RandomFallback =>
            {
                warn!(%stage, %error, "falling back to non-stratified split");
                random_split(labels.len(), fraction, stage, rng)
            }
            other => other,
        }
    }
}

/// Prepares partitions with explicit arguments and otherwise default options.
///
/// Returns `(train, test, validation)`.
///
/// # Errors
///
/// See [`DatasetPreparer::prepare`].
pub fn prepare_partitions(
    df: &DataFrame,
    target: &str,
    k: usize,
    sentinel_codes: &BTreeSet<i64>,
    test_fraction: f64,
    val_fraction: f64,
) -> Result<(DataFrame, DataFrame, DataFrame)> {
    let options = PrepareOptions::new()
        .with_k(k)
        .with_sentinel_codes(sentinel_codes.iter().copied())
        .with_test_fraction(test_fraction)
        .with_val_fraction(val_fraction);
    Ok(DatasetPreparer::new(options).prepare(df, target)?.into_tuple())
}
