use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, error, info, info_span, trace};

use survey_cli::config::{PrepConfig, PrepareOverrides, load_config};
use survey_cli::logging::redact_value;
use survey_ingest::{CleanedDataset, clean_dataset, load_survey_csv, write_partitions};
use survey_prep::{DatasetPreparer, correlation_vector, summarize_partitions};

use crate::cli::{CorrelateArgs, PrepareArgs};
use crate::types::{CorrelateResult, PrepareResult, TargetOutcome, TargetSummary};

pub fn run_correlate(args: &CorrelateArgs) -> Result<CorrelateResult> {
    let config = load_config(args.config.as_deref()).context("load config")?;
    let cleaned = load_and_clean(&args.input, &config)?;
    let ranking = args
        .ranking
        .map(Into::into)
        .unwrap_or(config.prepare.ranking);

    let span = info_span!("correlate", target = %args.target);
    let _guard = span.enter();
    let vector = correlation_vector(&cleaned.frame, &args.target, ranking)
        .with_context(|| format!("correlate columns with {}", args.target))?;
    let shown = match args.top {
        Some(top) => {
            vector
                .top(top)
                .with_context(|| format!("select top {top} columns"))?;
            top
        }
        None => vector.len(),
    };
    Ok(CorrelateResult {
        input: args.input.clone(),
        vector,
        shown,
        labels: config.labels,
    })
}

pub fn run_prepare(args: &PrepareArgs) -> Result<PrepareResult> {
    let config = load_config(args.config.as_deref())
        .context("load config")?
        .with_overrides(&overrides_from_args(args));
    config
        .prepare
        .validate()
        .context("invalid preparation options")?;
    let cleaned = load_and_clean(&args.input, &config)?;
    let output_dir = if args.dry_run {
        None
    } else {
        Some(
            args.output_dir
                .clone()
                .unwrap_or_else(|| default_output_dir(&args.input)),
        )
    };

    let preparer = DatasetPreparer::new(config.prepare.clone());
    let options = preparer.options();
    debug!(
        k = options.k,
        seed = options.seed,
        test_fraction = options.test_fraction,
        val_fraction = options.val_fraction,
        targets = args.targets.len(),
        "preparer configured"
    );
    let mut targets = Vec::with_capacity(args.targets.len());
    for target in &args.targets {
        let span = info_span!("target", target = %target);
        let start = Instant::now();
        let result = span
            .in_scope(|| prepare_target(&preparer, &cleaned.frame, target, output_dir.as_deref()));
        match &result {
            Ok(summary) => info!(
                target = %target,
                rows = summary.partitions.total_rows(),
                duration_ms = start.elapsed().as_millis(),
                "target prepared"
            ),
            Err(err) => error!(target = %target, error = %format!("{err:#}"), "target failed"),
        }
        targets.push(TargetOutcome {
            target: target.clone(),
            result: result.map_err(|err| format!("{err:#}")),
        });
    }

    let has_errors = targets.iter().any(|outcome| outcome.result.is_err());
    Ok(PrepareResult {
        input: args.input.clone(),
        output_dir,
        clean_report: cleaned.report,
        labels: config.labels,
        targets,
        has_errors,
    })
}

fn prepare_target(
    preparer: &DatasetPreparer,
    frame: &DataFrame,
    target: &str,
    output_dir: Option<&Path>,
) -> Result<TargetSummary> {
    let partitions = preparer
        .prepare(frame, target)
        .with_context(|| format!("prepare partitions for {target}"))?;
    let summaries = summarize_partitions(&partitions).context("summarize partitions")?;
    for summary in &summaries {
        debug!(partition = summary.name, rows = summary.rows, "partition size");
        trace!(
            partition = summary.name,
            classes = %redact_value(&format!("{:?}", summary.classes)),
            "partition classes"
        );
    }
    let outputs = match output_dir {
        Some(dir) => Some(
            write_partitions(&partitions, dir, target)
                .with_context(|| format!("write partitions to {}", dir.display()))?,
        ),
        None => None,
    };
    Ok(TargetSummary {
        partitions,
        summaries,
        outputs,
    })
}

fn load_and_clean(input: &Path, config: &PrepConfig) -> Result<CleanedDataset> {
    let span = info_span!("ingest", path = %input.display());
    let _guard = span.enter();
    let raw = load_survey_csv(input).with_context(|| format!("load {}", input.display()))?;
    clean_dataset(&raw, &config.ingest).context("clean survey data")
}

fn overrides_from_args(args: &PrepareArgs) -> PrepareOverrides {
    PrepareOverrides {
        k: args.k,
        sentinel_codes: args.sentinels.clone(),
        test_fraction: args.test_fraction,
        val_fraction: args.val_fraction,
        seed: args.seed,
        ranking: args.ranking.map(Into::into),
        small_classes: args.small_class.map(Into::into),
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .map_or_else(|| PathBuf::from("partitions"), |dir| dir.join("partitions"))
}
