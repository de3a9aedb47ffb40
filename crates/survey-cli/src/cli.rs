//! CLI argument definitions for the survey preparer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use survey_model::{RankingPolicy, StratifyPolicy};

#[derive(Parser)]
#[command(
    name = "survey",
    version,
    about = "Survey dataset preparer - rank predictors and build stratified splits",
    long_about = "Prepare survey data for classifier training.\n\n\
                  Ranks question columns by Pearson correlation with a target,\n\
                  drops non-answer target codes, and writes stratified\n\
                  train/validation/test partitions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow survey answer values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rank columns by correlation with a target question.
    Correlate(CorrelateArgs),

    /// Build train/validation/test partitions for one or more targets.
    Prepare(PrepareArgs),
}

#[derive(Parser)]
pub struct CorrelateArgs {
    /// Survey CSV file.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Target question column.
    #[arg(long = "target", short = 't')]
    pub target: String,

    /// Show only the N highest-ranked columns.
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// How correlations are ordered.
    #[arg(long = "ranking", value_enum)]
    pub ranking: Option<RankingArg>,

    /// TOML file with [prepare], [labels], and [ingest] tables.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct PrepareArgs {
    /// Survey CSV file.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Target question column (repeat for several targets).
    #[arg(long = "target", short = 't', required = true)]
    pub targets: Vec<String>,

    /// Number of predictor columns to keep.
    #[arg(short = 'k', long = "top-k", value_name = "K")]
    pub k: Option<usize>,

    /// Target codes that mark non-answers (comma separated).
    #[arg(long = "sentinels", value_delimiter = ',', value_name = "CODES")]
    pub sentinels: Option<Vec<i64>>,

    /// Share of filtered rows held out for testing.
    #[arg(long = "test-fraction", value_name = "FRACTION")]
    pub test_fraction: Option<f64>,

    /// Share of the remaining rows held out for validation.
    #[arg(long = "val-fraction", value_name = "FRACTION")]
    pub val_fraction: Option<f64>,

    /// Seed for the split shuffles.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// How correlations are ordered.
    #[arg(long = "ranking", value_enum)]
    pub ranking: Option<RankingArg>,

    /// What to do when a class is too small to stratify.
    #[arg(long = "small-class", value_enum)]
    pub small_class: Option<SmallClassArg>,

    /// Output directory for partition CSVs (default: <CSV dir>/partitions).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prepare and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// TOML file with [prepare], [labels], and [ingest] tables.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// CLI ranking choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum RankingArg {
    Signed,
    Absolute,
}

impl From<RankingArg> for RankingPolicy {
    fn from(arg: RankingArg) -> Self {
        match arg {
            RankingArg::Signed => Self::Signed,
            RankingArg::Absolute => Self::Absolute,
        }
    }
}

/// CLI small-class policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SmallClassArg {
    Strict,
    Fallback,
}

impl From<SmallClassArg> for StratifyPolicy {
    fn from(arg: SmallClassArg) -> Self {
        match arg {
            SmallClassArg::Strict => Self::Strict,
            SmallClassArg::Fallback => Self::RandomFallback,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
