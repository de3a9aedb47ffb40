use std::path::PathBuf;

use survey_ingest::{CleanReport, PartitionPaths};
use survey_model::{CorrelationVector, Partitions, QuestionLabels};
use survey_prep::PartitionSummary;

#[derive(Debug)]
pub struct CorrelateResult {
    pub input: PathBuf,
    pub vector: CorrelationVector,
    pub shown: usize,
    pub labels: QuestionLabels,
}

#[derive(Debug)]
pub struct PrepareResult {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub clean_report: CleanReport,
    pub labels: QuestionLabels,
    pub targets: Vec<TargetOutcome>,
    pub has_errors: bool,
}

#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub result: Result<TargetSummary, String>,
}

#[derive(Debug)]
pub struct TargetSummary {
    pub partitions: Partitions,
    pub summaries: Vec<PartitionSummary>,
    pub outputs: Option<PartitionPaths>,
}
