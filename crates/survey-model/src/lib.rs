//! Data model for survey dataset preparation.
//!
//! - **error**: [`PrepError`] taxonomy shared by the preparer and its callers
//! - **options**: [`PrepareOptions`] plus the ranking and small-class policies
//! - **labels**: [`QuestionLabels`], the column code to question text dictionary
//! - **selection**: correlation vectors, feature selections, and partitions

pub mod error;
pub mod labels;
pub mod options;
pub mod selection;

pub use error::{PrepError, Result, SplitStage};
pub use labels::QuestionLabels;
pub use options::{
    DEFAULT_K, DEFAULT_SEED, DEFAULT_SENTINEL_CODES, DEFAULT_TEST_FRACTION, DEFAULT_VAL_FRACTION,
    PrepareOptions, RankingPolicy, StratifyPolicy,
};
pub use selection::{ClassLabel, Correlation, CorrelationVector, FeatureSelection, Partitions};
