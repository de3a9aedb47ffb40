//! Dataset preparation for survey classifiers.
//!
//! Given a cleaned numeric survey frame and a target column, this crate:
//!
//! - **correlation**: ranks every numeric column by its Pearson correlation
//!   with the target and selects the top K
//! - **filter**: drops rows whose target holds a sentinel non-answer code
//! - **stratify**: splits rows so each target class keeps its proportion
//! - **prepare**: chains the above into train/validation/test partitions
//! - **summary**: per-partition class distributions for reporting
//!
//! Every operation is a pure function of its inputs; the source frame is
//! never mutated and no state is shared between calls.

pub mod correlation;
pub mod filter;
pub mod prepare;
pub mod stratify;
pub mod summary;

pub use correlation::{
    compute_top_correlated, compute_top_correlated_with_policy, correlation_vector, pearson,
};
pub use filter::{class_labels, exclude_sentinels, take_rows};
pub use prepare::{DatasetPreparer, prepare_partitions};
pub use stratify::{Split, held_out_size, random_split, stratified_split};
pub use summary::{PartitionSummary, class_distribution, summarize_partitions};
