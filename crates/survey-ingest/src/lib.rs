//! Survey data ingestion.
//!
//! Loads raw survey exports, normalizes every cell into a numeric code or
//! null, and writes prepared partitions back out as CSV.

pub mod clean;
pub mod error;
pub mod export;
pub mod load;

pub use clean::{CellCode, CleanReport, CleanedDataset, IngestOptions, clean_dataset, extract_code};
pub use error::{IngestError, Result};
pub use export::{PartitionPaths, write_frame, write_partitions};
pub use load::load_survey_csv;
