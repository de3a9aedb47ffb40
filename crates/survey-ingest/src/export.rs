//! Partition CSV export.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use survey_model::Partitions;

use crate::error::{IngestError, Result};

/// Files written by [`write_partitions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPaths {
    pub train: PathBuf,
    pub validation: PathBuf,
    pub test: PathBuf,
}

/// Writes `df` to `path` as a headed CSV.
///
/// # Errors
///
/// [`IngestError::FileWrite`] if the file cannot be created, or
/// [`IngestError::DataFrame`] if serialization fails.
pub fn write_frame(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut frame = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(())
}

/// Reduces `stem` to a single file-name component: anything other than
/// alphanumerics, `-`, and `_` becomes `_`.
fn file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "partition".to_string()
    } else {
        cleaned
    }
}

/// Writes the three partitions as `<stem>_train.csv`,
/// `<stem>_validation.csv`, and `<stem>_test.csv` under `dir`.
///
/// Path separators and dots in `stem` are replaced, so every file lands
/// directly in `dir`.
pub fn write_partitions(partitions: &Partitions, dir: &Path, stem: &str) -> Result<PartitionPaths> {
    fs::create_dir_all(dir).map_err(|source| IngestError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;
    let stem = file_stem(stem);
    let path_for = |name: &str| dir.join(format!("{stem}_{name}.csv"));
    let paths = PartitionPaths {
        train: path_for("train"),
        validation: path_for("validation"),
        test: path_for("test"),
    };
    for (name, frame) in partitions.named() {
        let path = match name {
            "train" => &paths.train,
            "validation" => &paths.validation,
            _ => &paths.test,
        };
        write_frame(frame, path)?;
        info!(partition = name, rows = frame.height(), path = %path.display(), "wrote partition");
    }
    Ok(paths)
}
