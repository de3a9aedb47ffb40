//! Raw survey CSV loading.
//!
//! Every column is read as text so the cleaner decides how each cell is
//! interpreted; survey exports mix codes, labels, and bracketed codes in
//! the same column.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use survey_common::normalize_header;

use crate::error::{IngestError, Result};

/// Loads a survey CSV with every column typed as `String`.
///
/// Header names are trimmed, BOM-stripped, and whitespace-collapsed. Empty
/// cells become nulls.
///
/// # Errors
///
/// [`IngestError::FileNotFound`], [`IngestError::CsvParse`],
/// [`IngestError::EmptyCsv`], or [`IngestError::DuplicateColumn`] when two
/// headers normalize to the same name.
pub fn load_survey_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let parse_error = |err: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;
    if raw.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(raw.width());
    for column in raw.get_columns() {
        let name = normalize_header(column.name().as_str());
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: name,
                path: path.to_path_buf(),
            });
        }
        columns.push(column.clone().with_name(name.into()));
    }
    let df = DataFrame::new(columns)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded survey csv"
    );
    Ok(df)
}
