//! Survey value cleaning.
//!
//! Survey exports hold answers such as `"Strongly agree [4]"`,
//! `"[77] Don't know"`, plain numbers, labels like `"Yes"`, or blanks. The
//! cleaner turns every kept column into `Float64` codes with nulls for
//! missing or unusable cells, so the preparer never sees free text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use survey_common::{is_numeric_dtype, parse_f64, parse_i64};

use crate::error::Result;

/// First bracketed integer in a cell, e.g. `Agree [4]` or `[98] Skipped`.
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*(-?\d+)\s*\]").expect("Invalid survey code regex"));

/// A raw cell interpreted at the cleaning boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CellCode {
    /// Integer code taken from a bracketed label.
    Code(i64),
    /// The whole cell parsed as a number.
    Number(f64),
    /// Free text with no code; may still be remapped.
    Text(String),
    Missing,
}

impl CellCode {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Code(code) => Some(*code as f64),
            Self::Number(value) => Some(*value),
            Self::Text(_) | Self::Missing => None,
        }
    }
}

/// Interprets one raw survey cell.
///
/// # Examples
///
/// ```
/// use survey_ingest::{CellCode, extract_code};
///
/// assert_eq!(extract_code("Strongly agree [4]"), CellCode::Code(4));
/// assert_eq!(extract_code("[77] Don't know"), CellCode::Code(77));
/// assert_eq!(extract_code(" 2.5 "), CellCode::Number(2.5));
/// assert_eq!(extract_code("Yes"), CellCode::Text("Yes".to_string()));
/// assert_eq!(extract_code("  "), CellCode::Missing);
/// ```
pub fn extract_code(raw: &str) -> CellCode {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellCode::Missing;
    }
    if let Some(code) = CODE_PATTERN
        .captures(trimmed)
        .and_then(|caps| parse_i64(&caps[1]))
    {
        return CellCode::Code(code);
    }
    match parse_f64(trimmed) {
        Some(value) => CellCode::Number(value),
        None => CellCode::Text(trimmed.to_string()),
    }
}

/// Options for cleaning a raw survey frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Columns removed before cleaning (identifiers, free-text answers).
    pub drop_columns: Vec<String>,
    /// Text-to-code map applied to every column, e.g. `Yes = 1`.
    pub value_map: BTreeMap<String, f64>,
    /// Per-column text-to-code maps; checked before `value_map`.
    pub column_value_maps: BTreeMap<String, BTreeMap<String, f64>>,
    /// Minimum share of non-missing cells that must yield a code for a
    /// text column to be kept.
    pub min_numeric_ratio: f64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            drop_columns: Vec::new(),
            value_map: BTreeMap::new(),
            column_value_maps: BTreeMap::new(),
            min_numeric_ratio: 0.9,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_drop_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_value(mut self, text: impl Into<String>, code: f64) -> Self {
        self.value_map.insert(text.into(), code);
        self
    }

    #[must_use]
    pub fn with_column_value(
        mut self,
        column: impl Into<String>,
        text: impl Into<String>,
        code: f64,
    ) -> Self {
        self.column_value_maps
            .entry(column.into())
            .or_default()
            .insert(text.into(), code);
        self
    }

    #[must_use]
    pub fn with_min_numeric_ratio(mut self, ratio: f64) -> Self {
        self.min_numeric_ratio = ratio;
        self
    }

    fn is_dropped(&self, column: &str) -> bool {
        self.drop_columns
            .iter()
            .any(|name| name.eq_ignore_ascii_case(column))
    }

    fn remap(&self, column: &str, text: &str) -> Option<f64> {
        let column_map = self
            .column_value_maps
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, map)| map);
        column_map
            .and_then(|map| lookup(map, text))
            .or_else(|| lookup(&self.value_map, text))
    }
}

fn lookup(map: &BTreeMap<String, f64>, text: &str) -> Option<f64> {
    map.iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(text))
        .map(|(_, code)| *code)
}

/// What the cleaner removed or could not interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Columns removed by `drop_columns`.
    pub dropped_columns: Vec<String>,
    /// Columns removed for being mostly free text.
    pub text_columns: Vec<String>,
    /// Columns with no non-missing cells.
    pub empty_columns: Vec<String>,
    /// Per column, cells whose text had no code and were set to null.
    pub unparsed_cells: BTreeMap<String, usize>,
    /// Cells converted through a value map.
    pub remapped_cells: usize,
}

/// A frame of `Float64` code columns plus the cleaning report.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub frame: DataFrame,
    pub report: CleanReport,
}

struct ColumnCodes {
    values: Vec<Option<f64>>,
    present: usize,
    parsed: usize,
    remapped: usize,
}

fn code_column(column: &Column, options: &IngestOptions) -> Result<ColumnCodes> {
    let name = column.name().as_str();
    if is_numeric_dtype(column.dtype()) {
        let cast = column.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
        let present = values.iter().flatten().count();
        return Ok(ColumnCodes {
            values,
            present,
            parsed: present,
            remapped: 0,
        });
    }
    let text = column.cast(&DataType::String)?;
    let mut codes = ColumnCodes {
        values: Vec::with_capacity(text.len()),
        present: 0,
        parsed: 0,
        remapped: 0,
    };
    for cell in text.str()? {
        let value = match cell.map(extract_code).unwrap_or(CellCode::Missing) {
            CellCode::Missing => None,
            CellCode::Text(label) => {
                codes.present += 1;
                let mapped = options.remap(name, &label);
                if mapped.is_some() {
                    codes.parsed += 1;
                    codes.remapped += 1;
                }
                mapped
            }
            code => {
                codes.present += 1;
                codes.parsed += 1;
                code.as_f64()
            }
        };
        codes.values.push(value);
    }
    Ok(codes)
}

/// Converts every kept column of `df` into `Float64` survey codes.
///
/// # Errors
///
/// Returns [`crate::IngestError::DataFrame`] if a column cannot be read.
pub fn clean_dataset(df: &DataFrame, options: &IngestOptions) -> Result<CleanedDataset> {
    let mut report = CleanReport::default();
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let name = column.name().to_string();
        if options.is_dropped(&name) {
            report.dropped_columns.push(name);
            continue;
        }
        let codes = code_column(column, options)?;
        if codes.present == 0 {
            debug!(column = %name, "dropping empty column");
            report.empty_columns.push(name);
            continue;
        }
        let ratio = codes.parsed as f64 / codes.present as f64;
        if ratio < options.min_numeric_ratio {
            warn!(column = %name, ratio, "dropping free-text column");
            report.text_columns.push(name);
            continue;
        }
        let unparsed = codes.present - codes.parsed;
        if unparsed > 0 {
            debug!(column = %name, unparsed, "nulled cells without a code");
            report.unparsed_cells.insert(name.clone(), unparsed);
        }
        report.remapped_cells += codes.remapped;
        columns.push(Series::new(name.into(), codes.values).into_column());
    }
    let frame = DataFrame::new(columns)?;
    info!(
        columns = frame.width(),
        rows = frame.height(),
        dropped = report.dropped_columns.len() + report.text_columns.len() + report.empty_columns.len(),
        remapped = report.remapped_cells,
        "cleaned survey data"
    );
    Ok(CleanedDataset { frame, report })
}
