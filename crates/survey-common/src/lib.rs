//! Shared utilities for the survey preparation crates.
//!
//! Polars helpers used across the workspace: text parsing, numeric dtype
//! checks, header normalization, and column extraction.

pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use values::{column_f64_values, is_numeric_dtype, normalize_header, parse_f64, parse_i64};
