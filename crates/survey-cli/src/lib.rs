//! CLI library components for the survey preparer.

pub mod config;
pub mod logging;
