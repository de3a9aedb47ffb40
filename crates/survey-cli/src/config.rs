//! TOML configuration for the `survey` command.
//!
//! ```toml
//! [prepare]
//! k = 8
//! sentinel_codes = [77, 98, 99]
//! ranking = "absolute"
//! small_classes = "random-fallback"
//!
//! [labels]
//! SOC5B = "How often do you feel isolated?"
//!
//! [ingest]
//! drop_columns = ["RESPID"]
//! value_map = { Yes = 1, No = 0 }
//! ```
//!
//! Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use survey_ingest::IngestOptions;
use survey_model::{PrepareOptions, QuestionLabels, RankingPolicy, StratifyPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of a `survey` config file; every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrepConfig {
    pub prepare: PrepareOptions,
    pub labels: QuestionLabels,
    pub ingest: IngestOptions,
}

impl PrepConfig {
    /// Applies command-line overrides on top of the file's `[prepare]` table.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &PrepareOverrides) -> Self {
        let options = &mut self.prepare;
        if let Some(k) = overrides.k {
            options.k = k;
        }
        if let Some(codes) = &overrides.sentinel_codes {
            options.sentinel_codes = codes.iter().copied().collect();
        }
        if let Some(fraction) = overrides.test_fraction {
            options.test_fraction = fraction;
        }
        if let Some(fraction) = overrides.val_fraction {
            options.val_fraction = fraction;
        }
        if let Some(seed) = overrides.seed {
            options.seed = seed;
        }
        if let Some(ranking) = overrides.ranking {
            options.ranking = ranking;
        }
        if let Some(policy) = overrides.small_classes {
            options.small_classes = policy;
        }
        self
    }
}

/// Preparation settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PrepareOverrides {
    pub k: Option<usize>,
    pub sentinel_codes: Option<Vec<i64>>,
    pub test_fraction: Option<f64>,
    pub val_fraction: Option<f64>,
    pub seed: Option<u64>,
    pub ranking: Option<RankingPolicy>,
    pub small_classes: Option<StratifyPolicy>,
}

/// Parses a config from TOML text.
pub fn parse_config(text: &str, path: &Path) -> Result<PrepConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a config file, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<PrepConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(PrepConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}
