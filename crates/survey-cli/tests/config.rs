//! Integration tests for config loading and command-line overrides.

use std::fs;
use std::path::Path;

use survey_cli::config::{ConfigError, PrepareOverrides, load_config, parse_config};
use survey_model::{PrepareOptions, RankingPolicy, StratifyPolicy};
use tempfile::TempDir;

const CONFIG: &str = r#"
[prepare]
k = 8
sentinel_codes = [77, 98, 99, -1]
ranking = "absolute"
small_classes = "random-fallback"

[labels]
SOC5B = "How often do you feel isolated?"
Q01 = "Hours online per day"

[ingest]
drop_columns = ["RESPID"]
min_numeric_ratio = 0.8

[ingest.value_map]
Yes = 1
No = 0
"#;

#[test]
fn test_parse_full_config() {
    let config = parse_config(CONFIG, Path::new("survey.toml")).expect("parse config");

    assert_eq!(config.prepare.k, 8);
    assert!(config.prepare.sentinel_codes.contains(&-1));
    assert_eq!(config.prepare.ranking, RankingPolicy::Absolute);
    assert_eq!(config.prepare.small_classes, StratifyPolicy::RandomFallback);
    assert!((config.prepare.test_fraction - 0.2).abs() < 1e-12);

    assert_eq!(config.labels.describe("soc5b"), "How often do you feel isolated?");
    assert_eq!(config.labels.len(), 2);

    assert_eq!(config.ingest.drop_columns, vec!["RESPID"]);
    assert_eq!(config.ingest.value_map.get("Yes"), Some(&1.0));
    assert!((config.ingest.min_numeric_ratio - 0.8).abs() < 1e-12);
}

#[test]
fn test_missing_path_uses_defaults() {
    let config = load_config(None).expect("default config");
    assert_eq!(config.prepare, PrepareOptions::default());
    assert!(config.labels.is_empty());
}

#[test]
fn test_overrides_replace_file_values() {
    let config = parse_config(CONFIG, Path::new("survey.toml"))
        .expect("parse config")
        .with_overrides(&PrepareOverrides {
            k: Some(3),
            sentinel_codes: Some(vec![9]),
            seed: Some(7),
            ranking: Some(RankingPolicy::Signed),
            ..PrepareOverrides::default()
        });

    assert_eq!(config.prepare.k, 3);
    assert_eq!(config.prepare.sentinel_codes.len(), 1);
    assert!(config.prepare.sentinel_codes.contains(&9));
    assert_eq!(config.prepare.seed, 7);
    assert_eq!(config.prepare.ranking, RankingPolicy::Signed);
    assert_eq!(config.prepare.small_classes, StratifyPolicy::RandomFallback);
}

#[test]
fn test_unknown_table_is_rejected() {
    let err = parse_config("[output]\ndir = \"out\"\n", Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("survey.toml");
    fs::write(&path, CONFIG).expect("write config");
    let config = load_config(Some(&path)).expect("load config");
    assert_eq!(config.prepare.k, 8);

    let missing = dir.path().join("missing.toml");
    let err = load_config(Some(&missing)).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
