//! Integration tests for feature selection and partitioning.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use survey_model::{
    ClassLabel, PrepError, PrepareOptions, RankingPolicy, SplitStage, StratifyPolicy,
};
use survey_prep::{
    DatasetPreparer, class_distribution, compute_top_correlated,
    compute_top_correlated_with_policy, prepare_partitions, summarize_partitions,
};

const TARGET: &str = "SOC5B";

/// 1000 survey rows: 970 answers spread evenly over classes 1-5, then 30
/// rows coded 77/98/99. `KEY` is unique per row and tracks the target.
fn survey_frame() -> DataFrame {
    let mut targets: Vec<f64> = (0..970).map(|i| (i % 5 + 1) as f64).collect();
    for code in [77.0, 98.0, 99.0] {
        targets.extend(std::iter::repeat_n(code, 10));
    }
    let mut columns: Vec<Column> = Vec::new();
    let keys: Vec<f64> = targets
        .iter()
        .enumerate()
        .map(|(i, t)| t * 10_000.0 + i as f64)
        .collect();
    columns.push(Series::new("KEY".into(), keys).into_column());
    for j in 1..=11usize {
        let values: Vec<f64> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| t * j as f64 / 11.0 + noise(i, j))
            .collect();
        columns.push(Series::new(format!("Q{j:02}").into(), values).into_column());
    }
    for j in 1..=2usize {
        let values: Vec<f64> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| -t + noise(i, j + 20))
            .collect();
        columns.push(Series::new(format!("NEG{j}").into(), values).into_column());
    }
    columns.push(Series::new(TARGET.into(), targets).into_column());
    DataFrame::new(columns).unwrap()
}

fn noise(i: usize, j: usize) -> f64 {
    ((i * 37 + j * 11) % 17) as f64 - 8.0
}

fn keys(df: &DataFrame) -> Vec<i64> {
    df.column("KEY")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap() as i64)
        .collect()
}

fn small_frame(target: Vec<i64>, features: Vec<(&str, Vec<f64>)>) -> DataFrame {
    let mut columns: Vec<Column> = features
        .into_iter()
        .map(|(name, values)| Series::new(name.into(), values).into_column())
        .collect();
    columns.push(Series::new(TARGET.into(), target).into_column());
    DataFrame::new(columns).unwrap()
}

#[test]
fn top_correlated_returns_k_distinct_non_target_columns() {
    let df = survey_frame();
    let selection = compute_top_correlated(&df, TARGET, 10).unwrap();
    assert_eq!(selection.len(), 10);
    assert_eq!(selection.target(), TARGET);
    let distinct: BTreeSet<&String> = selection.features().iter().collect();
    assert_eq!(distinct.len(), 10);
    assert!(selection.features().iter().all(|name| name != TARGET));
    assert_eq!(selection.features()[0], "KEY");
}

#[test]
fn top_correlated_is_idempotent() {
    let df = survey_frame();
    let first = compute_top_correlated(&df, TARGET, 10).unwrap();
    let second = compute_top_correlated(&df, TARGET, 10).unwrap();
    assert_eq!(first, second);
}

#[test]
fn signed_ranking_skips_negative_columns_absolute_keeps_them() {
    let df = survey_frame();
    let signed = compute_top_correlated(&df, TARGET, 10).unwrap();
    assert!(!signed.features().iter().any(|name| name.starts_with("NEG")));

    let absolute =
        compute_top_correlated_with_policy(&df, TARGET, 10, RankingPolicy::Absolute).unwrap();
    assert!(absolute.features().iter().any(|name| name.starts_with("NEG")));
}

#[test]
fn k_equal_to_candidate_count_returns_all_ranked() {
    let df = small_frame(
        vec![1, 2, 3, 4],
        vec![
            ("LOW", vec![1.0, 3.0, 2.0, 4.0]),
            ("HIGH", vec![1.0, 2.0, 3.0, 4.0]),
            ("NEG", vec![4.0, 3.0, 2.0, 1.0]),
        ],
    );
    let selection = compute_top_correlated(&df, TARGET, 3).unwrap();
    assert_eq!(selection.features(), ["HIGH", "LOW", "NEG"]);
}

#[test]
fn schema_errors_surface_immediately() {
    let df = survey_frame();
    assert!(matches!(
        compute_top_correlated(&df, "SOC5Z", 10),
        Err(PrepError::ColumnNotFound { column }) if column == "SOC5Z"
    ));
    assert!(matches!(
        compute_top_correlated(&df, TARGET, 15),
        Err(PrepError::InsufficientColumns {
            requested: 15,
            available: 14
        })
    ));
    assert!(matches!(
        compute_top_correlated(&df, TARGET, 0),
        Err(PrepError::InvalidK)
    ));
}

#[test]
fn survey_scenario_partition_sizes() {
    let df = survey_frame();
    let sentinels: BTreeSet<i64> = [77, 98, 99].into_iter().collect();
    let (train, test, validation) = prepare_partitions(&df, TARGET, 10, &sentinels, 0.2, 0.1).unwrap();
    assert_eq!(test.height(), 194);
    assert_eq!(validation.height(), 78);
    assert_eq!(train.height(), 698);
    assert_eq!(train.width(), 11);
    assert_eq!(train.get_column_names(), test.get_column_names());
    assert_eq!(train.get_column_names(), validation.get_column_names());
    assert_eq!(
        train.get_column_names().last().map(|name| name.as_str()),
        Some(TARGET)
    );
}

#[test]
fn partitions_are_disjoint_and_cover_filtered_rows() {
    let df = survey_frame();
    let partitions = DatasetPreparer::default().prepare(&df, TARGET).unwrap();
    assert_eq!(partitions.excluded_rows, 30);
    assert_eq!(partitions.total_rows(), 970);

    let mut seen = BTreeSet::new();
    for (_, frame) in partitions.named() {
        for key in keys(frame) {
            assert!(seen.insert(key), "row {key} appears twice");
        }
    }
    assert_eq!(seen.len(), 970);
}

#[test]
fn no_sentinel_reaches_any_partition() {
    let df = survey_frame();
    let partitions = DatasetPreparer::default().prepare(&df, TARGET).unwrap();
    for (name, frame) in partitions.named() {
        let counts = class_distribution(frame, TARGET).unwrap();
        for code in [77, 98, 99] {
            assert!(
                !counts.contains_key(&ClassLabel(code)),
                "{name} holds sentinel {code}"
            );
        }
    }
}

#[test]
fn partitions_preserve_class_proportions() {
    let df = survey_frame();
    let partitions = DatasetPreparer::default().prepare(&df, TARGET).unwrap();
    for summary in summarize_partitions(&partitions).unwrap() {
        assert_eq!(summary.classes.len(), 5, "{} is missing a class", summary.name);
        for class in 1..=5 {
            let share = summary.proportion(ClassLabel(class));
            assert!(
                (share - 0.2).abs() <= 0.02,
                "{} class {class} share {share}",
                summary.name
            );
        }
    }
}

#[test]
fn preparation_does_not_mutate_input() {
    let df = survey_frame();
    let snapshot = df.clone();
    let _ = DatasetPreparer::default().prepare(&df, TARGET).unwrap();
    assert!(df.equals_missing(&snapshot));
}

#[test]
fn seed_controls_assignment() {
    let df = survey_frame();
    let a = DatasetPreparer::new(PrepareOptions::new().with_seed(1))
        .prepare(&df, TARGET)
        .unwrap();
    let b = DatasetPreparer::new(PrepareOptions::new().with_seed(1))
        .prepare(&df, TARGET)
        .unwrap();
    let c = DatasetPreparer::new(PrepareOptions::new().with_seed(2))
        .prepare(&df, TARGET)
        .unwrap();
    assert_eq!(keys(&a.test), keys(&b.test));
    assert_ne!(keys(&a.test), keys(&c.test));
}

#[test]
fn binary_target_stratifies_into_three_partitions() {
    let target: Vec<i64> = (0..20).map(|i| if i % 2 == 0 { 1 } else { 2 }).collect();
    let feature: Vec<f64> = target.iter().map(|&t| t as f64 * 2.0).collect();
    let other: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let df = small_frame(target, vec![("A", feature), ("B", other)]);
    let partitions = DatasetPreparer::new(PrepareOptions::new().with_k(2))
        .prepare(&df, TARGET)
        .unwrap();
    assert_eq!(partitions.test.height(), 4);
    assert_eq!(partitions.validation.height(), 2);
    assert_eq!(partitions.train.height(), 14);
    for summary in summarize_partitions(&partitions).unwrap() {
        let expected: BTreeMap<ClassLabel, usize> = match summary.name {
            "test" => [(ClassLabel(1), 2), (ClassLabel(2), 2)].into(),
            "validation" => [(ClassLabel(1), 1), (ClassLabel(2), 1)].into(),
            _ => [(ClassLabel(1), 7), (ClassLabel(2), 7)].into(),
        };
        assert_eq!(summary.classes, expected, "{}", summary.name);
    }
}

fn rare_class_frame() -> DataFrame {
    let mut target: Vec<i64> = (0..30).map(|i| i % 2 + 1).collect();
    target.push(3);
    target.push(3);
    let feature: Vec<f64> = target.iter().map(|&t| t as f64).collect();
    let other: Vec<f64> = (0..target.len()).map(|i| (i % 7) as f64).collect();
    small_frame(target, vec![("A", feature), ("B", other)])
}

#[test]
fn rare_class_fails_under_strict_policy() {
    let df = rare_class_frame();
    let err = DatasetPreparer::new(PrepareOptions::new().with_k(2))
        .prepare(&df, TARGET)
        .unwrap_err();
    assert!(matches!(
        err,
        PrepError::Stratification {
            class: 3,
            count: 2,
            required: 3
        }
    ));
}

#[test]
fn rare_class_falls_back_to_random_split() {
    let df = rare_class_frame();
    let options = PrepareOptions::new()
        .with_k(2)
        .with_small_classes(StratifyPolicy::RandomFallback);
    let partitions = DatasetPreparer::new(options).prepare(&df, TARGET).unwrap();
    assert_eq!(partitions.total_rows(), 32);
    assert_eq!(partitions.test.height(), 7);
    assert!(partitions.validation.height() > 0);
    assert!(partitions.train.height() > 0);
}

#[test]
fn tiny_dataset_reports_split_stage() {
    // 6 rows, 2 classes: test takes 2, remainder 4 leaves 1 validation row.
    let df = small_frame(
        vec![1, 1, 1, 2, 2, 2],
        vec![("A", vec![1.0, 2.0, 1.0, 5.0, 6.0, 5.0])],
    );
    let err = DatasetPreparer::new(PrepareOptions::new().with_k(1).with_val_fraction(0.1))
        .prepare(&df, TARGET)
        .unwrap_err();
    assert!(matches!(
        err,
        PrepError::SplitTooSmall {
            stage: SplitStage::Validation,
            ..
        }
    ));
}

#[test]
fn invalid_fractions_are_rejected_before_work() {
    let df = survey_frame();
    let sentinels = BTreeSet::new();
    assert!(matches!(
        prepare_partitions(&df, TARGET, 10, &sentinels, 0.0, 0.1),
        Err(PrepError::InvalidFraction {
            name: "test_fraction",
            ..
        })
    ));
}
