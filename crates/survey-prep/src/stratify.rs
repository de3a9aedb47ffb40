//! Stratified two-way row splitting.
//!
//! One call splits a set of labelled rows into a held-out side and a
//! remaining side. The held-out size is `ceil(fraction * n)`; it is
//! apportioned across classes by largest remainder so each class keeps its
//! share, with at least one row held out per class and at least `reserve`
//! rows left behind per class.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use survey_model::{ClassLabel, PrepError, Result, SplitStage};

/// Row positions on each side of a split, both ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub held_out: Vec<usize>,
    pub remaining: Vec<usize>,
}

/// Number of rows held out for `fraction` of `rows`, rounded up.
///
/// # Examples
///
/// ```
/// use survey_prep::held_out_size;
///
/// assert_eq!(held_out_size(970, 0.2), 194);
/// assert_eq!(held_out_size(776, 0.1), 78);
/// ```
pub fn held_out_size(rows: usize, fraction: f64) -> usize {
    // Guard against products like 194.00000000000003 rounding up.
    let exact = fraction * rows as f64;
    ((exact - 1e-9).ceil().max(0.0) as usize).min(rows)
}

fn check_sizes(stage: SplitStage, rows: usize, held: usize) -> Result<()> {
    if held == 0 {
        return Err(PrepError::EmptyPartition {
            partition: match stage {
                SplitStage::Test => "test",
                SplitStage::Validation => "validation",
            },
            rows,
        });
    }
    if held >= rows {
        return Err(PrepError::EmptyPartition {
            partition: "train",
            rows,
        });
    }
    Ok(())
}

/// Splits `labels` positions, holding out `fraction` of every class.
///
/// Each class must have at least `reserve + 1` rows so it appears on both
/// sides; `reserve` is the minimum per class kept on the remaining side.
///
/// # Errors
///
/// [`PrepError::EmptyPartition`] when either side would be empty,
/// [`PrepError::Stratification`] for a class that is too small, and
/// [`PrepError::SplitTooSmall`] when the held-out or remaining side cannot
/// hold every class.
pub fn stratified_split<R: Rng + ?Sized>(
    labels: &[ClassLabel],
    fraction: f64,
    stage: SplitStage,
    reserve: usize,
    rng: &mut R,
) -> Result<Split> {
    let rows = labels.len();
    let held = held_out_size(rows, fraction);
    check_sizes(stage, rows, held)?;

    let mut groups: BTreeMap<ClassLabel, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        groups.entry(*label).or_default().push(idx);
    }
    let required = reserve + 1;
    for (label, members) in &groups {
        if members.len() < required {
            return Err(PrepError::Stratification {
                class: label.0,
                count: members.len(),
                required,
            });
        }
    }
    let classes = groups.len();
    if held < classes || rows - held < reserve * classes {
        return Err(PrepError::SplitTooSmall {
            stage,
            rows,
            held_out: held,
            classes,
        });
    }

    let counts: Vec<usize> = groups.values().map(Vec::len).collect();
    let alloc = apportion(&counts, held, reserve).ok_or(PrepError::SplitTooSmall {
        stage,
        rows,
        held_out: held,
        classes,
    })?;

    let mut held_out = Vec::with_capacity(held);
    let mut remaining = Vec::with_capacity(rows - held);
    for (members, take) in groups.into_values().zip(alloc) {
        let mut members = members;
        members.shuffle(rng);
        held_out.extend_from_slice(&members[..take]);
        remaining.extend_from_slice(&members[take..]);
    }
    held_out.sort_unstable();
    remaining.sort_unstable();
    Ok(Split {
        held_out,
        remaining,
    })
}

/// Largest-remainder apportionment of `total` across classes of `counts`.
///
/// Every class receives between 1 and `count - reserve` rows. Returns
/// `None` when no allocation satisfies those bounds.
fn apportion(counts: &[usize], total: usize, reserve: usize) -> Option<Vec<usize>> {
    let rows: usize = counts.iter().sum();
    let ideal: Vec<f64> = counts
        .iter()
        .map(|&count| total as f64 * count as f64 / rows as f64)
        .collect();
    let upper: Vec<usize> = counts.iter().map(|&count| count - reserve).collect();
    let mut alloc: Vec<usize> = ideal
        .iter()
        .zip(&upper)
        .map(|(ideal, &upper)| (ideal.floor() as usize).clamp(1, upper))
        .collect();
    let mut assigned: usize = alloc.iter().sum();

    while assigned < total {
        let mut best: Option<usize> = None;
        for idx in 0..alloc.len() {
            if alloc[idx] >= upper[idx] {
                continue;
            }
            let deficit = ideal[idx] - alloc[idx] as f64;
            if best.is_none_or(|b| deficit > ideal[b] - alloc[b] as f64) {
                best = Some(idx);
            }
        }
        alloc[best?] += 1;
        assigned += 1;
    }
    while assigned > total {
        let mut best: Option<usize> = None;
        for idx in 0..alloc.len() {
            if alloc[idx] <= 1 {
                continue;
            }
            let surplus = alloc[idx] as f64 - ideal[idx];
            if best.is_none_or(|b| surplus > alloc[b] as f64 - ideal[b]) {
                best = Some(idx);
            }
        }
        alloc[best?] -= 1;
        assigned -= 1;
    }
    Some(alloc)
}

/// Splits `rows` positions uniformly at random, ignoring classes.
///
/// # Errors
///
/// [`PrepError::EmptyPartition`] when either side would be empty.
pub fn random_split<R: Rng + ?Sized>(
    rows: usize,
    fraction: f64,
    stage: SplitStage,
    rng: &mut R,
) -> Result<Split> {
    let held = held_out_size(rows, fraction);
    check_sizes(stage, rows, held)?;
    let mut positions: Vec<usize> = (0..rows).collect();
    positions.shuffle(rng);
    let mut held_out = positions[..held].to_vec();
    let mut remaining = positions[held..].to_vec();
    held_out.sort_unstable();
    remaining.sort_unstable();
    Ok(Split {
        held_out,
        remaining,
    })
}
