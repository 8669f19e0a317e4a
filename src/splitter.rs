//! Stratified train/val/test splitter.
//!
//! Partitions a labeled dataset into splits that approximate the configured
//! fractions while preserving class proportions where feasible. Tiny or
//! heavily imbalanced datasets degrade gracefully to non-stratified shuffles
//! instead of erroring, so CI-sized samples still produce usable splits.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::SplitConfig;
use crate::error::Result;
use crate::types::{Record, Split};

/// Assigns a split to every record.
///
/// Two-stage procedure: carve `train` off the full set, then divide the
/// remainder into `val`/`test` using `test_size / (1 - train_size)` as the
/// test fraction of the remainder. Each stage stratifies by label only when
/// there is room for at least one holdout sample per class.
///
/// Output preserves the input row order and count; the assignment is written
/// into each record's `split` field. Identical `(records, config)` inputs
/// always produce identical assignments.
pub fn split(records: &[Record], cfg: &SplitConfig) -> Result<Vec<Record>> {
    cfg.validate()?;

    let mut out: Vec<Record> = records.to_vec();

    // Everything goes to train: no shuffle, no RNG.
    if cfg.train_size == 1.0 {
        for record in &mut out {
            record.split = Some(Split::Train);
        }
        return Ok(out);
    }

    let n = out.len();
    let labels: Vec<u8> = out.iter().map(|r| r.label).collect();
    let n_classes = count_classes(&labels);

    // Stratification needs room for one holdout sample per class.
    let holdout_size = (n as f64 * (1.0 - cfg.train_size)).round() as usize;
    let stratify_first = holdout_size >= n_classes && can_stratify(&labels);

    let mut rng = Xoshiro256Plus::seed_from_u64(cfg.random_seed);
    let all_indices: Vec<usize> = (0..n).collect();
    let (train_idx, temp_idx) =
        partition(&all_indices, &labels, cfg.train_size, stratify_first, &mut rng);

    for &i in &train_idx {
        out[i].split = Some(Split::Train);
    }
    debug!(
        train = train_idx.len(),
        remainder = temp_idx.len(),
        stratified = stratify_first,
        "first-stage split done"
    );

    if temp_idx.is_empty() {
        return Ok(out);
    }

    // With a zero-sized val or test there is nothing left to divide.
    if cfg.val_size == 0.0 {
        for &i in &temp_idx {
            out[i].split = Some(Split::Test);
        }
        return Ok(out);
    }
    if cfg.test_size == 0.0 {
        for &i in &temp_idx {
            out[i].split = Some(Split::Val);
        }
        return Ok(out);
    }

    // Remainder too small to divide again; hand it all to test.
    if temp_idx.len() <= n_classes {
        for &i in &temp_idx {
            out[i].split = Some(Split::Test);
        }
        return Ok(out);
    }

    let test_frac = cfg.test_size / (1.0 - cfg.train_size);
    let temp_labels: Vec<u8> = temp_idx.iter().map(|&i| labels[i]).collect();
    let stratify_second =
        temp_idx.len() >= (2 * n_classes).max(4) && can_stratify(&temp_labels);

    let (val_idx, test_idx) =
        partition(&temp_idx, &labels, 1.0 - test_frac, stratify_second, &mut rng);

    for &i in &val_idx {
        out[i].split = Some(Split::Val);
    }
    for &i in &test_idx {
        out[i].split = Some(Split::Test);
    }

    info!(
        rows = n,
        train = train_idx.len(),
        val = val_idx.len(),
        test = test_idx.len(),
        seed = cfg.random_seed,
        "split assigned"
    );
    Ok(out)
}

/// A label set is stratifiable when it has at least two classes and the
/// minority class has at least two members.
fn can_stratify(labels: &[u8]) -> bool {
    let counts = class_counts(labels);
    counts.len() >= 2 && counts.values().all(|&c| c >= 2)
}

fn count_classes(labels: &[u8]) -> usize {
    class_counts(labels).len()
}

fn class_counts(labels: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Shuffles `indices` and returns (first, second) where the first part holds
/// `floor(len * first_frac)` entries. When stratifying, per-class counts are
/// allocated by largest remainder so class proportions carry over.
fn partition(
    indices: &[usize],
    labels: &[u8],
    first_frac: f64,
    stratify: bool,
    rng: &mut Xoshiro256Plus,
) -> (Vec<usize>, Vec<usize>) {
    let n = indices.len();
    let n_first = (n as f64 * first_frac).floor() as usize;

    if !stratify {
        let mut shuffled = indices.to_vec();
        shuffled.shuffle(rng);
        let second = shuffled.split_off(n_first);
        return (shuffled, second);
    }

    // Deterministic class order via BTreeMap, then a seeded shuffle per class.
    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for &i in indices {
        by_class.entry(labels[i]).or_default().push(i);
    }

    // Largest-remainder allocation of n_first across classes.
    let mut base: Vec<(u8, usize, f64)> = by_class
        .iter()
        .map(|(&label, members)| {
            let exact = members.len() as f64 * first_frac;
            (label, exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let allocated: usize = base.iter().map(|(_, b, _)| b).sum();
    let mut extras = n_first.saturating_sub(allocated);

    // Hand the leftovers to the classes with the largest fractional parts.
    base.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    let mut take: BTreeMap<u8, usize> = BTreeMap::new();
    for (label, count, _) in &base {
        let bonus = if extras > 0 { 1 } else { 0 };
        extras = extras.saturating_sub(bonus);
        let class_size = by_class[label].len();
        take.insert(*label, (count + bonus).min(class_size));
    }

    let mut first = Vec::with_capacity(n_first);
    let mut second = Vec::with_capacity(n - n_first);
    for (label, members) in &mut by_class {
        members.shuffle(rng);
        let k = take[label];
        first.extend_from_slice(&members[..k]);
        second.extend_from_slice(&members[k..]);
    }
    (first, second)
}
