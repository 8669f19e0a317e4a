//! Binary classification metrics and evaluation-split fallbacks.
//!
//! Thresholded metrics (accuracy/precision/recall/f1) are always defined;
//! ROC-AUC and PR-AUC need both classes present and come back as `None`
//! otherwise, which the gate engine treats as a failing condition.

use tracing::warn;

use crate::error::{DriftGateError, Result};
use crate::types::{Record, SplitMetrics};

/// How many records to carve from train into each holdout when both val and
/// test came back empty. A CI-sized-dataset accommodation, not a general
/// small-sample strategy.
pub const HOLDOUT_CARVE: usize = 1;

/// Computes threshold metrics plus ranking metrics for one split.
///
/// `y_pred` is `prob >= threshold`. Precision/recall/f1 use zero-division
/// zero. ROC-AUC uses the rank statistic with average ranks for ties; PR-AUC
/// is step-wise average precision.
pub fn compute_metrics(y_true: &[u8], y_prob: &[f64], threshold: f64) -> SplitMetrics {
    debug_assert_eq!(y_true.len(), y_prob.len());

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut tn = 0usize;
    for (&t, &p) in y_true.iter().zip(y_prob) {
        let pred = p >= threshold;
        match (t, pred) {
            (1, true) => tp += 1,
            (0, true) => fp += 1,
            (1, false) => fn_ += 1,
            _ => tn += 1,
        }
    }

    let total = y_true.len().max(1);
    let accuracy = (tp + tn) as f64 / total as f64;
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    SplitMetrics {
        accuracy,
        precision,
        recall,
        f1,
        roc_auc: roc_auc(y_true, y_prob),
        pr_auc: average_precision(y_true, y_prob),
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// ROC-AUC via the Mann-Whitney rank statistic, averaging ranks over tied
/// scores. `None` when only one class is present.
fn roc_auc(y_true: &[u8], y_prob: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..y_prob.len()).collect();
    order.sort_by(|&a, &b| {
        y_prob[a]
            .partial_cmp(&y_prob[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks within tied groups (1-based ranks).
    let mut ranks = vec![0.0; y_prob.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&t, _)| t == 1)
        .map(|(_, &r)| r)
        .sum();
    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos * n_neg) as f64)
}

/// Step-wise average precision: `sum((R_n - R_{n-1}) * P_n)` over distinct
/// score thresholds in descending order. `None` when only one class is
/// present.
fn average_precision(y_true: &[u8], y_prob: &[f64]) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..y_prob.len()).collect();
    order.sort_by(|&a, &b| {
        y_prob[b]
            .partial_cmp(&y_prob[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ap = 0.0;
    let mut tp = 0usize;
    let mut seen = 0usize;
    let mut prev_recall = 0.0;
    let mut i = 0;
    while i < order.len() {
        // Consume the whole tied-score group before scoring the threshold.
        let mut j = i;
        while j + 1 < order.len() && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        for &idx in &order[i..=j] {
            seen += 1;
            if y_true[idx] == 1 {
                tp += 1;
            }
        }
        let precision = tp as f64 / seen as f64;
        let recall = tp as f64 / n_pos as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
        i = j + 1;
    }
    Some(ap)
}

/// Ensures usable val/test evaluation splits for tiny datasets.
///
/// Fallback ladder mirrors the training pipeline: an empty val borrows test,
/// an empty test borrows val, and when both are empty [`HOLDOUT_CARVE`]
/// records are carved off the front of train into each. An empty or
/// too-small train split fails loudly instead of producing an unusable
/// model.
pub fn resolve_eval_splits(
    mut train: Vec<Record>,
    mut val: Vec<Record>,
    mut test: Vec<Record>,
) -> Result<(Vec<Record>, Vec<Record>, Vec<Record>)> {
    if train.is_empty() {
        return Err(DriftGateError::Data(
            "Training split is empty; cannot train model".to_string(),
        ));
    }

    if val.is_empty() && !test.is_empty() {
        warn!("val split empty; evaluating val on the test split");
        val = test.clone();
    } else if test.is_empty() && !val.is_empty() {
        warn!("test split empty; evaluating test on the val split");
        test = val.clone();
    } else if val.is_empty() && test.is_empty() {
        if train.len() < HOLDOUT_CARVE + 1 {
            return Err(DriftGateError::Data(
                "Not enough samples to create a holdout split".to_string(),
            ));
        }
        warn!(
            carve = HOLDOUT_CARVE,
            "val and test splits empty; carving holdout from train"
        );
        let carved: Vec<Record> = train.drain(..HOLDOUT_CARVE).collect();
        val = carved.clone();
        test = carved;
    }

    Ok((train, val, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, label: u8) -> Record {
        Record {
            id: id.to_string(),
            text: format!("text for {}", id),
            label,
            source: "unit".to_string(),
            subject: None,
            date: None,
            split: None,
        }
    }

    #[test]
    fn test_perfect_classifier() {
        let y_true = [0, 0, 1, 1];
        let y_prob = [0.1, 0.2, 0.8, 0.9];
        let m = compute_metrics(&y_true, &y_prob, 0.5);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
        assert_eq!(m.roc_auc, Some(1.0));
        assert_eq!(m.pr_auc, Some(1.0));
    }

    #[test]
    fn test_inverted_classifier_has_zero_auc() {
        let y_true = [1, 1, 0, 0];
        let y_prob = [0.1, 0.2, 0.8, 0.9];
        let m = compute_metrics(&y_true, &y_prob, 0.5);
        assert_eq!(m.roc_auc, Some(0.0));
    }

    #[test]
    fn test_single_class_has_no_ranking_metrics() {
        let y_true = [1, 1, 1];
        let y_prob = [0.7, 0.8, 0.9];
        let m = compute_metrics(&y_true, &y_prob, 0.5);
        assert_eq!(m.roc_auc, None);
        assert_eq!(m.pr_auc, None);
        // Threshold metrics still defined.
        assert_eq!(m.recall, 1.0);
    }

    #[test]
    fn test_zero_division_yields_zero() {
        // Nothing predicted positive: precision and f1 fall back to 0.
        let y_true = [1, 0];
        let y_prob = [0.1, 0.2];
        let m = compute_metrics(&y_true, &y_prob, 0.5);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.accuracy, 0.5);
    }

    #[test]
    fn test_tied_scores_average_ranks() {
        // Positive and negative share the score 0.5; AUC should be 0.5
        // between them, not 0 or 1.
        let y_true = [0, 1];
        let y_prob = [0.5, 0.5];
        let m = compute_metrics(&y_true, &y_prob, 0.5);
        assert_eq!(m.roc_auc, Some(0.5));
    }

    #[test]
    fn test_resolve_borrows_test_for_empty_val() {
        let train = vec![record("t1", 0), record("t2", 1)];
        let test = vec![record("h1", 1)];
        let (tr, va, te) = resolve_eval_splits(train, vec![], test).unwrap();
        assert_eq!(tr.len(), 2);
        assert_eq!(va.len(), 1);
        assert_eq!(va[0].id, "h1");
        assert_eq!(te.len(), 1);
    }

    #[test]
    fn test_resolve_carves_holdout_when_both_empty() {
        let train = vec![record("a", 0), record("b", 1), record("c", 0)];
        let (tr, va, te) = resolve_eval_splits(train, vec![], vec![]).unwrap();
        assert_eq!(tr.len(), 2);
        assert_eq!(va.len(), HOLDOUT_CARVE);
        assert_eq!(te.len(), HOLDOUT_CARVE);
        assert_eq!(va[0].id, "a");
        assert_eq!(te[0].id, "a");
    }

    #[test]
    fn test_resolve_fails_on_empty_train() {
        let err = resolve_eval_splits(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DriftGateError::Data(_)));
    }

    #[test]
    fn test_resolve_fails_when_train_too_small_to_carve() {
        let err = resolve_eval_splits(vec![record("only", 1)], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DriftGateError::Data(_)));
    }
}
