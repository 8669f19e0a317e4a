//! Prediction drift detector.
//!
//! Compares two probability distributions via the Population Stability Index.
//! Bucket edges come from quantiles of the baseline, with the first and last
//! edges clamped to 0.0/1.0; inputs must already be probabilities in [0, 1]
//! (the clamp would silently mis-bin unbounded scores).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PredictionDriftConfig;
use crate::error::{DriftGateError, Result};
use crate::stats::{mean, percentile, percentile_sorted};

/// Outcome of one prediction drift detection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDriftResult {
    pub passed: bool,
    pub warnings: Vec<String>,
    pub stats: PredictionDriftStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDriftStats {
    pub psi: f64,
    pub baseline: ProbStats,
    pub current: ProbStats,
}

/// Summary statistics for one probability array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbStats {
    pub count: usize,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Detects drift between baseline and current prediction probabilities.
///
/// PSI rules of thumb: below `psi_warn` no drift, between `psi_warn` and
/// `psi_fail` moderate (warned but passing), at or above `psi_fail`
/// significant (failing). The arrays may have different lengths; only the
/// baseline defines the bucket edges.
pub fn detect_prediction_drift(
    baseline_probs: &[f64],
    current_probs: &[f64],
    cfg: &PredictionDriftConfig,
) -> Result<PredictionDriftResult> {
    if baseline_probs.is_empty() || current_probs.is_empty() {
        return Err(DriftGateError::Data(
            "prediction drift requires non-empty baseline and current probability arrays"
                .to_string(),
        ));
    }

    let psi = psi(baseline_probs, current_probs, cfg.bins, cfg.eps);

    let mut warnings: Vec<String> = Vec::new();
    if psi >= cfg.psi_fail {
        warnings.push(format!(
            "PSI indicates significant drift: psi={:.3} (fail >= {:.2})",
            psi, cfg.psi_fail
        ));
    } else if psi >= cfg.psi_warn {
        warnings.push(format!(
            "PSI indicates moderate drift: psi={:.3} (warn >= {:.2})",
            psi, cfg.psi_warn
        ));
    }

    let passed = psi < cfg.psi_fail;
    info!(psi, passed, "prediction drift computed");

    Ok(PredictionDriftResult {
        passed,
        warnings,
        stats: PredictionDriftStats {
            psi,
            baseline: prob_stats(baseline_probs),
            current: prob_stats(current_probs),
        },
    })
}

/// Population Stability Index between two samples.
///
/// Buckets are quantile-defined from `expected`; both samples are counted
/// into those fixed edges, normalized, and clipped to `[eps, 1.0]` before
/// the log-ratio sum. Higher means more drift.
fn psi(expected: &[f64], actual: &[f64], bins: usize, eps: f64) -> f64 {
    let mut sorted = expected.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut breakpoints = Vec::with_capacity(bins + 1);
    for i in 0..=bins {
        let q = i as f64 / bins as f64 * 100.0;
        breakpoints.push(percentile_sorted(&sorted, q));
    }
    // Guarantee full [0,1] coverage regardless of the observed range.
    breakpoints[0] = 0.0;
    breakpoints[bins] = 1.0;

    let exp_counts = histogram(expected, &breakpoints);
    let act_counts = histogram(actual, &breakpoints);

    let exp_total: u64 = exp_counts.iter().sum();
    let act_total: u64 = act_counts.iter().sum();

    let mut value = 0.0;
    for (e, a) in exp_counts.iter().zip(&act_counts) {
        let exp_frac = (*e as f64 / exp_total.max(1) as f64).clamp(eps, 1.0);
        let act_frac = (*a as f64 / act_total.max(1) as f64).clamp(eps, 1.0);
        value += (act_frac - exp_frac) * (act_frac / exp_frac).ln();
    }
    debug!(psi = value, bins, "psi computed");
    value
}

/// Counts values into half-open bins `[edge_i, edge_{i+1})`; the last bin is
/// closed on the right. Values outside the edges are ignored.
fn histogram(values: &[f64], edges: &[f64]) -> Vec<u64> {
    let bins = edges.len() - 1;
    let mut counts = vec![0u64; bins];
    for &v in values {
        for i in 0..bins {
            let last = i == bins - 1;
            if v >= edges[i] && (v < edges[i + 1] || (last && v <= edges[i + 1])) {
                counts[i] += 1;
                break;
            }
        }
    }
    counts
}

fn prob_stats(probs: &[f64]) -> ProbStats {
    ProbStats {
        count: probs.len(),
        mean: mean(probs),
        p50: percentile(probs, 50.0),
        p90: percentile(probs, 90.0),
    }
}
