//! Small numeric helpers shared by the drift detectors.

/// Arithmetic mean. Returns 0.0 for an empty slice; callers are expected to
/// guard on emptiness themselves.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Percentile with linear interpolation between closest ranks, `p` in
/// [0, 100]. Sorts an internal copy, so input order does not matter.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    assert!(!values.is_empty(), "percentile of empty slice");
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-finite value in percentile input"));
    percentile_sorted(&sorted, p)
}

/// Percentile over an already-sorted slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "percentile of empty slice");
    let p = p.clamp(0.0, 100.0);
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Relative change from `a` to `b`.
///
/// Conventions: both zero gives 0.0; a zero baseline with a nonzero current
/// value gives +infinity so threshold comparisons still trip.
pub fn pct_change(a: f64, b: f64) -> f64 {
    if a == 0.0 {
        if b != 0.0 {
            return f64::INFINITY;
        }
        return 0.0;
    }
    (b - a) / a
}
