//! Data drift detector.
//!
//! Compares two text corpora (typically a training baseline and a serving
//! sample) on character-length distribution and top-token overlap. The
//! tokenizer here is deliberately simple and deterministic (lowercase,
//! whitespace split); it is a monitoring tokenizer, not the model's.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::config::DataDriftConfig;
use crate::stats::{mean, pct_change, percentile, std_dev};

/// Outcome of one data drift detection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDriftResult {
    pub passed: bool,
    pub warnings: Vec<String>,
    pub stats: DataDriftStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftStatus {
    Ok,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDriftStats {
    pub status: DriftStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub length: LengthDrift,
    pub tokens: TokenDrift,
}

/// Character-length statistics for one corpus. All fields besides `count`
/// are absent when the corpus has no usable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthDrift {
    pub baseline: LengthStats,
    pub current: LengthStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_shift_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90_shift_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDrift {
    pub top_k: usize,
    pub jaccard_top_tokens: f64,
    pub baseline_top_tokens: Vec<(String, u64)>,
    pub current_top_tokens: Vec<(String, u64)>,
}

/// Compares two corpora and reports drift warnings.
///
/// Both corpora are filtered to non-empty strings first. If either side has
/// nothing usable the result is `passed = true` with `status: skipped` so a
/// sparse monitoring sample never hard-fails the pipeline.
pub fn detect_data_drift(
    baseline_texts: &[String],
    current_texts: &[String],
    cfg: &DataDriftConfig,
) -> DataDriftResult {
    let base_lengths = text_lengths(baseline_texts);
    let cur_lengths = text_lengths(current_texts);

    let base_stats = length_stats(&base_lengths);
    let cur_stats = length_stats(&cur_lengths);

    if base_stats.count == 0 || cur_stats.count == 0 {
        info!(
            baseline = base_stats.count,
            current = cur_stats.count,
            "skipping data drift: insufficient non-empty texts"
        );
        return DataDriftResult {
            passed: true,
            warnings: Vec::new(),
            stats: DataDriftStats {
                status: DriftStatus::Skipped,
                reason: Some(
                    "insufficient non-empty texts to compute drift statistics".to_string(),
                ),
                length: LengthDrift {
                    baseline: base_stats,
                    current: cur_stats,
                    mean_shift_pct: None,
                    p90_shift_pct: None,
                },
                tokens: TokenDrift {
                    top_k: cfg.top_k_tokens,
                    jaccard_top_tokens: 1.0,
                    baseline_top_tokens: Vec::new(),
                    current_top_tokens: Vec::new(),
                },
            },
        };
    }

    let mut warnings: Vec<String> = Vec::new();

    // count > 0 on both sides here, so the unwraps below cannot fire; keep
    // them local to this function.
    let mean_shift = pct_change(
        base_stats.mean.unwrap_or(0.0),
        cur_stats.mean.unwrap_or(0.0),
    );
    let p90_shift = pct_change(base_stats.p90.unwrap_or(0.0), cur_stats.p90.unwrap_or(0.0));

    if mean_shift.abs() >= cfg.length_mean_shift_pct_warn {
        warnings.push(format!(
            "Text length mean shifted by {:.2}% (warn >= {:.0}%)",
            mean_shift * 100.0,
            cfg.length_mean_shift_pct_warn * 100.0
        ));
    }
    if p90_shift.abs() >= cfg.length_p90_shift_pct_warn {
        warnings.push(format!(
            "Text length p90 shifted by {:.2}% (warn >= {:.0}%)",
            p90_shift * 100.0,
            cfg.length_p90_shift_pct_warn * 100.0
        ));
    }

    let base_top = top_tokens(baseline_texts, cfg.top_k_tokens);
    let cur_top = top_tokens(current_texts, cfg.top_k_tokens);

    let base_set: HashSet<&str> = base_top.iter().map(|(t, _)| t.as_str()).collect();
    let cur_set: HashSet<&str> = cur_top.iter().map(|(t, _)| t.as_str()).collect();
    let token_jaccard = jaccard(&base_set, &cur_set);

    if token_jaccard <= cfg.top_token_jaccard_warn {
        warnings.push(format!(
            "Top-{} token overlap low (jaccard={:.2}, warn <= {:.2})",
            cfg.top_k_tokens, token_jaccard, cfg.top_token_jaccard_warn
        ));
    }

    debug!(
        mean_shift,
        p90_shift, token_jaccard, "data drift statistics computed"
    );

    DataDriftResult {
        passed: warnings.is_empty(),
        warnings,
        stats: DataDriftStats {
            status: DriftStatus::Ok,
            reason: None,
            length: LengthDrift {
                baseline: base_stats,
                current: cur_stats,
                mean_shift_pct: Some(mean_shift),
                p90_shift_pct: Some(p90_shift),
            },
            tokens: TokenDrift {
                top_k: cfg.top_k_tokens,
                jaccard_top_tokens: token_jaccard,
                baseline_top_tokens: base_top,
                current_top_tokens: cur_top,
            },
        },
    }
}

/// Character lengths of the non-empty texts.
fn text_lengths(texts: &[String]) -> Vec<f64> {
    texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.chars().count() as f64)
        .collect()
}

fn length_stats(lengths: &[f64]) -> LengthStats {
    if lengths.is_empty() {
        return LengthStats {
            count: 0,
            mean: None,
            std: None,
            p50: None,
            p90: None,
            p99: None,
        };
    }
    LengthStats {
        count: lengths.len(),
        mean: Some(mean(lengths)),
        std: Some(std_dev(lengths)),
        p50: Some(percentile(lengths, 50.0)),
        p90: Some(percentile(lengths, 90.0)),
        p99: Some(percentile(lengths, 99.0)),
    }
}

/// Top-K most frequent tokens across the corpus. Ties break on
/// first-encountered order, so the output is stable across calls.
fn top_tokens(texts: &[String], top_k: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut next_rank = 0usize;
    for text in texts {
        if text.trim().is_empty() {
            continue;
        }
        for token in text.to_lowercase().split_whitespace() {
            let entry = counts.entry(token.to_string()).or_insert_with(|| {
                let rank = next_rank;
                next_rank += 1;
                (0, rank)
            });
            entry.0 += 1;
        }
    }
    let mut ranked: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(token, (count, rank))| (token, count, rank))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(token, count, _)| (token, count))
        .collect()
}

/// Jaccard similarity of two sets; 1.0 when both are empty.
fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_corpora_pass() {
        let texts = corpus(&[
            "president signs new trade bill",
            "markets rally after announcement",
            "senate debates budget proposal",
        ]);
        let result = detect_data_drift(&texts, &texts, &DataDriftConfig::default());
        assert!(result.passed);
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.status, DriftStatus::Ok);
        assert_eq!(result.stats.tokens.jaccard_top_tokens, 1.0);
        assert_eq!(result.stats.length.mean_shift_pct, Some(0.0));
    }

    #[test]
    fn test_length_shift_warns() {
        let baseline = vec!["short text".to_string(); 20];
        let current = vec!["word ".repeat(600); 20];
        let result = detect_data_drift(&baseline, &current, &DataDriftConfig::default());
        assert!(!result.passed);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("length mean shifted")));
    }

    #[test]
    fn test_disjoint_vocabulary_warns() {
        let baseline = vec!["alpha beta gamma".to_string(); 10];
        let current = vec!["x y z".to_string(); 10];
        let cfg = DataDriftConfig {
            top_token_jaccard_warn: 0.9,
            // generous length thresholds so only the token check can trip
            length_mean_shift_pct_warn: 10.0,
            length_p90_shift_pct_warn: 10.0,
            ..DataDriftConfig::default()
        };
        let result = detect_data_drift(&baseline, &current, &cfg);
        assert!(!result.passed);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("token overlap low"));
        assert_eq!(result.stats.tokens.jaccard_top_tokens, 0.0);
    }

    #[test]
    fn test_empty_side_skips() {
        let baseline = corpus(&["some news text"]);
        let current = corpus(&["", "   "]);
        let result = detect_data_drift(&baseline, &current, &DataDriftConfig::default());
        assert!(result.passed);
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.status, DriftStatus::Skipped);
        assert!(result.stats.reason.is_some());
        assert_eq!(result.stats.tokens.jaccard_top_tokens, 1.0);
    }

    #[test]
    fn test_zero_baseline_mean_cannot_happen_after_filter() {
        // Whitespace-only strings are filtered, so a usable corpus always
        // has a positive mean and pct_change stays finite.
        let baseline = corpus(&["a"]);
        let current = corpus(&["bb"]);
        let result = detect_data_drift(&baseline, &current, &DataDriftConfig::default());
        assert_eq!(result.stats.length.mean_shift_pct, Some(1.0));
    }

    #[test]
    fn test_top_tokens_stable_tiebreak() {
        let texts = corpus(&["b a", "a b", "c"]);
        let top = top_tokens(&texts, 2);
        // 'b' and 'a' both occur twice; 'b' was seen first.
        assert_eq!(top[0].0, "b");
        assert_eq!(top[1].0, "a");
    }
}
