use serde::{Deserialize, Serialize};

use crate::error::{DriftGateError, Result};

/// Tolerance when checking that split fractions sum to 1.0.
const SPLIT_SUM_TOLERANCE: f64 = 1e-10;

/// Train/val/test split configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_train_size")]
    pub train_size: f64,
    #[serde(default = "default_val_size")]
    pub val_size: f64,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_size: default_train_size(),
            val_size: default_val_size(),
            test_size: default_test_size(),
            random_seed: default_random_seed(),
        }
    }
}

impl SplitConfig {
    /// Rejects fraction sets that do not sum to 1.0 or fall outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("train_size", self.train_size),
            ("val_size", self.val_size),
            ("test_size", self.test_size),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DriftGateError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        let sum = self.train_size + self.val_size + self.test_size;
        if (sum - 1.0).abs() > SPLIT_SUM_TOLERANCE {
            return Err(DriftGateError::Config(format!(
                "train_size + val_size + test_size must equal 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

/// Thresholds for text-corpus drift detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDriftConfig {
    #[serde(default = "default_length_mean_shift_pct_warn")]
    pub length_mean_shift_pct_warn: f64,
    #[serde(default = "default_length_p90_shift_pct_warn")]
    pub length_p90_shift_pct_warn: f64,
    #[serde(default = "default_top_token_jaccard_warn")]
    pub top_token_jaccard_warn: f64,
    #[serde(default = "default_top_k_tokens")]
    pub top_k_tokens: usize,
}

impl Default for DataDriftConfig {
    fn default() -> Self {
        Self {
            length_mean_shift_pct_warn: default_length_mean_shift_pct_warn(),
            length_p90_shift_pct_warn: default_length_p90_shift_pct_warn(),
            top_token_jaccard_warn: default_top_token_jaccard_warn(),
            top_k_tokens: default_top_k_tokens(),
        }
    }
}

/// Thresholds and binning for PSI prediction drift detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDriftConfig {
    #[serde(default = "default_psi_warn")]
    pub psi_warn: f64,
    #[serde(default = "default_psi_fail")]
    pub psi_fail: f64,
    #[serde(default = "default_psi_bins")]
    pub bins: usize,
    #[serde(default = "default_psi_eps")]
    pub eps: f64,
}

impl Default for PredictionDriftConfig {
    fn default() -> Self {
        Self {
            psi_warn: default_psi_warn(),
            psi_fail: default_psi_fail(),
            bins: default_psi_bins(),
            eps: default_psi_eps(),
        }
    }
}

/// Absolute thresholds for one gated model version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateThresholds {
    pub min_f1: f64,
    pub min_pr_auc: f64,
    /// Minimum f1 improvement over the baseline. Only meaningful for the
    /// improved model; the comparative check is skipped when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_improvement_over_v1_f1: Option<f64>,
}

/// Per-version gate thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatesConfig {
    pub v1_baseline: GateThresholds,
    pub v2_improved: GateThresholds,
}

/// Decision-threshold settings shared by training and serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholding {
    #[serde(default = "default_decision_threshold")]
    pub default_threshold: f64,
}

impl Default for Thresholding {
    fn default() -> Self {
        Self {
            default_threshold: default_decision_threshold(),
        }
    }
}

/// Evaluation configuration: release gates plus the decision threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub thresholding: Thresholding,
    pub gates: GatesConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            thresholding: Thresholding::default(),
            gates: GatesConfig {
                v1_baseline: GateThresholds {
                    min_f1: 0.90,
                    min_pr_auc: 0.90,
                    min_improvement_over_v1_f1: None,
                },
                v2_improved: GateThresholds {
                    min_f1: 0.92,
                    min_pr_auc: 0.92,
                    min_improvement_over_v1_f1: Some(0.005),
                },
            },
        }
    }
}

// Default value functions
fn default_train_size() -> f64 {
    0.8
}
fn default_val_size() -> f64 {
    0.1
}
fn default_test_size() -> f64 {
    0.1
}
fn default_random_seed() -> u64 {
    42
}
fn default_length_mean_shift_pct_warn() -> f64 {
    0.20
}
fn default_length_p90_shift_pct_warn() -> f64 {
    0.25
}
fn default_top_token_jaccard_warn() -> f64 {
    0.60
}
fn default_top_k_tokens() -> usize {
    50
}
fn default_psi_warn() -> f64 {
    0.10
}
fn default_psi_fail() -> f64 {
    0.25
}
fn default_psi_bins() -> usize {
    10
}
fn default_psi_eps() -> f64 {
    1e-6
}
fn default_decision_threshold() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_config_default_is_valid() {
        SplitConfig::default().validate().unwrap();
    }

    #[test]
    fn test_split_config_rejects_bad_sum() {
        let cfg = SplitConfig {
            train_size: 0.8,
            val_size: 0.1,
            test_size: 0.2,
            random_seed: 42,
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, DriftGateError::Config(_)));
    }

    #[test]
    fn test_split_config_tolerates_float_noise() {
        let cfg = SplitConfig {
            train_size: 0.7,
            val_size: 0.15,
            test_size: 0.15,
            random_seed: 0,
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn test_split_config_rejects_out_of_range_fraction() {
        let cfg = SplitConfig {
            train_size: 1.2,
            val_size: -0.1,
            test_size: -0.1,
            random_seed: 0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_eval_config_deserializes_partial() {
        let json = r#"{
            "gates": {
                "v1_baseline": {"min_f1": 0.7, "min_pr_auc": 0.7},
                "v2_improved": {"min_f1": 0.75, "min_pr_auc": 0.75, "min_improvement_over_v1_f1": 0.01}
            }
        }"#;
        let cfg: EvalConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.thresholding.default_threshold, 0.5);
        assert_eq!(cfg.gates.v2_improved.min_improvement_over_v1_f1, Some(0.01));
    }
}
