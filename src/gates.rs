//! Evaluation gate engine.
//!
//! Threshold- and delta-based pass/fail decisions over metrics reports.
//! Gates never short-circuit: every failing condition appends its own
//! message, in a fixed check order, so a red pipeline shows the full picture.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::config::EvalConfig;
use crate::error::DriftGateError;
use crate::types::MetricsReport;

/// Which model generation is being gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVersion {
    V1Baseline,
    V2Improved,
}

impl GateVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateVersion::V1Baseline => "v1_baseline",
            GateVersion::V2Improved => "v2_improved",
        }
    }
}

impl fmt::Display for GateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateVersion {
    type Err = DriftGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1_baseline" => Ok(GateVersion::V1Baseline),
            "v2_improved" => Ok(GateVersion::V2Improved),
            other => Err(DriftGateError::Config(format!(
                "Unknown gate version '{}', expected v1_baseline or v2_improved",
                other
            ))),
        }
    }
}

/// Outcome of one gate evaluation. Does not persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub passed: bool,
    pub failures: Vec<String>,
}

/// Evaluates release gates for `report` under `version`'s thresholds.
///
/// The baseline gate checks absolute `min_f1`/`min_pr_auc` thresholds against
/// the test split. The improved gate adds an optional comparative check:
/// when the config carries `min_improvement_over_v1_f1` and a prior report is
/// supplied, v2's test f1 must beat v1's by at least that margin. A missing
/// f1 on either side of the comparison is itself a failure; a missing prior
/// report skips the comparison entirely.
pub fn check_gates(
    report: &MetricsReport,
    cfg: &EvalConfig,
    version: GateVersion,
    prior_report: Option<&MetricsReport>,
) -> GateResult {
    let gates = match version {
        GateVersion::V1Baseline => &cfg.gates.v1_baseline,
        GateVersion::V2Improved => &cfg.gates.v2_improved,
    };
    let label = match version {
        GateVersion::V1Baseline => "test",
        GateVersion::V2Improved => "v2 test",
    };

    let mut failures: Vec<String> = Vec::new();

    let f1 = report.test.as_ref().map(|m| m.f1);
    let pr_auc = report.test.as_ref().and_then(|m| m.pr_auc);

    if f1.map_or(true, |v| v < gates.min_f1) {
        failures.push(format!(
            "Gate failed: {} f1 {} < min_f1 {}",
            label,
            fmt_metric(f1),
            gates.min_f1
        ));
    }
    if pr_auc.map_or(true, |v| v < gates.min_pr_auc) {
        failures.push(format!(
            "Gate failed: {} pr_auc {} < min_pr_auc {}",
            label,
            fmt_metric(pr_auc),
            gates.min_pr_auc
        ));
    }

    // Comparative check, improved gate only, and only when a baseline exists.
    if version == GateVersion::V2Improved {
        if let (Some(min_improve), Some(prior)) =
            (gates.min_improvement_over_v1_f1, prior_report)
        {
            let f1_v1 = prior.test.as_ref().map(|m| m.f1);
            match (f1, f1_v1) {
                (Some(f1_v2), Some(f1_v1)) => {
                    let delta = f1_v2 - f1_v1;
                    if delta < min_improve {
                        failures.push(format!(
                            "Gate failed: v2 f1 improvement {:.4} < min_improvement_over_v1_f1 {}",
                            delta, min_improve
                        ));
                    }
                }
                _ => {
                    failures
                        .push("Gate failed: cannot compare v2 vs v1 f1 (missing metric)".to_string());
                }
            }
        }
    }

    let passed = failures.is_empty();
    info!(
        version = version.as_str(),
        passed,
        failures = failures.len(),
        "gate evaluation complete"
    );
    GateResult { passed, failures }
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "missing".to_string(),
    }
}
