//! JSON report envelopes and writers.
//!
//! Every report is a flat, serializable structure written to a
//! caller-specified path as pretty-printed JSON; parent directories are
//! created on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::drift::DataDriftResult;
use crate::error::Result;
use crate::gates::{GateResult, GateVersion};
use crate::prediction_drift::PredictionDriftResult;
use crate::types::{Record, Split};
use crate::validate::{ValidationResult, ValidationStats, REQUIRED_COLUMNS};

/// Validation report with dataset provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ValidationStats>,
    pub meta: ValidationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMeta {
    pub dataset_name: String,
    pub validated_at_utc: DateTime<Utc>,
    pub required_columns: Vec<String>,
}

impl ValidationReport {
    pub fn new(dataset_name: &str, result: ValidationResult) -> Self {
        Self {
            passed: result.passed,
            errors: result.errors,
            stats: result.stats,
            meta: ValidationMeta {
                dataset_name: dataset_name.to_string(),
                validated_at_utc: Utc::now(),
                required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}

/// Data drift report annotated with which corpora were compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDriftReport {
    pub dataset: String,
    pub baseline_split: String,
    pub current_split: String,
    pub passed: bool,
    pub warnings: Vec<String>,
    pub stats: crate::drift::DataDriftStats,
}

impl DataDriftReport {
    pub fn new(
        dataset: &str,
        baseline_split: Split,
        current_split: Split,
        result: DataDriftResult,
    ) -> Self {
        Self {
            dataset: dataset.to_string(),
            baseline_split: baseline_split.to_string(),
            current_split: current_split.to_string(),
            passed: result.passed,
            warnings: result.warnings,
            stats: result.stats,
        }
    }
}

/// Prediction drift report; same shape as the data drift report plus the
/// model directory the probabilities came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDriftReport {
    pub dataset: String,
    pub baseline_split: String,
    pub current_split: String,
    pub model_dir: String,
    pub passed: bool,
    pub warnings: Vec<String>,
    pub stats: crate::prediction_drift::PredictionDriftStats,
}

impl PredictionDriftReport {
    pub fn new(
        dataset: &str,
        baseline_split: &str,
        current_split: &str,
        model_dir: &str,
        result: PredictionDriftResult,
    ) -> Self {
        Self {
            dataset: dataset.to_string(),
            baseline_split: baseline_split.to_string(),
            current_split: current_split.to_string(),
            model_dir: model_dir.to_string(),
            passed: result.passed,
            warnings: result.warnings,
            stats: result.stats,
        }
    }
}

/// Gate decision report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    pub gate_version: String,
    pub passed: bool,
    pub failures: Vec<String>,
    pub generated_at_utc: DateTime<Utc>,
}

impl GateReport {
    pub fn new(version: GateVersion, result: GateResult) -> Self {
        Self {
            gate_version: version.to_string(),
            passed: result.passed,
            failures: result.failures,
            generated_at_utc: Utc::now(),
        }
    }
}

/// Row counts written alongside a freshly split dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitManifest {
    pub rows_total: usize,
    pub rows_train: usize,
    pub rows_val: usize,
    pub rows_test: usize,
}

impl SplitManifest {
    pub fn from_records(records: &[Record]) -> Self {
        let count = |s: Split| records.iter().filter(|r| r.split == Some(s)).count();
        Self {
            rows_total: records.len(),
            rows_train: count(Split::Train),
            rows_val: count(Split::Val),
            rows_test: count(Split::Test),
        }
    }
}

/// Serializes `report` as pretty JSON at `path`, creating parent directories.
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_records;
    use serde_json::json;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("nested").join("out.json");
        let manifest = SplitManifest {
            rows_total: 4,
            rows_train: 2,
            rows_val: 1,
            rows_test: 1,
        };
        write_json_report(&path, &manifest).unwrap();

        let loaded: SplitManifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.rows_train, 2);
    }

    #[test]
    fn test_validation_report_meta() {
        let rows = vec![json!({
            "id": "a", "text": "ok", "label": 0, "source": "unit", "split": "train"
        })];
        let report = ValidationReport::new("isot", validate_records(&rows));
        assert!(report.passed);
        assert_eq!(report.meta.dataset_name, "isot");
        assert_eq!(report.meta.required_columns.len(), 5);
    }

    #[test]
    fn test_split_manifest_counts() {
        let record = |id: &str, split: Split| Record {
            id: id.to_string(),
            text: "t".to_string(),
            label: 0,
            source: "unit".to_string(),
            subject: None,
            date: None,
            split: Some(split),
        };
        let records = vec![
            record("a", Split::Train),
            record("b", Split::Train),
            record("c", Split::Val),
            record("d", Split::Test),
        ];
        let manifest = SplitManifest::from_records(&records);
        assert_eq!(manifest.rows_total, 4);
        assert_eq!(manifest.rows_train, 2);
        assert_eq!(manifest.rows_val, 1);
        assert_eq!(manifest.rows_test, 1);
    }
}
