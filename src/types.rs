use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DriftGateError;

/// Canonical split assignment for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = DriftGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "val" => Ok(Split::Val),
            "test" => Ok(Split::Test),
            other => Err(DriftGateError::Config(format!(
                "Unknown split '{}', expected one of train/val/test",
                other
            ))),
        }
    }
}

/// One labeled news article in the canonical dataset schema.
///
/// `label` is 0 for real and 1 for fake. `split` is absent until the
/// splitter has assigned one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub label: u8,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
}

/// Metrics computed on a single evaluation split.
///
/// ROC-AUC and PR-AUC are undefined when only one class is present, so they
/// are optional; downstream gates treat a missing metric as a failing
/// condition rather than a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: Option<f64>,
    pub pr_auc: Option<f64>,
}

/// Evaluation report produced by training, consumed read-only by the gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub model_version: String,
    pub threshold: f64,
    #[serde(default)]
    pub val: Option<SplitMetrics>,
    #[serde(default)]
    pub test: Option<SplitMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_roundtrip() {
        for s in [Split::Train, Split::Val, Split::Test] {
            assert_eq!(s.as_str().parse::<Split>().unwrap(), s);
        }
        assert!("training".parse::<Split>().is_err());
    }

    #[test]
    fn test_record_optional_fields_deserialize() {
        let json = r#"{"id":"a","text":"hello","label":1,"source":"unit"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(record.subject.is_none());
        assert!(record.split.is_none());
    }
}
