//! Dataset validator.
//!
//! Runs schema, uniqueness, value-range, and distribution checks over the
//! canonical dataset and produces a structured report. Rows are loosely typed
//! JSON objects on purpose: several checks exist precisely to catch rows that
//! a typed [`Record`](crate::types::Record) could never represent (a missing
//! column, a null text, a label outside {0,1}).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Columns every canonical dataset row must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "text", "label", "source", "split"];

const VALID_SPLITS: [&str; 3] = ["train", "val", "test"];

/// Outcome of one validation call. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<String>,
    /// Absent when the schema check failed and evaluation stopped early.
    pub stats: Option<ValidationStats>,
}

/// Dataset-level counts, reported regardless of pass/fail once the schema
/// check has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationStats {
    pub rows_total: usize,
    pub rows_train: usize,
    pub rows_val: usize,
    pub rows_test: usize,
    pub null_text: usize,
    pub empty_text: usize,
    /// Rows whose exact text already occurred earlier. Informational only.
    pub duplicate_text: usize,
    pub label_distribution: LabelDistribution,
}

/// Per-split label counts, zeroed for empty splits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub train: SplitLabelCounts,
    pub val: SplitLabelCounts,
    pub test: SplitLabelCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitLabelCounts {
    pub rows: usize,
    pub label_0: usize,
    pub label_1: usize,
}

/// Validates canonical dataset rows.
///
/// Checks run in a fixed order so error output is reproducible. A schema
/// failure short-circuits everything else; all later checks accumulate
/// errors without stopping. `passed` is true iff no errors were appended.
pub fn validate_records(rows: &[Value]) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();

    // Columns observed anywhere in the dataset. A zero-row input exposes no
    // columns and therefore fails the schema check.
    let mut columns: BTreeSet<&str> = BTreeSet::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            columns.extend(obj.keys().map(|k| k.as_str()));
        }
    }
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains(c))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required columns: {:?}", missing));
        warn!(?missing, "dataset failed schema check");
        return ValidationResult {
            passed: false,
            errors,
            stats: None,
        };
    }

    // id uniqueness
    let mut seen_ids = HashSet::new();
    let mut ids_unique = true;
    for row in rows {
        let id = field_repr(row, "id");
        if !seen_ids.insert(id) {
            ids_unique = false;
        }
    }
    if !ids_unique {
        errors.push("Column 'id' must contain unique values".to_string());
    }

    // label values
    let labels_binary = rows.iter().all(|row| matches!(label_of(row), Some(0 | 1)));
    if !labels_binary {
        errors.push("Column 'label' must be binary {0,1}".to_string());
    }

    // text nullness and blankness; counts are reported even when zero
    let mut null_text = 0usize;
    let mut empty_text = 0usize;
    for row in rows {
        match row.get("text") {
            None | Some(Value::Null) => null_text += 1,
            Some(Value::String(s)) if s.trim().is_empty() => empty_text += 1,
            _ => {}
        }
    }
    if null_text > 0 {
        errors.push(format!("Found {} null text values", null_text));
    }
    if empty_text > 0 {
        errors.push(format!("Found {} empty text values", empty_text));
    }

    // split values
    let mut invalid_splits: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        let value = field_repr(row, "split");
        if !VALID_SPLITS.contains(&value.as_str()) {
            invalid_splits.insert(value);
        }
    }
    if !invalid_splits.is_empty() {
        let sorted: Vec<&String> = invalid_splits.iter().collect();
        errors.push(format!("Invalid split values found: {:?}", sorted));
    }

    // duplicate exact text, informational
    let mut seen_texts = HashSet::new();
    let mut duplicate_text = 0usize;
    for row in rows {
        if let Some(Value::String(s)) = row.get("text") {
            if !seen_texts.insert(s.as_str()) {
                duplicate_text += 1;
            }
        }
    }

    // per-split label distribution
    let mut distribution = LabelDistribution::default();
    for row in rows {
        let bucket = match field_repr(row, "split").as_str() {
            "train" => &mut distribution.train,
            "val" => &mut distribution.val,
            "test" => &mut distribution.test,
            _ => continue,
        };
        bucket.rows += 1;
        match label_of(row) {
            Some(0) => bucket.label_0 += 1,
            Some(1) => bucket.label_1 += 1,
            _ => {}
        }
    }

    let stats = ValidationStats {
        rows_total: rows.len(),
        rows_train: distribution.train.rows,
        rows_val: distribution.val.rows,
        rows_test: distribution.test.rows,
        null_text,
        empty_text,
        duplicate_text,
        label_distribution: distribution,
    };

    let passed = errors.is_empty();
    debug!(
        rows = rows.len(),
        errors = errors.len(),
        passed, "validation complete"
    );
    ValidationResult {
        passed,
        errors,
        stats: Some(stats),
    }
}

/// Integer label of a row, when it is one.
fn label_of(row: &Value) -> Option<i64> {
    row.get("label").and_then(Value::as_i64)
}

/// Displayable form of a field: bare strings stay bare, everything else
/// (numbers, null, missing) uses its JSON representation.
fn field_repr(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, text: &str, label: i64, split: &str) -> Value {
        json!({
            "id": id,
            "text": text,
            "label": label,
            "source": "unit",
            "split": split,
        })
    }

    #[test]
    fn test_clean_dataset_passes() {
        let rows = vec![
            row("a", "breaking story", 0, "train"),
            row("b", "another story", 1, "train"),
            row("c", "val story", 0, "val"),
            row("d", "test story", 1, "test"),
        ];
        let result = validate_records(&rows);
        assert!(result.passed);
        assert!(result.errors.is_empty());
        let stats = result.stats.unwrap();
        assert_eq!(stats.rows_total, 4);
        assert_eq!(stats.rows_train, 2);
        assert_eq!(stats.rows_val, 1);
        assert_eq!(stats.rows_test, 1);
        assert_eq!(stats.label_distribution.train.label_0, 1);
        assert_eq!(stats.label_distribution.train.label_1, 1);
    }

    #[test]
    fn test_missing_column_short_circuits() {
        let rows = vec![json!({"id": "a", "label": 0, "source": "unit", "split": "train"})];
        let result = validate_records(&rows);
        assert!(!result.passed);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Missing required columns"));
        assert!(result.errors[0].contains("text"));
        assert!(result.stats.is_none());
    }

    #[test]
    fn test_empty_input_fails_schema() {
        let result = validate_records(&[]);
        assert!(!result.passed);
        assert!(result.errors[0].contains("Missing required columns"));
    }

    #[test]
    fn test_duplicate_ids_detected() {
        let rows = vec![
            row("a", "one", 0, "train"),
            row("a", "two", 1, "train"),
        ];
        let result = validate_records(&rows);
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.contains("unique")));
    }

    #[test]
    fn test_non_binary_label_detected() {
        let rows = vec![row("a", "one", 5, "train")];
        let result = validate_records(&rows);
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.contains("binary")));
    }

    #[test]
    fn test_null_and_blank_text_counted() {
        let rows = vec![
            json!({"id": "a", "text": null, "label": 0, "source": "unit", "split": "train"}),
            row("b", "   ", 1, "train"),
            row("c", "fine", 0, "train"),
        ];
        let result = validate_records(&rows);
        assert!(!result.passed);
        let stats = result.stats.unwrap();
        assert_eq!(stats.null_text, 1);
        assert_eq!(stats.empty_text, 1);
        assert!(result.errors.iter().any(|e| e.contains("null text")));
        assert!(result.errors.iter().any(|e| e.contains("empty text")));
    }

    #[test]
    fn test_invalid_split_value_detected() {
        let rows = vec![row("a", "one", 0, "training")];
        let result = validate_records(&rows);
        assert!(!result.passed);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("split") && e.contains("training")));
    }

    #[test]
    fn test_duplicate_text_is_informational() {
        let rows = vec![
            row("a", "same words", 0, "train"),
            row("b", "same words", 1, "train"),
        ];
        let result = validate_records(&rows);
        assert!(result.passed);
        assert_eq!(result.stats.unwrap().duplicate_text, 1);
    }
}
