//! # driftgate
//!
//! Model-quality core for a binary fake/real news classification pipeline.
//!
//! ## Architecture Overview
//!
//! driftgate is organized into several core modules:
//! - **Splitting**: stratified train/val/test partitioning with graceful
//!   degradation on tiny or imbalanced datasets
//! - **Validation**: schema, uniqueness, and value-range checks over the
//!   canonical dataset
//! - **Drift Monitoring**: text-corpus drift (length distributions, token
//!   overlap) and prediction drift (Population Stability Index)
//! - **Release Gates**: threshold- and delta-based pass/fail decisions over
//!   evaluation metrics
//!
//! Every public operation is a synchronous, deterministic function over
//! in-memory collections; reading datasets and loading models belong to the
//! surrounding ingestion and serving layers.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use driftgate::{config::SplitConfig, splitter, types::Record};
//!
//! fn main() -> anyhow::Result<()> {
//!     let records: Vec<Record> = Vec::new();
//!     let assigned = splitter::split(&records, &SplitConfig::default())?;
//!     let _ = assigned;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod drift;
pub mod error;
pub mod gates;
pub mod metrics;
pub mod prediction_drift;
pub mod report;
pub mod splitter;
pub mod stats;
pub mod types;
pub mod validate;

// Re-export main types for convenience
pub use config::{DataDriftConfig, EvalConfig, PredictionDriftConfig, SplitConfig};
pub use drift::{detect_data_drift, DataDriftResult};
pub use error::{DriftGateError, Result};
pub use gates::{check_gates, GateResult, GateVersion};
pub use prediction_drift::{detect_prediction_drift, PredictionDriftResult};
pub use splitter::split;
pub use types::{MetricsReport, Record, Split, SplitMetrics};
pub use validate::{validate_records, ValidationResult};
