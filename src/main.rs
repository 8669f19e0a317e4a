use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use driftgate::config::{DataDriftConfig, EvalConfig, PredictionDriftConfig, SplitConfig};
use driftgate::gates::GateVersion;
use driftgate::report::{
    write_json_report, DataDriftReport, GateReport, PredictionDriftReport, SplitManifest,
    ValidationReport,
};
use driftgate::types::{MetricsReport, Record, Split};
use driftgate::{check_gates, detect_data_drift, detect_prediction_drift, validate_records};

#[derive(Parser)]
#[clap(name = "driftgate")]
#[clap(about = "Drift detection and evaluation gates for the fake-news classifier pipeline")]
#[clap(version)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign train/val/test splits to a canonical dataset
    Split {
        /// Canonical dataset (JSON array of records)
        #[clap(short, long)]
        input: PathBuf,

        /// Where to write the dataset with splits assigned
        #[clap(short, long)]
        output: PathBuf,

        /// Split configuration (JSON); defaults apply when omitted
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Optional manifest path with per-split row counts
        #[clap(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Validate a canonical dataset and write a validation report
    Validate {
        /// Dataset rows (JSON array of objects)
        #[clap(short, long)]
        input: PathBuf,

        /// Dataset name recorded in the report metadata
        #[clap(short, long, default_value = "dataset")]
        name: String,

        /// Report output path
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Compare text distributions between two splits of a dataset
    DataDrift {
        /// Dataset with splits assigned (JSON array of records)
        #[clap(short, long)]
        input: PathBuf,

        /// Split used as the baseline corpus
        #[clap(long, default_value = "train")]
        baseline_split: String,

        /// Split used as the current corpus
        #[clap(long, default_value = "test")]
        current_split: String,

        /// Drift thresholds (JSON); defaults apply when omitted
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Report output path
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Compare two prediction probability samples via PSI
    PredictionDrift {
        /// Baseline probabilities (JSON array of floats)
        #[clap(long)]
        baseline: PathBuf,

        /// Current probabilities (JSON array of floats)
        #[clap(long)]
        current: PathBuf,

        /// Model directory recorded in the report
        #[clap(long, default_value = "artifacts/models/v1")]
        model_dir: String,

        /// PSI thresholds (JSON); defaults apply when omitted
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Report output path
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Evaluate release gates for a metrics report
    Gates {
        /// Metrics report produced by training (JSON)
        #[clap(short, long)]
        report: PathBuf,

        /// Evaluation configuration with gate thresholds (JSON)
        #[clap(short, long)]
        config: PathBuf,

        /// Gate version: v1_baseline or v2_improved
        #[clap(long, default_value = "v1_baseline")]
        gate_version: String,

        /// Prior (baseline) metrics report for the comparative check
        #[clap(long)]
        prior: Option<PathBuf>,

        /// Optional gate report output path
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Split {
            input,
            output,
            config,
            manifest,
        } => run_split(&input, &output, config.as_deref(), manifest.as_deref()),
        Commands::Validate {
            input,
            name,
            output,
        } => run_validate(&input, &name, &output),
        Commands::DataDrift {
            input,
            baseline_split,
            current_split,
            config,
            output,
        } => run_data_drift(
            &input,
            &baseline_split,
            &current_split,
            config.as_deref(),
            &output,
        ),
        Commands::PredictionDrift {
            baseline,
            current,
            model_dir,
            config,
            output,
        } => run_prediction_drift(&baseline, &current, &model_dir, config.as_deref(), &output),
        Commands::Gates {
            report,
            config,
            gate_version,
            prior,
            output,
        } => run_gates(
            &report,
            &config,
            &gate_version,
            prior.as_deref(),
            output.as_deref(),
        ),
    }
}

fn run_split(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    manifest: Option<&Path>,
) -> Result<()> {
    let records: Vec<Record> = load_json(input)?;
    let cfg: SplitConfig = match config {
        Some(path) => load_json(path)?,
        None => SplitConfig::default(),
    };

    let assigned = driftgate::split(&records, &cfg)?;
    write_json_report(output, &assigned)?;

    if let Some(manifest_path) = manifest {
        write_json_report(manifest_path, &SplitManifest::from_records(&assigned))?;
    }
    info!("split {} records", assigned.len());
    Ok(())
}

fn run_validate(input: &Path, name: &str, output: &Path) -> Result<()> {
    let rows: Vec<serde_json::Value> = load_json(input)?;
    let result = validate_records(&rows);
    let report = ValidationReport::new(name, result);
    write_json_report(output, &report)?;

    if !report.passed {
        bail!(
            "validation failed with {} error(s): {}",
            report.errors.len(),
            report.errors.join("; ")
        );
    }
    info!("validation passed for {} rows", rows.len());
    Ok(())
}

fn run_data_drift(
    input: &Path,
    baseline_split: &str,
    current_split: &str,
    config: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let records: Vec<Record> = load_json(input)?;
    let baseline: Split = baseline_split.parse()?;
    let current: Split = current_split.parse()?;
    let cfg: DataDriftConfig = match config {
        Some(path) => load_json(path)?,
        None => DataDriftConfig::default(),
    };

    let baseline_texts = texts_for_split(&records, baseline);
    let current_texts = texts_for_split(&records, current);
    let result = detect_data_drift(&baseline_texts, &current_texts, &cfg);

    let dataset = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    let report = DataDriftReport::new(dataset, baseline, current, result);
    write_json_report(output, &report)?;

    if !report.passed {
        bail!("data drift detected: {}", report.warnings.join("; "));
    }
    info!("no data drift between {} and {}", baseline, current);
    Ok(())
}

fn run_prediction_drift(
    baseline: &Path,
    current: &Path,
    model_dir: &str,
    config: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let baseline_probs: Vec<f64> = load_json(baseline)?;
    let current_probs: Vec<f64> = load_json(current)?;
    let cfg: PredictionDriftConfig = match config {
        Some(path) => load_json(path)?,
        None => PredictionDriftConfig::default(),
    };

    let result = detect_prediction_drift(&baseline_probs, &current_probs, &cfg)?;
    let report =
        PredictionDriftReport::new("predictions", "baseline", "current", model_dir, result);
    write_json_report(output, &report)?;

    if !report.passed {
        bail!("prediction drift detected: {}", report.warnings.join("; "));
    }
    info!("prediction drift within thresholds");
    Ok(())
}

fn run_gates(
    report_path: &Path,
    config_path: &Path,
    gate_version: &str,
    prior: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let report: MetricsReport = load_json(report_path)?;
    let cfg: EvalConfig = load_json(config_path)?;
    let version: GateVersion = gate_version.parse()?;
    let prior_report: Option<MetricsReport> = match prior {
        Some(path) => Some(load_json(path)?),
        None => None,
    };

    let result = check_gates(&report, &cfg, version, prior_report.as_ref());
    let gate_report = GateReport::new(version, result);

    if let Some(path) = output {
        write_json_report(path, &gate_report)?;
    }

    if !gate_report.passed {
        bail!(
            "gates failed for {}: {}",
            version,
            gate_report.failures.join("; ")
        );
    }
    info!("all gates passed for {}", version);
    Ok(())
}

fn texts_for_split(records: &[Record], split: Split) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.split == Some(split))
        .map(|r| r.text.clone())
        .collect()
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
