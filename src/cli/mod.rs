//! Command-line parsing for the OLS regression backend.
//!
//! Argument parsing and command dispatch are kept apart from the
//! modeling/math code; the handlers in `app` only translate flags into
//! processor calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "olsr", version, about = "OLS regression backend: train, estimate, evaluate")]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model on a training dataset and store it in the model directory.
    Train(TrainArgs),
    /// Predict every row of a dataset with the stored model.
    Estimate(EstimateArgs),
    /// Score the model configuration with repeated random train/test splits.
    Evaluate(EvaluateArgs),
    /// Print the exportable model directory.
    Export(ModelDirArgs),
    /// Copy a model from another directory into the model directory.
    Import(ImportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ModelDirArgs {
    /// Directory holding the model file.
    #[arg(long, value_name = "DIR")]
    pub model_dir: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub model: ModelDirArgs,

    /// Training dataset (metadata, header, feature columns then target).
    #[arg(long, value_name = "CSV")]
    pub dataset: PathBuf,

    /// Cap on training rows (most recent kept); 0 = unlimited.
    ///
    /// Overrides OLSR_MAX_TRAINING_SAMPLES.
    #[arg(long)]
    pub max_samples: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub model: ModelDirArgs,

    /// Prediction dataset (metadata, header, sample id then feature columns).
    #[arg(long, value_name = "CSV")]
    pub dataset: PathBuf,

    /// Write all predictions to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Rows shown in the terminal table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    /// Evaluation dataset (same layout as a training dataset).
    #[arg(long, value_name = "CSV")]
    pub dataset: PathBuf,

    /// Number of random train/test splits.
    #[arg(long, default_value_t = 10)]
    pub iterations: usize,

    /// Largest acceptable standard deviation of the per-split scores.
    #[arg(long, default_value_t = 0.02)]
    pub max_deviation: f64,

    /// Score this trained model on the whole dataset instead of refitting.
    #[arg(long, value_name = "DIR")]
    pub pretrained: Option<PathBuf>,

    /// Seed for the random splits (overrides OLSR_SEED).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the evaluation result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// Directory to copy the model from.
    #[arg(long, value_name = "DIR")]
    pub from: PathBuf,

    #[command(flatten)]
    pub model: ModelDirArgs,
}
