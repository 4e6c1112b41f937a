//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - builds the processor configuration (env + flags)
//! - runs the requested operation and prints its report
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, EstimateArgs, EvaluateArgs, ImportArgs, ModelDirArgs, TrainArgs};
use crate::config::ProcessorConfig;
use crate::domain::Status;
use crate::error::{RegressionError, Result};
use crate::processor::{RegressionProcessor, Regressor};

/// Entry point for the `olsr` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.log_json, cli.verbose);

    let config = ProcessorConfig::from_env()?;
    info!(config = %config.summary(), "Configuration loaded");

    match cli.command {
        Command::Train(args) => handle_train(args, config),
        Command::Estimate(args) => handle_estimate(args, config),
        Command::Evaluate(args) => handle_evaluate(args, config),
        Command::Export(args) => handle_export(args, config),
        Command::Import(args) => handle_import(args, config),
    }
}

fn handle_train(args: TrainArgs, mut config: ProcessorConfig) -> Result<()> {
    if let Some(cap) = args.max_samples {
        config.max_training_samples = cap;
    }
    let cap = config.max_training_samples;
    let processor = RegressionProcessor::new(config, &args.model.model_dir)?;
    let result = processor.train(&args.dataset)?;

    println!(
        "{}",
        crate::report::format_training(&result, &args.model.model_dir.display().to_string())
    );

    if result.status.contains(Status::INSUFFICIENT_DATA) {
        return Err(RegressionError::InsufficientData {
            required: crate::math::MIN_FIT_ROWS,
            found: if cap == 0 {
                result.rows_total
            } else {
                result.rows_total.min(cap)
            },
        });
    }
    Ok(())
}

fn handle_estimate(args: EstimateArgs, config: ProcessorConfig) -> Result<()> {
    let processor = RegressionProcessor::new(config, &args.model.model_dir)?;
    let result = processor.estimate(&args.dataset)?;

    println!("{}", crate::report::format_estimates(&result, args.top));

    if let Some(path) = &args.export {
        crate::io::export::write_predictions_csv(path, &result)?;
        info!(path = %path.display(), "Predictions exported");
    }
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs, mut config: ProcessorConfig) -> Result<()> {
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    // Evaluation never writes a model; the directory is unused.
    let processor = RegressionProcessor::new(config, ".")?;
    let result = processor.evaluate(
        &args.dataset,
        args.max_deviation,
        args.iterations,
        args.pretrained.as_deref(),
    )?;

    println!(
        "{}",
        crate::report::format_evaluation(&result, args.max_deviation)
    );

    if let Some(path) = &args.export_json {
        crate::io::export::write_evaluation_json(path, &result)?;
        info!(path = %path.display(), "Evaluation exported");
    }
    Ok(())
}

fn handle_export(args: ModelDirArgs, config: ProcessorConfig) -> Result<()> {
    let processor = RegressionProcessor::new(config, &args.model_dir)?;
    let dir = processor.export()?;
    println!("{}", dir.display());
    Ok(())
}

fn handle_import(args: ImportArgs, config: ProcessorConfig) -> Result<()> {
    let processor = RegressionProcessor::new(config, &args.model.model_dir)?;
    if processor.import(&args.from) {
        println!(
            "Imported model from {} into {}",
            args.from.display(),
            args.model.model_dir.display()
        );
        Ok(())
    } else {
        Err(RegressionError::ModelNotFound(args.from))
    }
}
