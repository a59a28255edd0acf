//! Batch training pipeline CLI.
//!
//! Loads a historical loan dataset, fits the risk classifier, applies the
//! credit-score override to held-out predictions, and persists the model,
//! scaler, and metrics report.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train -- <data.csv> [--output-dir <dir>] \
//!     [--test-fraction <f>] [--folds <n>] [--seed <n>]
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use tracing_subscriber::EnvFilter;

use lendguard::adapters::csv::CsvDataset;
use lendguard::adapters::logistic::LogisticModel;
use lendguard::application::{TrainingConfig, TrainingPipeline};

fn usage() -> String {
    "Usage: train <data.csv> [--output-dir <dir>] [--test-fraction <f>] [--folds <n>] [--seed <n>]"
        .to_string()
}

struct Args {
    data_path: PathBuf,
    output_dir: PathBuf,
    test_fraction: f64,
    folds: usize,
    seed: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut data_path: Option<PathBuf> = None;
    let mut output_dir = PathBuf::from("models");
    let mut test_fraction = 0.2;
    let mut folds = 5;
    let mut seed = 42;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output-dir" => {
                let v = args.next().ok_or_else(|| anyhow!(usage()))?;
                output_dir = PathBuf::from(v);
            }
            "--test-fraction" => {
                let v = args.next().ok_or_else(|| anyhow!(usage()))?;
                test_fraction = v
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| anyhow!("--test-fraction must be a number in (0, 1)"))?;
            }
            "--folds" => {
                let v = args.next().ok_or_else(|| anyhow!(usage()))?;
                folds = v
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| anyhow!("--folds must be an integer"))?;
            }
            "--seed" => {
                let v = args.next().ok_or_else(|| anyhow!(usage()))?;
                seed = v
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow!("--seed must be a u64"))?;
            }
            "-h" | "--help" => bail!(usage()),
            _ => {
                if data_path.is_none() {
                    data_path = Some(PathBuf::from(arg));
                } else {
                    bail!(usage());
                }
            }
        }
    }

    let data_path = data_path.ok_or_else(|| anyhow!(usage()))?;
    Ok(Args {
        data_path,
        output_dir,
        test_fraction,
        folds,
        seed,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;

    if !args.data_path.exists() {
        bail!("Data file not found: {}", args.data_path.display());
    }

    let mut config = TrainingConfig::new(&args.data_path, &args.output_dir);
    config.test_fraction = args.test_fraction;
    config.cv_folds = args.folds;
    config.seed = args.seed;
    let floor = config.thresholds.credit_score_floor;

    let mut pipeline = TrainingPipeline::new(CsvDataset::new(), LogisticModel::new(), config);
    let report = pipeline.run()?;

    let evaluation = &report.evaluation;
    println!("Training pipeline completed.");
    println!();
    println!("Dataset:");
    println!(
        "  {} rows ({} high risk / {} low risk), {} dropped by cleaning",
        report.summary.rows,
        report.summary.high_risk,
        report.summary.low_risk,
        report.dropped_records
    );
    println!();
    println!("Cross-validation:");
    println!(
        "  accuracy {:.4} +/- {:.4} over {} folds",
        report.cross_validation.mean_accuracy,
        report.cross_validation.std_accuracy,
        report.cross_validation.fold_accuracies.len()
    );
    println!();
    println!("Held-out evaluation:");
    println!("  accuracy:  {:.4}", evaluation.accuracy);
    println!("  precision: {:.4}", evaluation.precision);
    println!("  recall:    {:.4}", evaluation.recall);
    println!("  f1-score:  {:.4}", evaluation.f1_score);
    match evaluation.roc_auc {
        Some(auc) => println!("  roc-auc:   {auc:.4}"),
        None => println!("  roc-auc:   n/a (single-class held-out split)"),
    }
    println!();
    println!("Business rule:");
    println!("  credit score < {floor} forced to High Risk");
    println!("  overrides applied: {}", evaluation.override_count);
    println!();
    println!("Artifacts:");
    println!("  model:  {}", report.model_path.display());
    println!("  scaler: {}", report.scaler_path.display());
    println!("  report: {}", report.report_path.display());

    Ok(())
}
