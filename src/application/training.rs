//! Training pipeline: the batch path from raw dataset to persisted model.
//!
//! Sequences the stages as explicit, separately testable steps:
//! load -> explore -> clean -> engineer -> split -> scale -> train ->
//! cross-validate -> predict -> credit-score override -> evaluate -> persist.
//!
//! The classifier consumes standardized features; the credit-score override
//! runs on the raw held-out matrix so the floor compares real scores.

use std::path::PathBuf;

use crate::adapters::DatasetError;
use crate::application::evaluation::{self, EvaluationReport};
use crate::application::preprocess::{self, DatasetSummary, StandardScaler};
use crate::domain::{apply_thresholds, RuleThresholds};
use crate::ports::{Classifier, CrossValidation, DatasetSource, ModelPersistence};
use crate::{LendguardError, Result};

/// Configuration for one training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Historical loan dataset (CSV)
    pub data_path: PathBuf,

    /// Directory for model, scaler, and report artifacts
    pub output_dir: PathBuf,

    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,

    /// Number of cross-validation folds
    pub cv_folds: usize,

    /// Rule thresholds; the credit-score floor drives the override
    pub thresholds: RuleThresholds,

    /// Seed for the train/test shuffle
    pub seed: u64,
}

impl TrainingConfig {
    /// Default configuration for a dataset and output directory.
    #[must_use]
    pub fn new(data_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            output_dir: output_dir.into(),
            test_fraction: 0.2,
            cv_folds: 5,
            thresholds: RuleThresholds::default(),
            seed: 42,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct TrainingReport {
    pub summary: DatasetSummary,
    pub dropped_records: usize,
    pub cross_validation: CrossValidation,
    pub evaluation: EvaluationReport,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub report_path: PathBuf,
}

/// The staged batch pipeline, generic over the dataset source and the
/// classifier.
pub struct TrainingPipeline<D, C>
where
    D: DatasetSource,
    C: Classifier + ModelPersistence,
{
    source: D,
    classifier: C,
    config: TrainingConfig,
}

impl<D, C> TrainingPipeline<D, C>
where
    D: DatasetSource,
    D::Error: Into<DatasetError>,
    C: Classifier + ModelPersistence,
{
    /// Create a pipeline over a dataset source and an untrained classifier.
    pub fn new(source: D, classifier: C, config: TrainingConfig) -> Self {
        Self {
            source,
            classifier,
            config,
        }
    }

    /// Run the pipeline end to end.
    ///
    /// # Errors
    /// Fatal conditions (missing dataset, degenerate split, training
    /// failure, artifact write failure) abort the run; a missing
    /// credit-score feature during the override does not.
    pub fn run(&mut self) -> Result<TrainingReport> {
        tracing::info!("Step 1: Loading data from {:?}", self.config.data_path);
        let records = self
            .source
            .load(&self.config.data_path)
            .map_err(|e| LendguardError::Dataset(e.into()))?;

        tracing::info!("Step 2: Exploring data");
        let summary = DatasetSummary::describe(&records);
        tracing::info!(
            "Dataset: {} rows, {} high risk / {} low risk ({:.1}% high)",
            summary.rows,
            summary.high_risk,
            summary.low_risk,
            summary.high_risk_rate() * 100.0
        );

        tracing::info!("Step 3: Cleaning data");
        let loaded_rows = records.len();
        let records = preprocess::clean(records);
        let dropped_records = loaded_rows - records.len();

        tracing::info!("Step 4: Feature engineering");
        let (features, labels, schema) =
            preprocess::prepare(&records).map_err(LendguardError::Preprocess)?;
        tracing::info!("Features: {:?}", schema.names());

        tracing::info!(
            "Step 5: Train/test split (test fraction {})",
            self.config.test_fraction
        );
        let split = preprocess::split(
            &features,
            &labels,
            self.config.test_fraction,
            self.config.seed,
        )
        .map_err(LendguardError::Preprocess)?;

        tracing::info!("Step 6: Fitting scaler on the training split");
        let scaler =
            StandardScaler::fit(&split.x_train, &schema).map_err(LendguardError::Preprocess)?;
        let x_train_scaled = scaler
            .transform(&split.x_train)
            .map_err(LendguardError::Preprocess)?;
        let x_test_scaled = scaler
            .transform(&split.x_test)
            .map_err(LendguardError::Preprocess)?;

        tracing::info!("Step 7: Training classifier");
        self.classifier
            .train(&x_train_scaled, &split.y_train, &schema)?;

        tracing::info!("Step 8: Cross-validation ({} folds)", self.config.cv_folds);
        let full_scaled = scaler
            .transform(&features)
            .map_err(LendguardError::Preprocess)?;
        let cross_validation =
            self.classifier
                .cross_validate(&full_scaled, &labels, &schema, self.config.cv_folds)?;

        tracing::info!("Step 9: Predicting on the held-out split");
        let model_predictions = self.classifier.predict(&x_test_scaled)?;
        let probabilities = self.classifier.predict_proba(&x_test_scaled)?;

        tracing::info!("Step 10: Applying credit-score override");
        let outcome = apply_thresholds(
            &split.x_test,
            &model_predictions,
            &schema,
            &self.config.thresholds,
        )?;
        tracing::info!("Rule-based overrides applied: {}", outcome.override_count);

        tracing::info!("Step 11: Evaluating");
        let feature_importance = self.classifier.feature_importance()?;
        let evaluation = evaluation::evaluate(
            &split.y_test,
            &outcome.predictions,
            &probabilities,
            feature_importance,
            outcome.override_count,
        )?;

        tracing::info!("Step 12: Persisting artifacts");
        std::fs::create_dir_all(&self.config.output_dir)?;
        let model_path = self.config.output_dir.join("loan_risk_model.json");
        let scaler_path = self.config.output_dir.join("scaler.json");
        let report_path = self.config.output_dir.join("metrics.json");

        self.classifier.save_model(&model_path)?;
        scaler.save(&scaler_path).map_err(LendguardError::Preprocess)?;
        evaluation.save(&report_path)?;

        tracing::info!("Training pipeline completed");

        Ok(TrainingReport {
            summary,
            dropped_records,
            cross_validation,
            evaluation,
            model_path,
            scaler_path,
            report_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv::CsvDataset;
    use crate::adapters::logistic::LogisticModel;
    use std::io::Write;

    const HEADER: &str = "age,employment_years,annual_income,credit_score,existing_loans,loan_amount,loan_term_months,interest_rate,high_risk";

    /// A small dataset where risk tracks the credit score, with a few rows
    /// where the label disagrees with the model to exercise the override.
    fn write_dataset(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("loans.csv");
        let mut file = std::fs::File::create(&path).expect("create csv");
        writeln!(file, "{HEADER}").expect("header");

        for i in 0..30 {
            // Healthy profiles: strong score, cheap loan.
            let score = 700 + i;
            writeln!(
                file,
                "35,8,1200000,{score},0,300000,36,10.0,0"
            )
            .expect("row");
        }
        for i in 0..30 {
            // Risky profiles: weak score, expensive loan.
            let score = 480 + i;
            writeln!(
                file,
                "28,1,400000,{score},3,500000,12,22.0,1"
            )
            .expect("row");
        }
        // One invalid row the cleaner must drop (age out of domain).
        writeln!(file, "17,1,400000,500,3,500000,12,22.0,1").expect("row");

        path
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_path = write_dataset(dir.path());
        let output_dir = dir.path().join("models");

        let config = TrainingConfig::new(&data_path, &output_dir);
        let mut pipeline = TrainingPipeline::new(CsvDataset::new(), LogisticModel::new(), config);

        let report = pipeline.run().expect("pipeline runs");

        assert_eq!(report.summary.rows, 61);
        assert_eq!(report.dropped_records, 1);
        assert_eq!(report.cross_validation.fold_accuracies.len(), 5);
        // The classes are cleanly separable, so held-out accuracy is high.
        assert!(
            report.evaluation.accuracy > 0.8,
            "accuracy = {}",
            report.evaluation.accuracy
        );
        assert_eq!(report.evaluation.confusion.total(), 12);

        assert!(report.model_path.exists());
        assert!(report.scaler_path.exists());
        assert!(report.report_path.exists());
    }

    #[test]
    fn test_pipeline_missing_data_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = TrainingConfig::new(dir.path().join("absent.csv"), dir.path().join("out"));
        let mut pipeline = TrainingPipeline::new(CsvDataset::new(), LogisticModel::new(), config);

        let err = pipeline.run().expect_err("must fail");
        assert!(matches!(
            err,
            LendguardError::Dataset(DatasetError::NotFound(_))
        ));
    }

    #[test]
    fn test_pipeline_artifacts_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_path = write_dataset(dir.path());
        let output_dir = dir.path().join("models");

        let config = TrainingConfig::new(&data_path, &output_dir);
        let mut pipeline = TrainingPipeline::new(CsvDataset::new(), LogisticModel::new(), config);
        let report = pipeline.run().expect("pipeline runs");

        // Both artifacts must load back with consistent shapes.
        let model = LogisticModel::load(&report.model_path).expect("model loads");
        let scaler = StandardScaler::load(&report.scaler_path).expect("scaler loads");

        let records = vec![crate::domain::LoanRecord {
            age: 30,
            employment_years: 5,
            annual_income: 900_000.0,
            credit_score: 710,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 11.0,
            high_risk: 0,
        }];
        let (features, _, _) = preprocess::prepare(&records).expect("prepares");
        let scaled = scaler.transform(&features).expect("transforms");
        let probabilities = model.predict_proba(&scaled).expect("predicts");
        assert!((0.0..=1.0).contains(&probabilities[0]));
    }
}
