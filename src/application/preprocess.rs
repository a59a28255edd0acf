//! Dataset preparation stages for the training pipeline.
//!
//! Each stage is a standalone function with explicit inputs and outputs so
//! the pipeline can be unit-tested without a real dataset: summarize, clean,
//! feature engineering, standard scaling, train/test split.

use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{monthly_installment, FeatureSchema, LoanRecord};

/// Errors from preprocessing stages.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("No records to process")]
    Empty,

    #[error("{rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("Test fraction {0} must be in (0, 1)")]
    InvalidTestFraction(f64),

    #[error("Feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Scaler artifact error: {0}")]
    Artifact(String),
}

/// Aggregate description of a loaded dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub high_risk: usize,
    pub low_risk: usize,
}

impl DatasetSummary {
    /// Describe a set of records (row count and label distribution).
    #[must_use]
    pub fn describe(records: &[LoanRecord]) -> Self {
        let high_risk = records.iter().filter(|r| r.high_risk == 1).count();
        Self {
            rows: records.len(),
            high_risk,
            low_risk: records.len() - high_risk,
        }
    }

    /// Fraction of rows labeled high risk.
    #[must_use]
    pub fn high_risk_rate(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.high_risk as f64 / self.rows as f64
        }
    }
}

/// Drop records whose fields fall outside the documented domains.
///
/// The number of dropped rows is logged; a dirty row is a data problem, not
/// a reason to abort the run.
#[must_use]
pub fn clean(records: Vec<LoanRecord>) -> Vec<LoanRecord> {
    let before = records.len();
    let cleaned: Vec<LoanRecord> = records
        .into_iter()
        .filter(|r| r.validate().is_ok())
        .collect();

    let dropped = before - cleaned.len();
    if dropped > 0 {
        tracing::warn!("Dropped {dropped} invalid records ({before} -> {})", cleaned.len());
    }

    cleaned
}

/// The engineered feature layout: the eight application fields plus the
/// derived affordability metrics.
#[must_use]
pub fn feature_schema() -> FeatureSchema {
    FeatureSchema::new(
        [
            "age",
            "employment_years",
            "annual_income",
            "credit_score",
            "existing_loans",
            "loan_amount",
            "loan_term_months",
            "interest_rate",
            "monthly_income",
            "monthly_installment",
            "debt_to_income",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect(),
    )
}

/// Assemble the feature matrix, labels, and schema from cleaned records.
///
/// Affordability features are derived with the same installment formula the
/// interactive rule engine uses, so the two paths cannot diverge.
///
/// # Errors
/// Returns [`PreprocessError::Empty`] when there are no records.
pub fn prepare(
    records: &[LoanRecord],
) -> Result<(Vec<Vec<f64>>, Vec<u8>, FeatureSchema), PreprocessError> {
    if records.is_empty() {
        return Err(PreprocessError::Empty);
    }

    let schema = feature_schema();
    let mut features = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for record in records {
        let monthly_income = record.annual_income / 12.0;
        let installment = monthly_installment(
            record.loan_amount,
            record.interest_rate,
            record.loan_term_months,
        );

        features.push(vec![
            f64::from(record.age),
            f64::from(record.employment_years),
            record.annual_income,
            f64::from(record.credit_score),
            f64::from(record.existing_loans),
            record.loan_amount,
            f64::from(record.loan_term_months),
            record.interest_rate,
            monthly_income,
            installment,
            installment / monthly_income,
        ]);
        labels.push(record.high_risk);
    }

    Ok((features, labels, schema))
}

/// Train/test split with a seeded shuffle.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub x_test: Vec<Vec<f64>>,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

/// Shuffle rows deterministically and split off `test_fraction` of them.
///
/// # Errors
/// Returns error on empty input, misaligned labels, a fraction outside
/// (0, 1), or a split that would leave either side empty.
pub fn split(
    features: &[Vec<f64>],
    labels: &[u8],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, PreprocessError> {
    if features.is_empty() {
        return Err(PreprocessError::Empty);
    }
    if features.len() != labels.len() {
        return Err(PreprocessError::LengthMismatch {
            rows: features.len(),
            labels: labels.len(),
        });
    }
    if !(test_fraction.is_finite() && 0.0 < test_fraction && test_fraction < 1.0) {
        return Err(PreprocessError::InvalidTestFraction(test_fraction));
    }

    let mut indices: Vec<usize> = (0..features.len()).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((features.len() as f64) * test_fraction).round() as usize;
    if test_size == 0 || test_size == features.len() {
        return Err(PreprocessError::InvalidTestFraction(test_fraction));
    }

    let (test_idx, train_idx) = indices.split_at(test_size);

    Ok(TrainTestSplit {
        x_train: train_idx.iter().map(|&i| features[i].clone()).collect(),
        x_test: test_idx.iter().map(|&i| features[i].clone()).collect(),
        y_train: train_idx.iter().map(|&i| labels[i]).collect(),
        y_test: test_idx.iter().map(|&i| labels[i]).collect(),
    })
}

/// Per-feature standardization (zero mean, unit variance), fitted on the
/// training split and persisted alongside the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and standard deviations per column.
    ///
    /// Zero-variance columns keep a unit divisor so transformation never
    /// divides by zero.
    ///
    /// # Errors
    /// Returns error on empty input or rows not matching the schema width.
    pub fn fit(features: &[Vec<f64>], schema: &FeatureSchema) -> Result<Self, PreprocessError> {
        if features.is_empty() {
            return Err(PreprocessError::Empty);
        }
        let n = schema.len();
        for row in features {
            if row.len() != n {
                return Err(PreprocessError::DimensionMismatch {
                    expected: n,
                    got: row.len(),
                });
            }
        }

        let m = features.len() as f64;
        let mut mean = vec![0.0; n];
        for row in features {
            for (acc, x) in mean.iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        for acc in mean.iter_mut() {
            *acc /= m;
        }

        let mut std = vec![0.0; n];
        for row in features {
            for ((acc, x), mu) in std.iter_mut().zip(row.iter()).zip(mean.iter()) {
                *acc += (x - mu).powi(2);
            }
        }
        for acc in std.iter_mut() {
            *acc = (*acc / m).sqrt();
            if *acc == 0.0 {
                *acc = 1.0;
            }
        }

        Ok(Self {
            feature_names: schema.names().to_vec(),
            mean,
            std,
        })
    }

    /// Standardize a feature matrix.
    ///
    /// # Errors
    /// Returns error when rows do not match the fitted width.
    pub fn transform(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PreprocessError> {
        let n = self.mean.len();
        features
            .iter()
            .map(|row| {
                if row.len() != n {
                    return Err(PreprocessError::DimensionMismatch {
                        expected: n,
                        got: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .zip(self.mean.iter().zip(self.std.iter()))
                    .map(|(x, (mu, sigma))| (x - mu) / sigma)
                    .collect())
            })
            .collect()
    }

    /// Write the fitted scaler to a JSON artifact.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), PreprocessError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PreprocessError::Artifact(format!("Failed to serialize scaler: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| PreprocessError::Artifact(format!("Failed to write {path:?}: {e}")))?;

        tracing::info!("Saved scaler artifact to {:?}", path);
        Ok(())
    }

    /// Load a fitted scaler from a JSON artifact.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or is internally
    /// inconsistent.
    pub fn load(path: &Path) -> Result<Self, PreprocessError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PreprocessError::Artifact(format!("Failed to read {path:?}: {e}")))?;
        let scaler: Self = serde_json::from_str(&content)
            .map_err(|e| PreprocessError::Artifact(format!("Invalid scaler JSON: {e}")))?;

        let n = scaler.feature_names.len();
        if scaler.mean.len() != n || scaler.std.len() != n {
            return Err(PreprocessError::Artifact(
                "Scaler parameter lengths do not match feature_names length".into(),
            ));
        }

        Ok(scaler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(credit_score: u32, high_risk: u8) -> LoanRecord {
        LoanRecord {
            age: 30,
            employment_years: 5,
            annual_income: 600_000.0,
            credit_score,
            existing_loans: 1,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 12.0,
            high_risk,
        }
    }

    #[test]
    fn test_summary() {
        let records = vec![record(700, 0), record(600, 1), record(650, 1)];
        let summary = DatasetSummary::describe(&records);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.high_risk, 2);
        assert_eq!(summary.low_risk, 1);
        assert!((summary.high_risk_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_clean_drops_invalid_rows() {
        let mut bad = record(700, 0);
        bad.age = 99; // outside 21-65
        let records = vec![record(700, 0), bad, record(650, 1)];

        let cleaned = clean(records);
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn test_prepare_engineers_affordability_features() {
        let records = vec![record(700, 0)];
        let (features, labels, schema) = prepare(&records).expect("prepares");

        assert_eq!(features.len(), 1);
        assert_eq!(labels, vec![0]);
        assert_eq!(schema.len(), 11);

        let row = &features[0];
        let income_col = schema.index_of("monthly_income").expect("column");
        let emi_col = schema.index_of("monthly_installment").expect("column");
        let dti_col = schema.index_of("debt_to_income").expect("column");

        assert!((row[income_col] - 50_000.0).abs() < f64::EPSILON);
        assert!((row[emi_col] - monthly_installment(300_000.0, 12.0, 36)).abs() < 1e-9);
        assert!((row[dti_col] - row[emi_col] / row[income_col]).abs() < 1e-12);

        let score_col = schema.index_of("credit_score").expect("column");
        assert!((row[score_col] - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_split_fractions_and_determinism() {
        let records: Vec<LoanRecord> = (0..50).map(|i| record(600 + i, (i % 2) as u8)).collect();
        let (features, labels, _) = prepare(&records).expect("prepares");

        let first = split(&features, &labels, 0.2, 7).expect("splits");
        assert_eq!(first.x_test.len(), 10);
        assert_eq!(first.x_train.len(), 40);
        assert_eq!(first.y_test.len(), 10);
        assert_eq!(first.y_train.len(), 40);

        let second = split(&features, &labels, 0.2, 7).expect("splits");
        assert_eq!(first.x_test, second.x_test);
        assert_eq!(first.y_train, second.y_train);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let (features, labels, _) =
            prepare(&[record(700, 0), record(650, 1)]).expect("prepares");
        assert!(matches!(
            split(&features, &labels, 0.0, 7),
            Err(PreprocessError::InvalidTestFraction(_))
        ));
        assert!(matches!(
            split(&features, &labels, 1.0, 7),
            Err(PreprocessError::InvalidTestFraction(_))
        ));
    }

    #[test]
    fn test_scaler_standardizes() {
        let schema = FeatureSchema::new(vec!["a".to_string(), "b".to_string()]);
        let features = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];

        let scaler = StandardScaler::fit(&features, &schema).expect("fits");
        let scaled = scaler.transform(&features).expect("transforms");

        for col in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[col]).sum::<f64>() / 4.0;
            let var: f64 = scaled.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaler_constant_column() {
        let schema = FeatureSchema::new(vec!["a".to_string()]);
        let features = vec![vec![5.0], vec![5.0], vec![5.0]];

        let scaler = StandardScaler::fit(&features, &schema).expect("fits");
        let scaled = scaler.transform(&features).expect("transforms");
        for row in scaled {
            assert!(row[0].is_finite());
            assert!(row[0].abs() < 1e-12);
        }
    }

    #[test]
    fn test_scaler_artifact_round_trip() {
        let schema = FeatureSchema::new(vec!["a".to_string(), "b".to_string()]);
        let features = vec![vec![1.0, -3.0], vec![2.0, 5.0], vec![3.0, 7.0]];
        let scaler = StandardScaler::fit(&features, &schema).expect("fits");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scaler.json");
        scaler.save(&path).expect("saves");

        let loaded = StandardScaler::load(&path).expect("loads");
        let a = scaler.transform(&features).expect("transforms");
        let b = loaded.transform(&features).expect("transforms");
        assert_eq!(a, b);
    }
}
