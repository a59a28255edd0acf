//! Classifier port: Trait for the statistical risk model.
//!
//! The core never depends on a concrete learning algorithm; it consumes a
//! per-example probability and a binary prediction through this contract and
//! reconciles them with the deterministic business rule afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::FeatureSchema;

/// Errors that can occur during model operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Model has not been trained")]
    NotTrained,

    #[error("Feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid training input: {0}")]
    InvalidInput(String),

    #[error("Model artifact error: {0}")]
    Artifact(String),
}

/// Cross-validation result: per-fold held-out accuracy plus summary stats.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

impl CrossValidation {
    /// Summarize a set of fold accuracies.
    #[must_use]
    pub fn from_folds(fold_accuracies: Vec<f64>) -> Self {
        let n = fold_accuracies.len() as f64;
        let mean = if n > 0.0 {
            fold_accuracies.iter().sum::<f64>() / n
        } else {
            0.0
        };
        let variance = if n > 0.0 {
            fold_accuracies
                .iter()
                .map(|a| (a - mean).powi(2))
                .sum::<f64>()
                / n
        } else {
            0.0
        };

        Self {
            fold_accuracies,
            mean_accuracy: mean,
            std_accuracy: variance.sqrt(),
        }
    }
}

/// Trait for binary risk classifiers.
///
/// Labels are 1 = High Risk, 0 = Low Risk throughout. Predictions and
/// probabilities are aligned 1:1 with the input rows.
pub trait Classifier: Send + Sync {
    /// Fit the model to a feature matrix and labels.
    ///
    /// # Errors
    /// Returns error if the input is empty or inconsistently shaped.
    fn train(
        &mut self,
        features: &[Vec<f64>],
        labels: &[u8],
        schema: &FeatureSchema,
    ) -> Result<(), ModelError>;

    /// Binary predictions for each row.
    ///
    /// # Errors
    /// Returns [`ModelError::NotTrained`] before training.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<u8>, ModelError>;

    /// High-risk probability in [0, 1] for each row.
    ///
    /// # Errors
    /// Returns [`ModelError::NotTrained`] before training.
    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    /// K-fold cross-validation over the full dataset.
    ///
    /// # Errors
    /// Returns error if there are fewer rows than folds.
    fn cross_validate(
        &self,
        features: &[Vec<f64>],
        labels: &[u8],
        schema: &FeatureSchema,
        folds: usize,
    ) -> Result<CrossValidation, ModelError>;

    /// Per-feature importance weights, normalized to sum to 1.
    ///
    /// # Errors
    /// Returns [`ModelError::NotTrained`] before training.
    fn feature_importance(&self) -> Result<BTreeMap<String, f64>, ModelError>;
}

/// Durable persistence of a trained model artifact.
pub trait ModelPersistence {
    /// Write the trained model to `path`.
    ///
    /// # Errors
    /// Returns error if the model is untrained or the write fails.
    fn save_model(&self, path: &Path) -> Result<(), ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_validation_summary() {
        let cv = CrossValidation::from_folds(vec![0.8, 0.9, 1.0]);
        assert!((cv.mean_accuracy - 0.9).abs() < 1e-12);
        assert!(cv.std_accuracy > 0.0);
    }

    #[test]
    fn test_cross_validation_empty() {
        let cv = CrossValidation::from_folds(Vec::new());
        assert_eq!(cv.mean_accuracy, 0.0);
        assert_eq!(cv.std_accuracy, 0.0);
    }
}
