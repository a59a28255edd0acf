//! Logistic regression adapter: Implementation of Classifier.
//!
//! A linear model over standardized affordability features, fitted by
//! full-batch gradient descent with L2 regularization. The learned
//! coefficients double as feature importances, and the trained state is
//! persisted as a JSON artifact (feature names, coefficients, intercept).
//!
//! Training is deterministic for a given seed; shuffling for
//! cross-validation uses ChaCha20.

use std::collections::BTreeMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::domain::FeatureSchema;
use crate::ports::{Classifier, CrossValidation, ModelError, ModelPersistence};

/// Gradient-descent hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Step size for gradient descent
    pub learning_rate: f64,

    /// Number of full-batch passes
    pub epochs: usize,

    /// L2 regularization strength
    pub l2: f64,

    /// Seed for cross-validation shuffling
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2: 1e-3,
            seed: 42,
        }
    }
}

/// Trained model parameters as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone)]
struct Fitted {
    weights: Vec<f64>,
    intercept: f64,
    schema: FeatureSchema,
}

/// Logistic regression risk classifier.
#[derive(Debug, Clone, Default)]
pub struct LogisticModel {
    options: TrainingOptions,
    fitted: Option<Fitted>,
}

impl LogisticModel {
    /// Create an untrained model with default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TrainingOptions::default())
    }

    /// Create an untrained model with explicit hyperparameters.
    #[must_use]
    pub fn with_options(options: TrainingOptions) -> Self {
        Self {
            options,
            fitted: None,
        }
    }

    /// Load a trained model from a JSON artifact.
    ///
    /// # Errors
    /// Returns [`ModelError::Artifact`] if the file cannot be read, parsed,
    /// or fails the shape sanity checks.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Artifact(format!("Failed to read {path:?}: {e}")))?;
        let artifact: ModelArtifact = serde_json::from_str(&content)
            .map_err(|e| ModelError::Artifact(format!("Invalid model JSON: {e}")))?;

        let n = artifact.feature_names.len();
        if n == 0 {
            return Err(ModelError::Artifact(
                "Model artifact has no features".into(),
            ));
        }
        if artifact.coefficients.len() != n {
            return Err(ModelError::Artifact(format!(
                "Coefficient count {} does not match feature_names length {n}",
                artifact.coefficients.len()
            )));
        }

        tracing::info!("Loaded model from {:?} (n_features={n})", path);

        Ok(Self {
            options: TrainingOptions::default(),
            fitted: Some(Fitted {
                weights: artifact.coefficients,
                intercept: artifact.intercept,
                schema: FeatureSchema::new(artifact.feature_names),
            }),
        })
    }

    fn fitted(&self) -> Result<&Fitted, ModelError> {
        self.fitted.as_ref().ok_or(ModelError::NotTrained)
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    fn decision(fitted: &Fitted, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != fitted.weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: fitted.weights.len(),
                got: row.len(),
            });
        }

        let dot: f64 = fitted
            .weights
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + fitted.intercept)
    }

    fn check_training_input(
        features: &[Vec<f64>],
        labels: &[u8],
        schema: &FeatureSchema,
    ) -> Result<(), ModelError> {
        if features.is_empty() {
            return Err(ModelError::InvalidInput("No training rows".into()));
        }
        if features.len() != labels.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if schema.is_empty() {
            return Err(ModelError::InvalidInput("Empty feature schema".into()));
        }
        for row in features {
            if row.len() != schema.len() {
                return Err(ModelError::DimensionMismatch {
                    expected: schema.len(),
                    got: row.len(),
                });
            }
        }
        if labels.iter().any(|&y| y > 1) {
            return Err(ModelError::InvalidInput(
                "Labels must be binary (0 or 1)".into(),
            ));
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn train(
        &mut self,
        features: &[Vec<f64>],
        labels: &[u8],
        schema: &FeatureSchema,
    ) -> Result<(), ModelError> {
        Self::check_training_input(features, labels, schema)?;

        let n_features = schema.len();
        let m = features.len() as f64;
        let mut weights = vec![0.0; n_features];
        let mut intercept = 0.0;

        for _ in 0..self.options.epochs {
            let mut grad_w = vec![0.0; n_features];
            let mut grad_b = 0.0;

            for (row, &label) in features.iter().zip(labels.iter()) {
                let dot: f64 = weights.iter().zip(row.iter()).map(|(w, x)| w * x).sum();
                let error = Self::sigmoid(dot + intercept) - f64::from(label);

                for (g, x) in grad_w.iter_mut().zip(row.iter()) {
                    *g += error * x;
                }
                grad_b += error;
            }

            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= self.options.learning_rate * (g / m + self.options.l2 * *w);
            }
            intercept -= self.options.learning_rate * grad_b / m;
        }

        tracing::info!(
            "Trained logistic model on {} rows, {} features ({} epochs)",
            features.len(),
            n_features,
            self.options.epochs
        );

        self.fitted = Some(Fitted {
            weights,
            intercept,
            schema: schema.clone(),
        });
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<u8>, ModelError> {
        let probabilities = self.predict_proba(features)?;
        Ok(probabilities
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let fitted = self.fitted()?;

        features
            .iter()
            .map(|row| Self::decision(fitted, row).map(Self::sigmoid))
            .collect()
    }

    fn cross_validate(
        &self,
        features: &[Vec<f64>],
        labels: &[u8],
        schema: &FeatureSchema,
        folds: usize,
    ) -> Result<CrossValidation, ModelError> {
        if folds < 2 {
            return Err(ModelError::InvalidInput(format!(
                "Cross-validation needs at least 2 folds, got {folds}"
            )));
        }
        if features.len() < folds {
            return Err(ModelError::InvalidInput(format!(
                "Cannot split {} rows into {folds} folds",
                features.len()
            )));
        }
        Self::check_training_input(features, labels, schema)?;

        let mut indices: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha20Rng::seed_from_u64(self.options.seed);
        indices.shuffle(&mut rng);

        let fold_size = features.len() / folds;
        let mut fold_accuracies = Vec::with_capacity(folds);

        for fold in 0..folds {
            let start = fold * fold_size;
            // Last fold absorbs the remainder.
            let end = if fold == folds - 1 {
                features.len()
            } else {
                start + fold_size
            };
            let held_out = &indices[start..end];

            let mut train_x = Vec::with_capacity(features.len() - held_out.len());
            let mut train_y = Vec::with_capacity(features.len() - held_out.len());
            for &i in indices[..start].iter().chain(indices[end..].iter()) {
                train_x.push(features[i].clone());
                train_y.push(labels[i]);
            }

            let mut model = Self::with_options(self.options);
            model.train(&train_x, &train_y, schema)?;

            let test_x: Vec<Vec<f64>> = held_out.iter().map(|&i| features[i].clone()).collect();
            let predictions = model.predict(&test_x)?;
            let correct = predictions
                .iter()
                .zip(held_out.iter())
                .filter(|(p, &i)| **p == labels[i])
                .count();

            fold_accuracies.push(correct as f64 / held_out.len() as f64);
        }

        let cv = CrossValidation::from_folds(fold_accuracies);
        tracing::info!(
            "Cross-validation ({folds} folds): accuracy {:.4} +/- {:.4}",
            cv.mean_accuracy,
            cv.std_accuracy
        );
        Ok(cv)
    }

    fn feature_importance(&self) -> Result<BTreeMap<String, f64>, ModelError> {
        let fitted = self.fitted()?;

        let total: f64 = fitted.weights.iter().map(|w| w.abs()).sum();
        let importance = fitted
            .schema
            .names()
            .iter()
            .zip(fitted.weights.iter())
            .map(|(name, w)| {
                let share = if total > 0.0 { w.abs() / total } else { 0.0 };
                (name.clone(), share)
            })
            .collect();

        Ok(importance)
    }
}

impl ModelPersistence for LogisticModel {
    fn save_model(&self, path: &Path) -> Result<(), ModelError> {
        let fitted = self.fitted()?;

        let artifact = ModelArtifact {
            feature_names: fitted.schema.names().to_vec(),
            coefficients: fitted.weights.clone(),
            intercept: fitted.intercept,
        };

        let json = serde_json::to_string_pretty(&artifact)
            .map_err(|e| ModelError::Artifact(format!("Failed to serialize model: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| ModelError::Artifact(format!("Failed to write {path:?}: {e}")))?;

        tracing::info!("Saved model artifact to {:?}", path);
        Ok(())
    }
}
