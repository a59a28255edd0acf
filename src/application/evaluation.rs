//! Evaluation metrics for the batch pipeline.
//!
//! Computes the standard binary-classification metrics over the held-out
//! split (after the credit-score override) and persists them as a JSON
//! report in the output directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::{LendguardError, Result};

/// Binary confusion matrix; positive class is High Risk (1).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against true labels.
    #[must_use]
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = Self {
            true_positive: 0,
            false_positive: 0,
            true_negative: 0,
            false_negative: 0,
        };

        for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
            match (truth, pred) {
                (1, 1) => cm.true_positive += 1,
                (0, 1) => cm.false_positive += 1,
                (0, 0) => cm.true_negative += 1,
                _ => cm.false_negative += 1,
            }
        }

        cm
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    #[must_use]
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Area under the ROC curve via the rank statistic, with average ranks for
/// tied scores.
///
/// Returns `None` when either class is absent (the curve is undefined).
#[must_use]
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n = y_true.len();
    let positives = y_true.iter().filter(|&&y| y == 1).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(std::cmp::Ordering::Equal));

    // Assign average ranks to tied scores (1-based).
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&y, _)| y == 1)
        .map(|(_, &r)| r)
        .sum();

    let u = positive_rank_sum - (positives * (positives + 1)) as f64 / 2.0;
    Some(u / (positives as f64 * negatives as f64))
}

/// Full metrics report for one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: Option<f64>,
    pub confusion: ConfusionMatrix,
    pub override_count: usize,
    pub feature_importance: BTreeMap<String, f64>,
}

impl EvaluationReport {
    /// Write the report as pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!("Saved evaluation report to {:?}", path);
        Ok(())
    }
}

/// Compute all evaluation metrics for one run.
///
/// `y_pred` is the final (overridden) prediction sequence; `y_proba` the
/// model's raw probabilities, used for the ROC curve.
///
/// # Errors
/// Returns a validation error when the sequences are not aligned.
pub fn evaluate(
    y_true: &[u8],
    y_pred: &[u8],
    y_proba: &[f64],
    feature_importance: BTreeMap<String, f64>,
    override_count: usize,
) -> Result<EvaluationReport> {
    if y_true.len() != y_pred.len() || y_true.len() != y_proba.len() {
        return Err(LendguardError::Validation(format!(
            "Evaluation inputs misaligned: {} labels, {} predictions, {} probabilities",
            y_true.len(),
            y_pred.len(),
            y_proba.len()
        )));
    }

    let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
    let report = EvaluationReport {
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1_score: confusion.f1_score(),
        roc_auc: roc_auc(y_true, y_proba),
        confusion,
        override_count,
        feature_importance,
    };

    tracing::info!(
        "Evaluation: accuracy={:.4} precision={:.4} recall={:.4} f1={:.4} roc_auc={}",
        report.accuracy,
        report.precision,
        report.recall,
        report.f1_score,
        report
            .roc_auc
            .map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}")),
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_counts() {
        let y_true = [1, 1, 0, 0, 1, 0];
        let y_pred = [1, 0, 0, 1, 1, 0];

        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred);
        assert_eq!(cm.true_positive, 2);
        assert_eq!(cm.false_negative, 1);
        assert_eq!(cm.false_positive, 1);
        assert_eq!(cm.true_negative, 2);

        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-12);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.f1_score() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_classifier() {
        let y_true = [1, 0, 1, 0];
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_true);
        assert!((cm.accuracy() - 1.0).abs() < 1e-12);
        assert!((cm.precision() - 1.0).abs() < 1e-12);
        assert!((cm.recall() - 1.0).abs() < 1e-12);
        assert!((cm.f1_score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_metrics_are_zero() {
        // No positive predictions and no positive labels.
        let cm = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0]);
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f1_score(), 0.0);
        assert!((cm.accuracy() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_ranking() {
        let y_true = [0, 0, 1, 1];
        let scores = [0.1, 0.2, 0.8, 0.9];
        let auc = roc_auc(&y_true, &scores).expect("defined");
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_random_ranking() {
        // Equal scores carry no information: AUC is exactly 0.5.
        let y_true = [0, 1, 0, 1];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let auc = roc_auc(&y_true, &scores).expect("defined");
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class_undefined() {
        assert!(roc_auc(&[1, 1], &[0.3, 0.7]).is_none());
        assert!(roc_auc(&[0, 0], &[0.3, 0.7]).is_none());
    }

    #[test]
    fn test_evaluate_rejects_misaligned_inputs() {
        let result = evaluate(&[1, 0], &[1], &[0.5, 0.5], BTreeMap::new(), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_save() {
        let report = evaluate(
            &[1, 0, 1, 0],
            &[1, 0, 1, 1],
            &[0.9, 0.2, 0.8, 0.6],
            BTreeMap::from([("credit_score".to_string(), 1.0)]),
            1,
        )
        .expect("evaluates");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metrics.json");
        report.save(&path).expect("saves");

        let content = std::fs::read_to_string(&path).expect("reads");
        assert!(content.contains("\"accuracy\""));
        assert!(content.contains("\"override_count\": 1"));
    }
}
