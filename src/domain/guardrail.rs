//! Credit-score guardrail for model predictions.
//!
//! The statistical model may under-predict risk for low-credit-score
//! applicants, so this rule is a hard floor: any row whose credit score falls
//! below the threshold is forced to High Risk regardless of the model's own
//! prediction.

use super::RuleThresholds;

/// Name of the credit-score feature the guardrail keys on.
pub const CREDIT_SCORE_FEATURE: &str = "credit_score";

/// Ordered feature names describing the columns of a feature matrix.
///
/// Column lookups go through this schema rather than ad-hoc string searches
/// at every call site, so schema changes surface in one place.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from ordered feature names.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Column index of a feature by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The ordered feature names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Errors from the guardrail preconditions.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuardrailError {
    #[error("predictions length {predictions} does not match feature rows {rows}")]
    LengthMismatch { rows: usize, predictions: usize },

    #[error("row {row} has {got} columns, schema expects {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// Result of applying the credit-score floor to a prediction sequence.
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    /// Final predictions with qualifying rows forced to 1
    pub predictions: Vec<u8>,

    /// Number of rows whose prediction was changed
    pub override_count: usize,

    /// Whether the rule was applied at all (false when the credit-score
    /// feature is absent from the schema)
    pub applied: bool,
}

/// Force predictions to High Risk (1) for every row whose credit score is
/// strictly below `floor`.
///
/// The feature matrix must be UNSCALED: the floor compares raw credit
/// scores. If the schema has no credit-score column the rule is skipped with
/// a warning and the predictions are returned unchanged; a missing optional
/// feature must not abort the pipeline.
///
/// # Errors
/// Returns [`GuardrailError::LengthMismatch`] when predictions are not
/// aligned 1:1 with feature rows.
pub fn apply_credit_score_floor(
    features: &[Vec<f64>],
    predictions: &[u8],
    schema: &FeatureSchema,
    floor: f64,
) -> Result<OverrideOutcome, GuardrailError> {
    if features.len() != predictions.len() {
        return Err(GuardrailError::LengthMismatch {
            rows: features.len(),
            predictions: predictions.len(),
        });
    }

    let Some(column) = schema.index_of(CREDIT_SCORE_FEATURE) else {
        tracing::warn!(
            "Feature '{CREDIT_SCORE_FEATURE}' not found in schema; credit-score rule not applied"
        );
        return Ok(OverrideOutcome {
            predictions: predictions.to_vec(),
            override_count: 0,
            applied: false,
        });
    };

    let mut overridden = predictions.to_vec();
    let mut override_count = 0;

    for (index, (row, prediction)) in features.iter().zip(overridden.iter_mut()).enumerate() {
        let score = *row.get(column).ok_or(GuardrailError::RowWidth {
            row: index,
            expected: schema.len(),
            got: row.len(),
        })?;

        if score < floor {
            if *prediction != 1 {
                override_count += 1;
            }
            *prediction = 1;
        }
    }

    Ok(OverrideOutcome {
        predictions: overridden,
        override_count,
        applied: true,
    })
}

/// Convenience wrapper using the configured credit-score floor.
///
/// # Errors
/// Same as [`apply_credit_score_floor`].
pub fn apply_thresholds(
    features: &[Vec<f64>],
    predictions: &[u8],
    schema: &FeatureSchema,
    thresholds: &RuleThresholds,
) -> Result<OverrideOutcome, GuardrailError> {
    apply_credit_score_floor(
        features,
        predictions,
        schema,
        f64::from(thresholds.credit_score_floor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "annual_income".to_string(),
            "credit_score".to_string(),
            "loan_amount".to_string(),
        ])
    }

    fn rows() -> Vec<Vec<f64>> {
        vec![
            vec![600_000.0, 600.0, 300_000.0], // below floor
            vec![900_000.0, 720.0, 200_000.0], // above floor
            vec![500_000.0, 640.0, 100_000.0], // below floor
            vec![700_000.0, 650.0, 250_000.0], // exactly at floor
        ]
    }

    #[test]
    fn test_low_scores_forced_to_high_risk() {
        let outcome =
            apply_credit_score_floor(&rows(), &[0, 0, 1, 0], &schema(), 650.0).expect("aligned");

        assert!(outcome.applied);
        assert_eq!(outcome.predictions, vec![1, 0, 1, 0]);
        // Row 0 changed; row 2 already predicted 1; row 3 is at the floor,
        // not strictly below it.
        assert_eq!(outcome.override_count, 1);
    }

    #[test]
    fn test_idempotent() {
        let first =
            apply_credit_score_floor(&rows(), &[0, 1, 0, 1], &schema(), 650.0).expect("aligned");
        let second = apply_credit_score_floor(&rows(), &first.predictions, &schema(), 650.0)
            .expect("aligned");

        assert_eq!(second.predictions, first.predictions);
        assert_eq!(second.override_count, 0);
    }

    #[test]
    fn test_missing_feature_is_recoverable() {
        let no_score = FeatureSchema::new(vec![
            "annual_income".to_string(),
            "loan_amount".to_string(),
        ]);
        let features = vec![vec![600_000.0, 300_000.0], vec![900_000.0, 200_000.0]];
        let predictions = [1, 0];

        let outcome = apply_credit_score_floor(&features, &predictions, &no_score, 650.0)
            .expect("must not abort");

        assert!(!outcome.applied);
        assert_eq!(outcome.predictions, predictions.to_vec());
        assert_eq!(outcome.override_count, 0);
    }

    #[test]
    fn test_misaligned_predictions_rejected() {
        let err = apply_credit_score_floor(&rows(), &[0, 0], &schema(), 650.0)
            .expect_err("misalignment is typed");
        assert!(matches!(
            err,
            GuardrailError::LengthMismatch {
                rows: 4,
                predictions: 2
            }
        ));
    }

    #[test]
    fn test_override_count_bounded_by_qualifying_rows() {
        // All predictions already 1: nothing changes even below the floor.
        let outcome =
            apply_credit_score_floor(&rows(), &[1, 1, 1, 1], &schema(), 650.0).expect("aligned");
        assert_eq!(outcome.override_count, 0);
        assert_eq!(outcome.predictions, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_configured_floor() {
        let thresholds = RuleThresholds::default();
        let outcome =
            apply_thresholds(&rows(), &[0, 0, 0, 0], &schema(), &thresholds).expect("aligned");
        assert_eq!(outcome.predictions, vec![1, 0, 1, 0]);
        assert_eq!(outcome.override_count, 2);
    }
}
