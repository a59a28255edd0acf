//! Assessment service: the interactive path.
//!
//! Each request is a pure computation over an immutable application:
//! derive affordability, evaluate the deterministic rules, aggregate the
//! verdict. Persisting to history is best-effort; a storage failure must
//! never withhold a verdict from the operator.

use std::sync::Arc;

use crate::domain::{
    evaluate_rules, Affordability, Assessment, LoanApplication, RiskVerdict, RuleThresholds,
};
use crate::ports::Storage;
use crate::{LendguardError, Result};

/// Service for assessing loan applications.
pub struct AssessmentService<S>
where
    S: Storage,
{
    storage: Arc<S>,
    thresholds: RuleThresholds,
}

impl<S> AssessmentService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a service with the default underwriting thresholds.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_thresholds(storage, RuleThresholds::default())
    }

    /// Create a service with explicit thresholds.
    pub fn with_thresholds(storage: Arc<S>, thresholds: RuleThresholds) -> Self {
        Self {
            storage,
            thresholds,
        }
    }

    /// The thresholds in effect.
    #[must_use]
    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Assess a single application.
    ///
    /// # Errors
    /// Returns [`LendguardError::Validation`] when fields are out of domain.
    pub fn assess(&self, application: &LoanApplication) -> Result<Assessment> {
        if let Err(errors) = application.validate() {
            return Err(LendguardError::Validation(errors.join("; ")));
        }

        let affordability = Affordability::derive(application);
        let reasons = evaluate_rules(application, &affordability, &self.thresholds);
        let verdict = RiskVerdict::from_reasons(reasons);
        let assessment = Assessment::new(verdict, affordability);

        if let Err(e) = self.storage.save_assessment(&assessment) {
            tracing::warn!("Failed to save assessment: {:?}", e);
        }

        tracing::info!(
            "Assessment complete: label={}, reasons={}, installment={:.0}, dti={:.3}",
            assessment.verdict.label,
            assessment.verdict.reasons.len(),
            assessment.affordability.monthly_installment,
            assessment.affordability.debt_to_income
        );

        Ok(assessment)
    }

    /// Get recent assessments from storage.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn recent_assessments(&self, limit: usize) -> Result<Vec<Assessment>> {
        self.storage
            .load_recent_assessments(limit)
            .map_err(|e| LendguardError::Storage(e.into()))
    }

    /// Get the total assessment count.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn count_assessments(&self) -> Result<usize> {
        self.storage
            .count_assessments()
            .map_err(|e| LendguardError::Storage(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::domain::{ReasonCode, RiskLabel};

    fn create_test_service() -> AssessmentService<SqliteStorage> {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create db"));
        AssessmentService::new(storage)
    }

    fn low_risk_application() -> LoanApplication {
        LoanApplication {
            age: 30,
            employment_years: 5,
            annual_income: 1_200_000.0,
            credit_score: 780,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 10.0,
        }
    }

    #[test]
    fn test_low_risk_assessment() {
        let service = create_test_service();
        let assessment = service.assess(&low_risk_application()).expect("assesses");

        assert_eq!(assessment.verdict.label, RiskLabel::Low);
        assert!(assessment.verdict.reasons.is_empty());
        assert_eq!(assessment.verdict.repayment_probability, 100);
        assert!((assessment.affordability.monthly_installment - 9_680.16).abs() < 1.0);
        assert!((assessment.affordability.debt_to_income - 0.0968).abs() < 0.001);
    }

    #[test]
    fn test_high_risk_assessment() {
        let service = create_test_service();
        let application = LoanApplication {
            annual_income: 400_000.0,
            credit_score: 520,
            loan_amount: 500_000.0,
            loan_term_months: 12,
            interest_rate: 22.0,
            ..low_risk_application()
        };

        let assessment = service.assess(&application).expect("assesses");
        assert_eq!(assessment.verdict.label, RiskLabel::High);
        assert!(assessment
            .verdict
            .reasons
            .contains(&ReasonCode::LowCreditScore));
        assert!(assessment
            .verdict
            .reasons
            .contains(&ReasonCode::HighInterestRate));
        assert_eq!(assessment.verdict.default_probability, 100);
    }

    #[test]
    fn test_assessments_are_persisted() {
        let service = create_test_service();
        service.assess(&low_risk_application()).expect("assesses");
        service.assess(&low_risk_application()).expect("assesses");

        assert_eq!(service.count_assessments().expect("counts"), 2);
        assert_eq!(service.recent_assessments(10).expect("loads").len(), 2);
    }

    #[test]
    fn test_invalid_application_rejected() {
        let service = create_test_service();
        let invalid = LoanApplication {
            age: 18,
            ..low_risk_application()
        };

        let err = service.assess(&invalid).expect_err("must reject");
        assert!(matches!(err, LendguardError::Validation(_)));
        assert_eq!(service.count_assessments().expect("counts"), 0);
    }
}
