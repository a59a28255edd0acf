//! Analytics service: aggregate statistics over stored assessments.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::RiskLabel;
use crate::ports::Storage;
use crate::{LendguardError, Result};

/// Aggregate statistics for the analytics view.
#[derive(Debug, Clone, Default)]
pub struct RiskStatistics {
    /// Total stored assessments
    pub total: usize,

    /// Assessments labeled High
    pub high_risk: usize,

    /// High-risk share of the total
    pub high_risk_rate: f64,

    /// Mean debt-to-income across assessments
    pub avg_debt_to_income: f64,

    /// Mean monthly installment across assessments
    pub avg_installment: f64,

    /// How often each reason code triggered
    pub reason_counts: BTreeMap<String, usize>,
}

/// Service computing statistics over the assessment history.
pub struct AnalyticsService<S>
where
    S: Storage,
{
    storage: Arc<S>,
}

impl<S> AnalyticsService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new analytics service.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Aggregate all stored assessments.
    ///
    /// # Errors
    /// Returns error if the storage operation fails.
    pub fn statistics(&self) -> Result<RiskStatistics> {
        let assessments = self
            .storage
            .load_assessments()
            .map_err(|e| LendguardError::Storage(e.into()))?;

        if assessments.is_empty() {
            return Ok(RiskStatistics::default());
        }

        let total = assessments.len();
        let high_risk = assessments
            .iter()
            .filter(|a| a.verdict.label == RiskLabel::High)
            .count();

        let dti_sum: f64 = assessments
            .iter()
            .map(|a| a.affordability.debt_to_income)
            .sum();
        let installment_sum: f64 = assessments
            .iter()
            .map(|a| a.affordability.monthly_installment)
            .sum();

        let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
        for assessment in &assessments {
            for reason in &assessment.verdict.reasons {
                *reason_counts.entry(reason.label().to_string()).or_insert(0) += 1;
            }
        }

        let stats = RiskStatistics {
            total,
            high_risk,
            high_risk_rate: high_risk as f64 / total as f64,
            avg_debt_to_income: dti_sum / total as f64,
            avg_installment: installment_sum / total as f64,
            reason_counts,
        };

        tracing::info!(
            "Statistics: {} assessments, {:.1}% high risk",
            stats.total,
            stats.high_risk_rate * 100.0
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::domain::{Affordability, Assessment, ReasonCode, RiskVerdict};

    fn service_with_storage() -> (AnalyticsService<SqliteStorage>, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create db"));
        (AnalyticsService::new(storage.clone()), storage)
    }

    fn store(storage: &SqliteStorage, reasons: Vec<ReasonCode>, dti: f64) {
        use crate::ports::Storage as _;
        let assessment = Assessment::new(
            RiskVerdict::from_reasons(reasons),
            Affordability {
                monthly_income: 50_000.0,
                monthly_installment: dti * 50_000.0,
                debt_to_income: dti,
            },
        );
        storage.save_assessment(&assessment).expect("saves");
    }

    #[test]
    fn test_empty_statistics() {
        let (service, _storage) = service_with_storage();
        let stats = service.statistics().expect("stats");
        assert_eq!(stats.total, 0);
        assert_eq!(stats.high_risk_rate, 0.0);
    }

    #[test]
    fn test_aggregation() {
        let (service, storage) = service_with_storage();
        store(&storage, Vec::new(), 0.1);
        store(&storage, vec![ReasonCode::LowCreditScore], 0.3);
        store(
            &storage,
            vec![ReasonCode::LowCreditScore, ReasonCode::ExcessiveDebtBurden],
            0.5,
        );

        let stats = service.statistics().expect("stats");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.high_risk, 2);
        assert!((stats.high_risk_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.avg_debt_to_income - 0.3).abs() < 1e-12);
        assert_eq!(stats.reason_counts["Low Credit Score (< 650)"], 2);
        assert_eq!(stats.reason_counts["EMI exceeds 40% of monthly income"], 1);
    }
}
