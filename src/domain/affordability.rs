//! Affordability calculation: monthly installment and debt-to-income ratio.

use serde::{Deserialize, Serialize};

use super::LoanApplication;

/// Compute the fixed monthly installment (EMI) amortizing `principal` over
/// `term_months` at `annual_rate_percent`.
///
/// Uses the standard annuity formula with monthly rate r = rate / 1200:
/// `P * r * (1+r)^n / ((1+r)^n - 1)`. At a zero rate the formula degenerates
/// to 0/0, so that case is the plain division `P / n`.
#[must_use]
pub fn monthly_installment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let r = annual_rate_percent / 1200.0;

    if r == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Derived affordability metrics for one application.
///
/// Recomputed on demand from the application; stored only as part of an
/// [`Assessment`](super::Assessment) record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Affordability {
    /// Annual income divided by 12
    pub monthly_income: f64,

    /// Fixed monthly installment for the requested loan
    pub monthly_installment: f64,

    /// Installment as a fraction of monthly income (always >= 0)
    pub debt_to_income: f64,
}

impl Affordability {
    /// Derive the metrics from an application's loan terms and income.
    #[must_use]
    pub fn derive(application: &LoanApplication) -> Self {
        let monthly_income = application.annual_income / 12.0;
        let installment = monthly_installment(
            application.loan_amount,
            application.interest_rate,
            application.loan_term_months,
        );

        Self {
            monthly_income,
            monthly_installment: installment,
            debt_to_income: installment / monthly_income,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_installment() {
        // 300,000 over 36 months at 10% -> 9,680.16 per month.
        let emi = monthly_installment(300_000.0, 10.0, 36);
        assert!((emi - 9_680.16).abs() < 1.0, "emi = {emi}");
    }

    #[test]
    fn test_zero_rate_is_plain_division() {
        let emi = monthly_installment(120_000.0, 0.0, 24);
        assert!((emi - 5_000.0).abs() < f64::EPSILON);
        assert!(emi.is_finite());
    }

    #[test]
    fn test_monotonic_in_principal() {
        let low = monthly_installment(100_000.0, 12.0, 36);
        let high = monthly_installment(200_000.0, 12.0, 36);
        assert!(high > low);
    }

    #[test]
    fn test_monotonic_in_rate() {
        let low = monthly_installment(100_000.0, 8.0, 36);
        let high = monthly_installment(100_000.0, 16.0, 36);
        assert!(high > low);
    }

    #[test]
    fn test_decreasing_in_term() {
        let short = monthly_installment(100_000.0, 12.0, 12);
        let long = monthly_installment(100_000.0, 12.0, 60);
        assert!(long < short);
    }

    #[test]
    fn test_derived_metrics() {
        let application = LoanApplication {
            age: 30,
            employment_years: 5,
            annual_income: 1_200_000.0,
            credit_score: 780,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 10.0,
        };

        let affordability = Affordability::derive(&application);
        assert!((affordability.monthly_income - 100_000.0).abs() < f64::EPSILON);
        assert!((affordability.monthly_installment - 9_680.16).abs() < 1.0);
        assert!((affordability.debt_to_income - 0.0968).abs() < 0.001);
        assert!(affordability.debt_to_income >= 0.0);
    }
}
