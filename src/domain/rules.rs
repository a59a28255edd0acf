//! Deterministic risk rules.
//!
//! Four independent, additive rules evaluated against an application and its
//! derived affordability metrics. Rules never short-circuit; every triggered
//! rule contributes its reason code, in a fixed order, so reason listings are
//! reproducible.

use serde::{Deserialize, Serialize};

use super::{Affordability, LoanApplication};

/// Qualifying thresholds for the risk rules.
///
/// The defaults are the underwriting policy constants; both the interactive
/// path and the batch guardrail derive their thresholds from here so the two
/// paths can never drift apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Scores strictly below this trigger the credit-score rule
    pub credit_score_floor: u32,

    /// Rates at or above this (percent) trigger the interest-rate rule
    pub interest_rate_ceiling: f64,

    /// Open-loan counts at or above this trigger the existing-loans rule
    pub existing_loans_ceiling: u32,

    /// Debt-to-income strictly above this triggers the affordability rule
    pub debt_to_income_ceiling: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            credit_score_floor: 650,
            interest_rate_ceiling: 20.0,
            existing_loans_ceiling: 3,
            debt_to_income_ceiling: 0.4,
        }
    }
}

/// Reason codes identifying which rule triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    LowCreditScore,
    HighInterestRate,
    TooManyExistingLoans,
    ExcessiveDebtBurden,
}

impl ReasonCode {
    /// The fixed, human-readable label for this reason.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LowCreditScore => "Low Credit Score (< 650)",
            Self::HighInterestRate => "High Interest Rate (\u{2265} 20%)",
            Self::TooManyExistingLoans => "Too Many Existing Loans",
            Self::ExcessiveDebtBurden => "EMI exceeds 40% of monthly income",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluate all rules against one application.
///
/// Returns the triggered reason codes in rule order: credit score, interest
/// rate, existing loans, debt-to-income.
#[must_use]
pub fn evaluate_rules(
    application: &LoanApplication,
    affordability: &Affordability,
    thresholds: &RuleThresholds,
) -> Vec<ReasonCode> {
    let mut reasons = Vec::new();

    if application.credit_score < thresholds.credit_score_floor {
        reasons.push(ReasonCode::LowCreditScore);
    }

    if application.interest_rate >= thresholds.interest_rate_ceiling {
        reasons.push(ReasonCode::HighInterestRate);
    }

    if application.existing_loans >= thresholds.existing_loans_ceiling {
        reasons.push(ReasonCode::TooManyExistingLoans);
    }

    if affordability.debt_to_income > thresholds.debt_to_income_ceiling {
        reasons.push(ReasonCode::ExcessiveDebtBurden);
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_application() -> LoanApplication {
        // Comfortably inside every threshold.
        LoanApplication {
            age: 35,
            employment_years: 8,
            annual_income: 1_200_000.0,
            credit_score: 780,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 10.0,
        }
    }

    fn evaluate(application: &LoanApplication) -> Vec<ReasonCode> {
        let affordability = Affordability::derive(application);
        evaluate_rules(application, &affordability, &RuleThresholds::default())
    }

    #[test]
    fn test_no_rule_triggers() {
        assert!(evaluate(&clean_application()).is_empty());
    }

    #[test]
    fn test_low_credit_score_alone() {
        let application = LoanApplication {
            credit_score: 649,
            ..clean_application()
        };
        assert_eq!(evaluate(&application), vec![ReasonCode::LowCreditScore]);
    }

    #[test]
    fn test_credit_score_boundary_does_not_trigger() {
        let application = LoanApplication {
            credit_score: 650,
            ..clean_application()
        };
        assert!(evaluate(&application).is_empty());
    }

    #[test]
    fn test_high_interest_rate_alone() {
        let application = LoanApplication {
            interest_rate: 20.0,
            ..clean_application()
        };
        assert_eq!(evaluate(&application), vec![ReasonCode::HighInterestRate]);
    }

    #[test]
    fn test_existing_loans_alone() {
        let application = LoanApplication {
            existing_loans: 3,
            ..clean_application()
        };
        assert_eq!(
            evaluate(&application),
            vec![ReasonCode::TooManyExistingLoans]
        );
    }

    #[test]
    fn test_debt_burden_alone() {
        // 500,000 over 12 months at 10% against 400,000/yr income pushes
        // debt-to-income well past 0.4 without touching the other rules.
        let application = LoanApplication {
            annual_income: 400_000.0,
            loan_amount: 500_000.0,
            loan_term_months: 12,
            interest_rate: 10.0,
            ..clean_application()
        };
        assert_eq!(evaluate(&application), vec![ReasonCode::ExcessiveDebtBurden]);
    }

    #[test]
    fn test_multiple_rules_in_fixed_order() {
        // The high-risk sample profile: bad score, punitive rate, heavy EMI.
        let application = LoanApplication {
            annual_income: 400_000.0,
            credit_score: 520,
            loan_amount: 500_000.0,
            loan_term_months: 12,
            interest_rate: 22.0,
            ..clean_application()
        };

        let reasons = evaluate(&application);
        assert_eq!(
            reasons,
            vec![
                ReasonCode::LowCreditScore,
                ReasonCode::HighInterestRate,
                ReasonCode::ExcessiveDebtBurden,
            ]
        );
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(
            ReasonCode::LowCreditScore.label(),
            "Low Credit Score (< 650)"
        );
        assert_eq!(
            ReasonCode::HighInterestRate.label(),
            "High Interest Rate (\u{2265} 20%)"
        );
        assert_eq!(
            ReasonCode::TooManyExistingLoans.label(),
            "Too Many Existing Loans"
        );
        assert_eq!(
            ReasonCode::ExcessiveDebtBurden.label(),
            "EMI exceeds 40% of monthly income"
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = RuleThresholds {
            credit_score_floor: 800,
            ..RuleThresholds::default()
        };
        let application = clean_application();
        let affordability = Affordability::derive(&application);

        let reasons = evaluate_rules(&application, &affordability, &strict);
        assert_eq!(reasons, vec![ReasonCode::LowCreditScore]);
    }
}
