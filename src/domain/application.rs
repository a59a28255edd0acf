//! Loan application types for repayment risk assessment.
//!
//! Field domains follow the underwriting form: ages 21-65, credit scores on
//! the 300-850 scale, loan terms from the fixed 12-60 month grid.

use serde::{Deserialize, Serialize};

/// Loan terms offered, in months.
pub const LOAN_TERMS_MONTHS: [u32; 5] = [12, 24, 36, 48, 60];

/// A single loan application submitted for assessment.
///
/// Immutable once constructed; one instance is created per assessment
/// request and never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Applicant age in years (21-65)
    pub age: u32,

    /// Years in current employment (0-40)
    pub employment_years: u32,

    /// Annual income, must be positive
    pub annual_income: f64,

    /// Credit bureau score (300-850)
    pub credit_score: u32,

    /// Number of currently open loans (0-4)
    pub existing_loans: u32,

    /// Requested principal, must be positive
    pub loan_amount: f64,

    /// Term in months, one of [`LOAN_TERMS_MONTHS`]
    pub loan_term_months: u32,

    /// Annual interest rate in percent (5.0-30.0)
    pub interest_rate: f64,
}

impl LoanApplication {
    /// Validate that all fields are within their documented domains.
    ///
    /// # Errors
    /// Returns every violation as a vector of messages.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(21..=65).contains(&self.age) {
            errors.push(format!("Age {} out of range [21, 65]", self.age));
        }
        if self.employment_years > 40 {
            errors.push(format!(
                "Employment years {} out of range [0, 40]",
                self.employment_years
            ));
        }
        if !(self.annual_income.is_finite() && self.annual_income > 0.0) {
            errors.push(format!(
                "Annual income {} must be positive",
                self.annual_income
            ));
        }
        if !(300..=850).contains(&self.credit_score) {
            errors.push(format!(
                "Credit score {} out of range [300, 850]",
                self.credit_score
            ));
        }
        if self.existing_loans > 4 {
            errors.push(format!(
                "Existing loans {} out of range [0, 4]",
                self.existing_loans
            ));
        }
        if !(self.loan_amount.is_finite() && self.loan_amount > 0.0) {
            errors.push(format!("Loan amount {} must be positive", self.loan_amount));
        }
        if !LOAN_TERMS_MONTHS.contains(&self.loan_term_months) {
            errors.push(format!(
                "Loan term {} months is not an offered term {:?}",
                self.loan_term_months, LOAN_TERMS_MONTHS
            ));
        }
        if !self.interest_rate.is_finite() || !(5.0..=30.0).contains(&self.interest_rate) {
            errors.push(format!(
                "Interest rate {} out of range [5.0, 30.0]",
                self.interest_rate
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One row of a historical loan dataset: the application fields plus the
/// observed outcome label (1 = defaulted / high risk, 0 = repaid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub age: u32,
    pub employment_years: u32,
    pub annual_income: f64,
    pub credit_score: u32,
    pub existing_loans: u32,
    pub loan_amount: f64,
    pub loan_term_months: u32,
    pub interest_rate: f64,

    /// Outcome label: 1 = high risk (defaulted), 0 = low risk (repaid)
    pub high_risk: u8,
}

impl LoanRecord {
    /// The application portion of this record.
    #[must_use]
    pub fn application(&self) -> LoanApplication {
        LoanApplication {
            age: self.age,
            employment_years: self.employment_years,
            annual_income: self.annual_income,
            credit_score: self.credit_score,
            existing_loans: self.existing_loans,
            loan_amount: self.loan_amount,
            loan_term_months: self.loan_term_months,
            interest_rate: self.interest_rate,
        }
    }

    /// Validate application fields and the outcome label.
    ///
    /// # Errors
    /// Returns every violation as a vector of messages.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.application().validate() {
            Ok(()) => Vec::new(),
            Err(e) => e,
        };

        if self.high_risk > 1 {
            errors.push(format!("Label {} must be 0 or 1", self.high_risk));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_application() -> LoanApplication {
        LoanApplication {
            age: 30,
            employment_years: 2,
            annual_income: 600_000.0,
            credit_score: 700,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 12.0,
        }
    }

    #[test]
    fn test_valid_application() {
        assert!(sample_application().validate().is_ok());
    }

    #[test]
    fn test_out_of_domain_fields_are_all_reported() {
        let invalid = LoanApplication {
            age: 17,
            credit_score: 900,
            loan_term_months: 18,
            ..sample_application()
        };

        let errors = invalid.validate().expect_err("must be rejected");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("Age")));
        assert!(errors.iter().any(|e| e.contains("Credit score")));
        assert!(errors.iter().any(|e| e.contains("term")));
    }

    #[test]
    fn test_record_label_validation() {
        let record = LoanRecord {
            age: 30,
            employment_years: 2,
            annual_income: 600_000.0,
            credit_score: 700,
            existing_loans: 0,
            loan_amount: 300_000.0,
            loan_term_months: 36,
            interest_rate: 12.0,
            high_risk: 2,
        };

        let errors = record.validate().expect_err("label must be rejected");
        assert!(errors.iter().any(|e| e.contains("Label")));
    }

    #[test]
    fn test_non_finite_income_rejected() {
        let invalid = LoanApplication {
            annual_income: f64::NAN,
            ..sample_application()
        };
        assert!(invalid.validate().is_err());
    }
}
