//! Risk verdict types.
//!
//! The verdict is a step function of the triggered rules: any triggered rule
//! makes the application High risk with a 100% default probability. The
//! probabilities are deliberately binary, not calibrated scores.

use serde::{Deserialize, Serialize};

use super::{Affordability, ReasonCode};

/// Risk classification for a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// No rule triggered; likely to repay
    Low,
    /// At least one rule triggered; likely to default
    High,
}

impl RiskLabel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Likely to Repay",
            Self::High => "Likely to Default",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Verdict for one assessment: label, triggered reasons, and the binary
/// repayment/default probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub label: RiskLabel,

    /// Triggered reason codes in rule order; empty iff the label is Low
    pub reasons: Vec<ReasonCode>,

    /// 100 when no rule triggered, 0 otherwise
    pub repayment_probability: u8,

    /// Complement of `repayment_probability`
    pub default_probability: u8,
}

impl RiskVerdict {
    /// Aggregate triggered reasons into a verdict.
    #[must_use]
    pub fn from_reasons(reasons: Vec<ReasonCode>) -> Self {
        if reasons.is_empty() {
            Self {
                label: RiskLabel::Low,
                reasons,
                repayment_probability: 100,
                default_probability: 0,
            }
        } else {
            Self {
                label: RiskLabel::High,
                reasons,
                repayment_probability: 0,
                default_probability: 100,
            }
        }
    }
}

/// Complete assessment record: verdict plus the derived affordability
/// figures that collaborators render alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: String,

    /// The rule-engine verdict
    pub verdict: RiskVerdict,

    /// Monthly income, installment, and debt-to-income for rendering
    pub affordability: Affordability,

    /// Timestamp of the assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Create a new assessment record.
    #[must_use]
    pub fn new(verdict: RiskVerdict, affordability: Affordability) -> Self {
        Self {
            id: uuid_v4(),
            verdict,
            affordability,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Generate a random UUID v4 string.
///
/// Uses ChaCha20 seeded from OS entropy so identifiers are unpredictable on
/// every platform.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reasons_is_low_risk() {
        let verdict = RiskVerdict::from_reasons(Vec::new());
        assert_eq!(verdict.label, RiskLabel::Low);
        assert!(verdict.reasons.is_empty());
        assert_eq!(verdict.repayment_probability, 100);
        assert_eq!(verdict.default_probability, 0);
    }

    #[test]
    fn test_any_reason_is_high_risk() {
        let verdict = RiskVerdict::from_reasons(vec![ReasonCode::LowCreditScore]);
        assert_eq!(verdict.label, RiskLabel::High);
        assert_eq!(verdict.reasons, vec![ReasonCode::LowCreditScore]);
        assert_eq!(verdict.repayment_probability, 0);
        assert_eq!(verdict.default_probability, 100);
    }

    #[test]
    fn test_reason_order_preserved() {
        let verdict = RiskVerdict::from_reasons(vec![
            ReasonCode::HighInterestRate,
            ReasonCode::ExcessiveDebtBurden,
        ]);
        assert_eq!(
            verdict.reasons,
            vec![ReasonCode::HighInterestRate, ReasonCode::ExcessiveDebtBurden]
        );
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID format with dashes
    }
}
