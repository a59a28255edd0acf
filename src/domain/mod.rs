//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O. All types are
//! serializable and the core computations are deterministic per request.

mod affordability;
mod application;
mod guardrail;
mod rules;
mod verdict;

pub use affordability::{monthly_installment, Affordability};
pub use application::{LoanApplication, LoanRecord, LOAN_TERMS_MONTHS};
pub use guardrail::{
    apply_credit_score_floor, apply_thresholds, FeatureSchema, GuardrailError, OverrideOutcome,
    CREDIT_SCORE_FEATURE,
};
pub use rules::{evaluate_rules, ReasonCode, RuleThresholds};
pub use verdict::{Assessment, RiskLabel, RiskVerdict};
