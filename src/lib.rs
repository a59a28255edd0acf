//! # Lendguard
//!
//! Loan repayment risk assessment with two complementary paths:
//! - A deterministic rule engine that classifies a single application in
//!   real time (terminal UI).
//! - A batch training pipeline that fits a logistic classifier to historical
//!   data and forces its predictions through the credit-score business rule.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types and logic (applications, affordability,
//!   rules, verdicts, the credit-score guardrail)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (CSV loader, logistic regression,
//!   SQLite, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, LoanApplication, RiskLabel, RiskVerdict};

/// Result type for Lendguard operations
pub type Result<T> = std::result::Result<T, LendguardError>;

/// Main error type for Lendguard
#[derive(Debug, thiserror::Error)]
pub enum LendguardError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Dataset operation failed: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("Model operation failed: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] application::PreprocessError),

    #[error("Prediction guardrail failed: {0}")]
    Guardrail(#[from] domain::GuardrailError),

    #[error("Invalid application data: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
