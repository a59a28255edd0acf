//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement the core
//! use cases: interactive assessment, history analytics, and the batch
//! training pipeline with its preprocessing and evaluation stages.

mod analytics;
mod assessment;
pub mod evaluation;
pub mod preprocess;
mod training;

pub use analytics::{AnalyticsService, RiskStatistics};
pub use assessment::AssessmentService;
pub use evaluation::{evaluate, ConfusionMatrix, EvaluationReport};
pub use preprocess::{DatasetSummary, PreprocessError, StandardScaler, TrainTestSplit};
pub use training::{TrainingConfig, TrainingPipeline, TrainingReport};
