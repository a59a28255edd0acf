//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `csv`: CSV-backed historical loan dataset
//! - `logistic`: gradient-descent logistic regression classifier
//! - `sqlite`: SQLite for local assessment history
//! - `sanitize`: PII filtering for logs

pub mod csv;
pub mod logistic;
pub mod sanitize;
pub mod sqlite;

// Re-export boundary errors for lib.rs
pub use csv::DatasetError;
pub use sqlite::StorageError;
