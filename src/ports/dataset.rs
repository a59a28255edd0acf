//! Dataset port: Trait for loading historical loan data.

use std::path::Path;

use crate::domain::LoanRecord;

/// Trait for tabular loan dataset sources.
///
/// A missing file is a fatal, reported condition for the run — loaders
/// return a typed error rather than panicking, and the caller exits with a
/// non-zero status.
pub trait DatasetSource: Send + Sync {
    /// Error type for load operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load all records from `path`.
    ///
    /// # Errors
    /// Returns error if the path does not exist or rows cannot be parsed.
    fn load(&self, path: &Path) -> Result<Vec<LoanRecord>, Self::Error>;
}
