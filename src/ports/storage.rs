//! Storage port: Trait for assessment history persistence.
//!
//! This trait abstracts the storage backend (SQLite) from the application
//! logic.

use crate::domain::Assessment;

/// A page of assessments with pagination metadata.
#[derive(Debug, Clone)]
pub struct AssessmentPage {
    /// Assessments in this page
    pub items: Vec<Assessment>,
    /// Total count of all assessments (for UI pagination)
    pub total_count: usize,
    /// Current page offset
    pub offset: usize,
    /// Page size limit
    pub limit: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl AssessmentPage {
    /// Create a new assessment page.
    #[must_use]
    pub fn new(items: Vec<Assessment>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// Get the next page offset.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        if self.has_more {
            Some(self.offset + self.limit)
        } else {
            None
        }
    }

    /// Get the previous page offset.
    #[must_use]
    pub fn prev_offset(&self) -> Option<usize> {
        if self.offset > 0 {
            Some(self.offset.saturating_sub(self.limit))
        } else {
            None
        }
    }
}

/// Trait for local assessment storage.
pub trait Storage: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save an assessment record.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn save_assessment(&self, assessment: &Assessment) -> Result<(), Self::Error>;

    /// Load all assessments.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_assessments(&self) -> Result<Vec<Assessment>, Self::Error>;

    /// Load recent assessments (up to `limit`, newest first).
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_recent_assessments(&self, limit: usize) -> Result<Vec<Assessment>, Self::Error>;

    /// Load assessments with pagination.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_assessments_paginated(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<AssessmentPage, Self::Error>;

    /// Get the total count of assessments.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_assessments(&self) -> Result<usize, Self::Error>;

    /// Delete an assessment by ID.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn delete_assessment(&self, id: &str) -> Result<(), Self::Error>;

    /// Clear all stored assessments.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;
}
