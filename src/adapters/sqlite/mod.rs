//! SQLite adapter: Implementation of Storage.
//!
//! Provides local persistence for assessment history.
//!
//! # Mutex Behavior
//!
//! The database connection is protected by `Mutex`. A poisoned mutex (from a
//! panic in another thread) will cause a panic; failing fast protects the
//! integrity of the stored history.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::domain::{Affordability, Assessment, ReasonCode, RiskLabel, RiskVerdict};
use crate::ports::{AssessmentPage, Storage};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// SQLite storage adapter.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage with the given database path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS assessments (
                id TEXT PRIMARY KEY,
                risk_label TEXT NOT NULL,
                reasons TEXT NOT NULL,
                repayment_probability INTEGER NOT NULL,
                default_probability INTEGER NOT NULL,
                monthly_income REAL NOT NULL,
                monthly_installment REAL NOT NULL,
                debt_to_income REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_assessments_created
                ON assessments(created_at DESC);
            ",
        )?;

        Ok(())
    }

    fn row_to_assessment(row: &rusqlite::Row<'_>) -> Result<Assessment, rusqlite::Error> {
        let id: String = row.get(0)?;
        let label: String = row.get(1)?;
        let reasons_json: String = row.get(2)?;
        let repayment_probability: u8 = row.get(3)?;
        let default_probability: u8 = row.get(4)?;
        let monthly_income: f64 = row.get(5)?;
        let monthly_installment: f64 = row.get(6)?;
        let debt_to_income: f64 = row.get(7)?;
        let created_at: String = row.get(8)?;

        let label = match label.as_str() {
            "Low" => RiskLabel::Low,
            "High" => RiskLabel::High,
            other => {
                return Err(rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("Unknown risk label: {other}").into(),
                ))
            }
        };

        let reasons: Vec<ReasonCode> = serde_json::from_str(&reasons_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("Invalid reasons JSON: {e}").into(),
            )
        })?;

        let created_at = created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    format!("Invalid timestamp: {e}").into(),
                )
            })?;

        Ok(Assessment {
            id,
            verdict: RiskVerdict {
                label,
                reasons,
                repayment_probability,
                default_probability,
            },
            affordability: Affordability {
                monthly_income,
                monthly_installment,
                debt_to_income,
            },
            created_at,
        })
    }

    fn label_text(label: RiskLabel) -> &'static str {
        match label {
            RiskLabel::Low => "Low",
            RiskLabel::High => "High",
        }
    }
}

const SELECT_COLUMNS: &str = "id, risk_label, reasons, repayment_probability, \
     default_probability, monthly_income, monthly_installment, debt_to_income, created_at";

impl Storage for SqliteStorage {
    type Error = StorageError;

    fn save_assessment(&self, assessment: &Assessment) -> Result<(), StorageError> {
        let reasons_json = serde_json::to_string(&assessment.verdict.reasons)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().expect("Lock failed");
        conn.execute(
            "INSERT INTO assessments (id, risk_label, reasons, repayment_probability, \
             default_probability, monthly_income, monthly_installment, debt_to_income, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                assessment.id,
                Self::label_text(assessment.verdict.label),
                reasons_json,
                assessment.verdict.repayment_probability,
                assessment.verdict.default_probability,
                assessment.affordability.monthly_income,
                assessment.affordability.monthly_installment,
                assessment.affordability.debt_to_income,
                assessment.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn load_assessments(&self) -> Result<Vec<Assessment>, StorageError> {
        let conn = self.conn.lock().expect("Lock failed");
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments ORDER BY created_at DESC"
        ))?;

        let assessments = stmt
            .query_map([], Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assessments)
    }

    fn load_recent_assessments(&self, limit: usize) -> Result<Vec<Assessment>, StorageError> {
        let conn = self.conn.lock().expect("Lock failed");
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments ORDER BY created_at DESC LIMIT ?1"
        ))?;

        let assessments = stmt
            .query_map(params![limit as i64], Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assessments)
    }

    fn load_assessments_paginated(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<AssessmentPage, StorageError> {
        let total = self.count_assessments()?;

        let conn = self.conn.lock().expect("Lock failed");
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments ORDER BY created_at DESC \
             LIMIT ?1 OFFSET ?2"
        ))?;

        let items = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentPage::new(items, total, offset, limit))
    }

    fn count_assessments(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().expect("Lock failed");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete_assessment(&self, id: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");
        let affected = conn.execute("DELETE FROM assessments WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");
        conn.execute("DELETE FROM assessments", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_assessment(label: RiskLabel) -> Assessment {
        let reasons = match label {
            RiskLabel::Low => Vec::new(),
            RiskLabel::High => vec![ReasonCode::LowCreditScore, ReasonCode::HighInterestRate],
        };
        Assessment::new(
            RiskVerdict::from_reasons(reasons),
            Affordability {
                monthly_income: 50_000.0,
                monthly_installment: 9_680.0,
                debt_to_income: 0.19,
            },
        )
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        let assessment = sample_assessment(RiskLabel::High);

        storage.save_assessment(&assessment).expect("saves");

        let loaded = storage.load_assessments().expect("loads");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, assessment.id);
        assert_eq!(loaded[0].verdict.label, RiskLabel::High);
        assert_eq!(
            loaded[0].verdict.reasons,
            vec![ReasonCode::LowCreditScore, ReasonCode::HighInterestRate]
        );
        assert_eq!(loaded[0].verdict.default_probability, 100);
        assert!((loaded[0].affordability.debt_to_income - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_count_and_clear() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        for _ in 0..3 {
            storage
                .save_assessment(&sample_assessment(RiskLabel::Low))
                .expect("saves");
        }

        assert_eq!(storage.count_assessments().expect("counts"), 3);
        storage.clear_all().expect("clears");
        assert_eq!(storage.count_assessments().expect("counts"), 0);
    }

    #[test]
    fn test_recent_limit() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        for _ in 0..5 {
            storage
                .save_assessment(&sample_assessment(RiskLabel::Low))
                .expect("saves");
        }

        let recent = storage.load_recent_assessments(2).expect("loads");
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_pagination() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        for _ in 0..5 {
            storage
                .save_assessment(&sample_assessment(RiskLabel::High))
                .expect("saves");
        }

        let page = storage
            .load_assessments_paginated(0, 2)
            .expect("first page");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 5);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), Some(2));

        let last = storage.load_assessments_paginated(4, 2).expect("last page");
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.prev_offset(), Some(2));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        let err = storage
            .delete_assessment("no-such-id")
            .expect_err("must fail");
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
