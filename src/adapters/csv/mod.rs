//! CSV adapter: Implementation of DatasetSource.
//!
//! Reads historical loan data from a headered CSV file. Column names must
//! match the [`LoanRecord`] field names; the label column is `high_risk`
//! (1 = defaulted).

use std::path::{Path, PathBuf};

use crate::domain::LoanRecord;
use crate::ports::DatasetSource;

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record {record}: {message}")]
    Malformed { record: usize, message: String },

    #[error("Dataset is empty: {0}")]
    Empty(PathBuf),
}

/// CSV-backed loan dataset.
#[derive(Debug, Clone, Default)]
pub struct CsvDataset;

impl CsvDataset {
    /// Create a new CSV dataset source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DatasetSource for CsvDataset {
    type Error = DatasetError;

    fn load(&self, path: &Path) -> Result<Vec<LoanRecord>, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| match e.kind() {
            csv::ErrorKind::Io(_) => DatasetError::Io(std::io::Error::other(e.to_string())),
            _ => DatasetError::Malformed {
                record: 0,
                message: e.to_string(),
            },
        })?;

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<LoanRecord>().enumerate() {
            // Header is line 1; the first record is line 2.
            let record = row.map_err(|e| DatasetError::Malformed {
                record: index + 2,
                message: e.to_string(),
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(DatasetError::Empty(path.to_path_buf()));
        }

        tracing::info!("Loaded {} records from {:?}", records.len(), path);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "age,employment_years,annual_income,credit_score,existing_loans,loan_amount,loan_term_months,interest_rate,high_risk";

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}").expect("write header");
        for line in lines {
            writeln!(file, "{line}").expect("write row");
        }
        file.flush().expect("flush");
        file
    }

    #[test]
    fn test_load_records() {
        let file = write_csv(&[
            "30,2,600000,700,0,300000,36,12.0,0",
            "45,10,400000,520,3,500000,12,22.0,1",
        ]);

        let records = CsvDataset::new().load(file.path()).expect("must load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].credit_score, 700);
        assert_eq!(records[1].high_risk, 1);
        assert!((records[1].interest_rate - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file() {
        let err = CsvDataset::new()
            .load(Path::new("/nonexistent/loans.csv"))
            .expect_err("must fail");
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let file = write_csv(&[
            "30,2,600000,700,0,300000,36,12.0,0",
            "not,a,valid,row,at,all,x,y,z",
        ]);

        let err = CsvDataset::new().load(file.path()).expect_err("must fail");
        match err {
            DatasetError::Malformed { record, .. } => assert_eq!(record, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_dataset() {
        let file = write_csv(&[]);
        let err = CsvDataset::new().load(file.path()).expect_err("must fail");
        assert!(matches!(err, DatasetError::Empty(_)));
    }
}
