//! CSV ingestion
//!
//! Structural parsing only: row order and cell text are preserved
//! exactly as uploaded. Schema problems (wrong columns, non-numeric
//! features) are not this module's business; they surface later from
//! the model adapter or the accuracy path's column check.

use crate::error::{AppError, AppResult};

/// Parsed upload: header row plus the cell text of every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FeatureTable {
    /// Number of data rows (excluding the header)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Parse uploaded CSV bytes into a table.
///
/// The first record is the header row. Ragged records and byte streams
/// that are not valid delimited text fail with `MalformedInput`.
pub fn parse(bytes: &[u8]) -> AppResult<FeatureTable> {
    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::MalformedInput(format!("header row: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        // +2: 1-based, after the header row
        let record = record
            .map_err(|e| AppError::MalformedInput(format!("row {}: {}", rows.len() + 2, e)))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(FeatureTable { columns, rows })
}
