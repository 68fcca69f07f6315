// src/error.rs
//! Error taxonomy, one enum per layer plus the umbrella [`Error`] the
//! pipeline returns. Structural problems carry the counts and row key needed
//! to find the offending input.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("expected {expected} value(s), got {actual}{}", row_hint(.row_key))]
    Arity {
        expected: usize,
        actual: usize,
        row_key: Option<String>,
    },

    #[error("column key '{0}' already exists")]
    DuplicateColumn(String),

    #[error("row '{row_key}' has {actual} column(s); merging {key_columns} key column(s) needs at least one more")]
    MergeArity {
        row_key: String,
        key_columns: usize,
        actual: usize,
    },

    #[error("column index {index} out of range (table has {columns} column(s))")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("no row with key '{0}'")]
    UnknownRow(String),
}

fn row_hint(row_key: &Option<String>) -> String {
    match row_key {
        Some(k) => format!(" for row '{k}'"),
        None => s!(),
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("markup parse error: {0}")]
    Parse(String),

    #[error("row {row}: rowspan '{value}' is not a number")]
    MalformedSpan { row: usize, value: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("workbook not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("workbook is corrupt or not .xlsx: {0}")]
    CorruptFormat(String),

    #[error("workbook has no sheet at index {0}")]
    NoSheet(usize),

    #[error("workbook has no sheets")]
    EmptySheet,

    #[error("first row of the sheet is missing or has no table columns")]
    MissingHeader,

    #[error("cannot write {0} cell")]
    UnsupportedCellType(&'static str),

    #[error("cell ({row}, {col}) is outside the sheet limits")]
    OutOfBounds { row: usize, col: usize },

    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("invalid options: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("worker stopped before reporting a result")]
    WorkerLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_names_row() {
        let e = TableError::Arity { expected: 4, actual: 2, row_key: Some(s!("A1")) };
        assert_eq!(e.to_string(), "expected 4 value(s), got 2 for row 'A1'");
        let e = TableError::Arity { expected: 3, actual: 1, row_key: None };
        assert_eq!(e.to_string(), "expected 3 value(s), got 1");
    }
}
