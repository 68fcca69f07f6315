// src/table/mod.rs
//! TableModel: a sparse, keyed 2-D table of text values.
//!
//! - Rows are keyed by an application id (scraped `data-id`, or
//!   [`HEADERS_KEY`] for the header row) and iterate in insertion order.
//! - Columns are keyed `"0"`, `"1"`, … and their order lives in one place,
//!   `column_keys`. Each row is a value vector aligned with it.
//! - A cell is `None` when it was never written (a column added later that
//!   did not cover that row), `Some("")` when it was written empty.
//!
//! Values are plain text; typing happens at the workbook boundary
//! (see `infer` and `pipeline`).

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::config::consts::{EXPECTED_COLUMNS, EXPECTED_ROWS, HEADERS_KEY};
use crate::error::TableError;

mod merge;
mod sort;

pub use sort::compare_cells;

pub type Row = Vec<Option<String>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableModel {
    rows: IndexMap<String, Row>,
    column_keys: Vec<String>,
}

impl Default for TableModel {
    fn default() -> Self {
        Self::new(EXPECTED_ROWS, EXPECTED_COLUMNS)
    }
}

impl TableModel {
    /// Empty table with `columns` generated keys. `rows` is only a capacity hint.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: IndexMap::with_capacity(rows),
            column_keys: (0..columns).map(|i| i.to_string()).collect(),
        }
    }

    pub(crate) fn from_parts(column_keys: Vec<String>, rows: IndexMap<String, Row>) -> Self {
        Self { rows, column_keys }
    }

    /* ---------------- Shape ---------------- */

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_keys(&self) -> &[String] {
        &self.column_keys
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn last_column_key(&self) -> Option<&str> {
        self.column_keys.last().map(String::as_str)
    }

    pub fn contains_row(&self, row_key: &str) -> bool {
        self.rows.contains_key(row_key)
    }

    /// Position of a column key in `column_keys`.
    pub fn column_index(&self, column_key: &str) -> Option<usize> {
        self.column_keys.iter().position(|k| k == column_key)
    }

    /* ---------------- Reads ---------------- */

    pub fn value(&self, row_key: &str, column_key: &str) -> Option<&str> {
        let col = self.column_index(column_key)?;
        self.value_at(row_key, col)
    }

    pub fn value_at(&self, row_key: &str, column: usize) -> Option<&str> {
        self.rows.get(row_key)?.get(column)?.as_deref()
    }

    pub fn row(&self, row_key: &str) -> Option<&[Option<String>]> {
        self.rows.get(row_key).map(Vec::as_slice)
    }

    /// Rows in iteration order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.rows.iter().map(|(k, r)| (k.as_str(), r.as_slice()))
    }

    /// Present cells of one column, in row order.
    pub fn column(&self, column_key: &str) -> Vec<(&str, &str)> {
        let Some(col) = self.column_index(column_key) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|(k, r)| r.get(col)?.as_deref().map(|v| (k.as_str(), v)))
            .collect()
    }

    pub fn header(&self) -> Option<&[Option<String>]> {
        self.row(HEADERS_KEY)
    }

    /// Number of cells actually written in a row.
    pub(crate) fn present_len(row: &[Option<String>]) -> usize {
        row.iter().filter(|c| c.is_some()).count()
    }

    /* ---------------- Mutation ---------------- */

    /// Write `values[i]` into column `i` for every current column. Extra
    /// trailing values are ignored. Re-adding a key overwrites those cells.
    pub fn add_row<S: AsRef<str>>(
        &mut self,
        row_key: impl Into<String>,
        values: &[S],
    ) -> Result<(), TableError> {
        let row_key = row_key.into();
        let width = self.column_keys.len();
        if values.len() < width {
            return Err(TableError::Arity {
                expected: width,
                actual: values.len(),
                row_key: Some(row_key),
            });
        }

        let row = self.rows.entry(row_key).or_insert_with(|| vec![None; width]);
        row.resize(width, None);
        for (cell, v) in row.iter_mut().zip(values) {
            *cell = Some(owned(v));
        }
        Ok(())
    }

    /// Append a generated column, assigning `values[i]` to the i-th row in
    /// row iteration order (insertion order).
    pub fn add_column<S: AsRef<str>>(&mut self, values: &[S]) -> Result<(), TableError> {
        let key = self.next_column_key();
        self.insert_column(key, values)
    }

    /// Append a generated column from an explicit row key → value mapping.
    /// Rows the mapping does not mention stay absent in the new column.
    pub fn add_column_keyed(&mut self, values: &HashMap<String, String>) -> Result<(), TableError> {
        let key = self.next_column_key();
        self.check_new_column(&key)?;
        if let Some(unknown) = values.keys().find(|k| !self.rows.contains_key(k.as_str())) {
            return Err(TableError::UnknownRow(unknown.clone()));
        }

        let width = self.column_keys.len();
        for (row_key, row) in self.rows.iter_mut() {
            row.resize(width, None);
            row.push(values.get(row_key).cloned());
        }
        self.column_keys.push(key);
        Ok(())
    }

    /// Append a column under a caller-chosen key.
    pub fn insert_column<S: AsRef<str>>(
        &mut self,
        column_key: impl Into<String>,
        values: &[S],
    ) -> Result<(), TableError> {
        let column_key = column_key.into();
        self.check_new_column(&column_key)?;
        if values.len() < self.rows.len() {
            return Err(TableError::Arity {
                expected: self.rows.len(),
                actual: values.len(),
                row_key: None,
            });
        }

        let width = self.column_keys.len();
        for (row, v) in self.rows.values_mut().zip(values) {
            row.resize(width, None);
            row.push(Some(owned(v)));
        }
        self.column_keys.push(column_key);
        Ok(())
    }

    fn next_column_key(&self) -> String {
        self.column_keys.len().to_string()
    }

    fn check_new_column(&self, column_key: &str) -> Result<(), TableError> {
        if self.column_keys.iter().any(|k| k == column_key) {
            return Err(TableError::DuplicateColumn(s!(column_key)));
        }
        Ok(())
    }
}

fn owned<S: AsRef<str>>(v: &S) -> String {
    let v: &str = v.as_ref();
    s!(v)
}

impl fmt::Display for TableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "====== meta info =======")?;
        writeln!(f, "Row count - {}", self.row_count())?;
        writeln!(f, "Column count - {}", self.column_count())?;

        writeln!(f, "====== row and column keys =======")?;
        writeln!(f, "{:?}", self.rows.keys().collect::<Vec<_>>())?;
        writeln!(f, "{:?}", self.column_keys)?;

        writeln!(f, "====== rows data =======")?;
        for (key, row) in &self.rows {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            writeln!(f, "{key}: {cells:?}")?;
        }
        Ok(())
    }
}
