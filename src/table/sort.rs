//! Row ordering for TableModel

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::TableModel;
use crate::config::consts::HEADERS_KEY;
use crate::error::TableError;

/// Absent sorts before present; present values compare as plain strings.
pub fn compare_cells(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl TableModel {
    /// New table with rows ordered by the column at `column_index`.
    ///
    /// The header row takes no part in the comparison and is placed first.
    /// The sort is stable, so equal values keep their relative order and
    /// sorting an already sorted table changes nothing. Cells are moved
    /// whole; only row order differs from `self`.
    pub fn sort(&self, column_index: usize) -> Result<TableModel, TableError> {
        if column_index >= self.column_count() {
            return Err(TableError::ColumnOutOfRange {
                index: column_index,
                columns: self.column_count(),
            });
        }

        let mut body: Vec<(&String, &super::Row)> = self
            .rows
            .iter()
            .filter(|(key, _)| key.as_str() != HEADERS_KEY)
            .collect();
        body.sort_by(|(_, a), (_, b)| {
            compare_cells(cell(a, column_index), cell(b, column_index))
        });

        let mut rows = IndexMap::with_capacity(self.row_count());
        if let Some(header) = self.rows.get(HEADERS_KEY) {
            rows.insert(s!(HEADERS_KEY), header.clone());
        }
        for (key, row) in body {
            rows.insert(key.clone(), row.clone());
        }

        Ok(TableModel::from_parts(self.column_keys.clone(), rows))
    }
}

fn cell(row: &[Option<String>], column: usize) -> Option<&str> {
    row.get(column)?.as_deref()
}
