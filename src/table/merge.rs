// src/table/merge.rs
//
// Reconcile a persisted table with a fresh scrape.
//
// - Rows in both: the first `key_columns` cells come from the fresh table,
//   the rest stay as persisted.
// - Rows only in the fresh table: key cells copied, remaining columns "".
// - A new trailing column is appended: the fresh table's last-column value
//   for every row the fresh table still has, "" for rows it dropped.
//   Older trailing columns are never touched, so each merge leaves one more
//   dated column behind.

use std::collections::HashMap;

use super::TableModel;
use crate::error::TableError;

impl TableModel {
    /// Merge `incoming` into `self`. Not commutative: key columns follow
    /// `incoming`, everything else follows `self`.
    ///
    /// All checks run before the first write, so on error `self` is unchanged.
    pub fn merge(&mut self, incoming: &TableModel, key_columns: usize) -> Result<(), TableError> {
        self.check_merge(incoming, key_columns)?;

        let freshness = self.freshness_column(incoming);
        let width = self.column_count();

        for (row_key, values) in &incoming.rows {
            match self.rows.get_mut(row_key) {
                Some(row) => {
                    for (cell, fresh) in row.iter_mut().zip(values).take(key_columns) {
                        if let Some(v) = fresh {
                            *cell = Some(v.clone());
                        }
                    }
                }
                None => {
                    let mut row = vec![Some(s!()); width];
                    for (cell, fresh) in row.iter_mut().zip(values).take(key_columns) {
                        if let Some(v) = fresh {
                            *cell = Some(v.clone());
                        }
                    }
                    self.rows.insert(row_key.clone(), row);
                }
            }
        }

        logd!(
            "merge: {} row(s) after merging {} fresh row(s), {} column(s)",
            self.row_count(),
            incoming.row_count(),
            width + 1
        );
        self.add_column_keyed(&freshness)
    }

    fn check_merge(&self, incoming: &TableModel, key_columns: usize) -> Result<(), TableError> {
        if key_columns > self.column_count() {
            return Err(TableError::Arity {
                expected: key_columns,
                actual: self.column_count(),
                row_key: None,
            });
        }
        for (row_key, values) in &incoming.rows {
            if !self.rows.contains_key(row_key) {
                continue;
            }
            let actual = Self::present_len(values);
            if actual <= key_columns {
                return Err(TableError::MergeArity {
                    row_key: row_key.clone(),
                    key_columns,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Values for the new trailing column, keyed by row. Computed against
    /// `self` before any fresh rows are inserted.
    fn freshness_column(&self, incoming: &TableModel) -> HashMap<String, String> {
        let fresh_last = incoming.column_count().checked_sub(1);
        let fresh_value = |row_key: &str| -> String {
            fresh_last
                .and_then(|col| incoming.value_at(row_key, col))
                .map(|v| s!(v))
                .unwrap_or_default()
        };

        let mut out = HashMap::with_capacity(self.row_count() + incoming.row_count());
        for row_key in self.rows.keys() {
            let value = if incoming.contains_row(row_key) {
                fresh_value(row_key)
            } else {
                s!()
            };
            out.insert(row_key.clone(), value);
        }
        for row_key in incoming.rows.keys() {
            if !self.rows.contains_key(row_key) {
                out.insert(row_key.clone(), fresh_value(row_key));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::HEADERS_KEY;

    fn persisted() -> TableModel {
        let mut t = TableModel::new(4, 4);
        t.add_row(HEADERS_KEY, &["data-id", "name", "tone number", "01.10.2026 10:00:00"]).unwrap();
        t.add_row("A1", &["A1", "Old widget", "7", "5"]).unwrap();
        t.add_row("B2", &["B2", "Gadget", "3", "9"]).unwrap();
        t
    }

    fn fresh() -> TableModel {
        let mut t = TableModel::new(4, 4);
        t.add_row(HEADERS_KEY, &["data-id", "name", "tone number", "17.10.2026 12:00:00"]).unwrap();
        t.add_row("A1", &["A1", "Widget", "8", "2"]).unwrap();
        t.add_row("C3", &["C3", "Gizmo", "1", "4"]).unwrap();
        t
    }

    #[test]
    fn shared_rows_take_fresh_keys_and_keep_the_rest() {
        let mut t = persisted();
        t.merge(&fresh(), 3).unwrap();
        assert_eq!(t.value("A1", "1"), Some("Widget"));
        assert_eq!(t.value("A1", "2"), Some("8"));
        // old freshness column untouched, new one carries the fresh count
        assert_eq!(t.value("A1", "3"), Some("5"));
        assert_eq!(t.value("A1", "4"), Some("2"));
    }

    #[test]
    fn dropped_rows_get_empty_freshness() {
        let mut t = persisted();
        t.merge(&fresh(), 3).unwrap();
        assert_eq!(t.value("B2", "1"), Some("Gadget"));
        assert_eq!(t.value("B2", "3"), Some("9"));
        assert_eq!(t.value("B2", "4"), Some(""));
    }

    #[test]
    fn new_rows_are_appended_with_blank_history() {
        let mut t = persisted();
        t.merge(&fresh(), 3).unwrap();
        assert_eq!(t.row_keys().collect::<Vec<_>>(), vec![HEADERS_KEY, "A1", "B2", "C3"]);
        let row: Vec<Option<&str>> = t.row("C3").unwrap().iter().map(|c| c.as_deref()).collect();
        assert_eq!(row, vec![Some("C3"), Some("Gizmo"), Some("1"), Some(""), Some("4")]);
    }

    #[test]
    fn header_gets_new_timestamp_column() {
        let mut t = persisted();
        t.merge(&fresh(), 3).unwrap();
        assert_eq!(t.value(HEADERS_KEY, "3"), Some("01.10.2026 10:00:00"));
        assert_eq!(t.value(HEADERS_KEY, "4"), Some("17.10.2026 12:00:00"));
        assert_eq!(t.column_keys(), &["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn short_fresh_row_is_merge_arity_error_and_nothing_changes() {
        let mut t = persisted();
        let before = t.clone();
        let mut short = TableModel::new(2, 3);
        short.add_row("A1", &["A1", "Widget", "8"]).unwrap();
        let err = t.merge(&short, 3).unwrap_err();
        assert_eq!(
            err,
            TableError::MergeArity { row_key: s!("A1"), key_columns: 3, actual: 3 }
        );
        assert_eq!(t, before);
    }

    #[test]
    fn too_many_key_columns_is_arity_error() {
        let mut t = persisted();
        let err = t.merge(&fresh(), 9).unwrap_err();
        assert!(matches!(err, TableError::Arity { expected: 9, actual: 4, .. }));
    }

    #[test]
    fn merge_is_not_commutative() {
        let mut ab = persisted();
        ab.merge(&fresh(), 1).unwrap();
        let mut ba = fresh();
        ba.merge(&persisted(), 1).unwrap();
        assert_eq!(ab.value("A1", "1"), Some("Old widget"));
        assert_eq!(ba.value("A1", "1"), Some("Widget"));
    }
}
