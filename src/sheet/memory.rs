// src/sheet/memory.rs

use std::collections::BTreeMap;

use super::{checked_coords, SheetGrid, WorkbookSink, WorkbookSource};
use crate::cell::CellValue;
use crate::error::SheetError;

/// In-process workbook: readable like a file, writable like the xlsx
/// writer (same limits, same rejected cell kinds). Writes go to sheet 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<SheetGrid>,
    widths: BTreeMap<usize, f64>,
}

impl MemoryWorkbook {
    /// Workbook without sheets.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(grid: SheetGrid) -> Self {
        Self { sheets: vec![grid], widths: BTreeMap::new() }
    }

    pub fn grid(&self, index: usize) -> Option<&SheetGrid> {
        self.sheets.get(index)
    }

    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.widths.get(&col).copied()
    }

    fn first_sheet(&mut self) -> &mut SheetGrid {
        if self.sheets.is_empty() {
            self.sheets.push(SheetGrid::new());
        }
        &mut self.sheets[0]
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet(&mut self, index: usize) -> Result<SheetGrid, SheetError> {
        self.sheets.get(index).cloned().ok_or(SheetError::NoSheet(index))
    }
}

impl WorkbookSink for MemoryWorkbook {
    fn write_cell(&mut self, row: usize, col: usize, value: &CellValue) -> Result<(), SheetError> {
        checked_coords(row, col)?;
        match value {
            CellValue::Error(_) => Err(SheetError::UnsupportedCellType(value.kind().name())),
            CellValue::Blank => Ok(()),
            _ => {
                self.first_sheet().set(row, col, value.clone());
                Ok(())
            }
        }
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), SheetError> {
        checked_coords(0, col)?;
        self.widths.insert(col, width);
        Ok(())
    }
}
