// src/sheet/mod.rs
//! Spreadsheet boundary.
//!
//! The pipeline reads through [`WorkbookSource`] and writes through
//! [`WorkbookSink`]; it never sees a codec type. `xlsx` holds the real
//! codecs, `memory` an in-process workbook for tests and dry runs.

use crate::cell::CellValue;
use crate::error::SheetError;

mod memory;
mod xlsx;

pub use memory::MemoryWorkbook;
pub use xlsx::{XlsxReader, XlsxWriter};

/// Largest row and column index an .xlsx sheet accepts.
pub const MAX_ROW: usize = 1_048_575;
pub const MAX_COL: usize = 16_383;

static BLANK: CellValue = CellValue::Blank;

/// One sheet's cells, row-major, 0-based from A1. Rows may be ragged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Cell at `(row, col)`; anything outside the stored area is blank.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&BLANK)
    }

    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Blank);
        }
        cells[col] = value;
    }
}

pub trait WorkbookSource {
    fn sheet_count(&self) -> usize;

    /// Cells of the sheet at `index`; `NoSheet` when there is none.
    fn sheet(&mut self, index: usize) -> Result<SheetGrid, SheetError>;
}

/// Write side: a single output sheet.
pub trait WorkbookSink {
    fn write_cell(&mut self, row: usize, col: usize, value: &CellValue) -> Result<(), SheetError>;

    /// Width in character units.
    fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), SheetError>;
}

/// Sheet coordinates in the codec's integer types.
pub(crate) fn checked_coords(row: usize, col: usize) -> Result<(u32, u16), SheetError> {
    if row > MAX_ROW || col > MAX_COL {
        return Err(SheetError::OutOfBounds { row, col });
    }
    Ok((row as u32, col as u16))
}
