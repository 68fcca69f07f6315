// src/sheet/xlsx.rs
// .xlsx codecs: calamine for reading, rust_xlsxwriter for writing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, CellErrorType, Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};

use super::{checked_coords, SheetGrid, WorkbookSink, WorkbookSource};
use crate::cell::{CellValue, ErrorCode};
use crate::error::SheetError;

pub struct XlsxReader {
    workbook: Xlsx<BufReader<File>>,
    names: Vec<String>,
}

impl XlsxReader {
    pub fn open(path: &Path) -> Result<Self, SheetError> {
        if !path.is_file() {
            return Err(SheetError::FileNotFound(path.to_path_buf()));
        }
        let workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| SheetError::CorruptFormat(e.to_string()))?;
        let names = workbook.sheet_names().to_owned();
        logd!("xlsx: opened {} ({} sheet(s))", path.display(), names.len());
        Ok(Self { workbook, names })
    }
}

impl WorkbookSource for XlsxReader {
    fn sheet_count(&self) -> usize {
        self.names.len()
    }

    fn sheet(&mut self, index: usize) -> Result<SheetGrid, SheetError> {
        let name = self.names.get(index).cloned().ok_or(SheetError::NoSheet(index))?;
        let range = self
            .workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::CorruptFormat(format!("sheet '{name}': {e}")))?;

        let mut grid = SheetGrid::new();
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let (row_offset, col_offset) = (row_offset as usize, col_offset as usize);
        for (row, col, data) in range.cells() {
            let value = convert_value(data);
            if !value.is_blank() {
                grid.set(row_offset + row, col_offset + col, value);
            }
        }

        // Formulas shadow their cached values. Some files carry none.
        if let Ok(formulas) = self.workbook.worksheet_formula(&name) {
            let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
            let (row_offset, col_offset) = (row_offset as usize, col_offset as usize);
            for (row, col, formula) in formulas.cells() {
                let formula = formula.trim();
                if !formula.is_empty() {
                    grid.set(row_offset + row, col_offset + col, CellValue::Formula(s!(formula)));
                }
            }
        }
        Ok(grid)
    }
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Blank,
        Data::Bool(v) => CellValue::Boolean(*v),
        Data::Int(v) => CellValue::Integer(*v),
        Data::Float(v) => CellValue::Real(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        Data::Error(e) => CellValue::Error(convert_error(e)),
        Data::DateTime(v) => CellValue::Real(v.as_f64()),
        Data::DateTimeIso(v) => CellValue::Text(v.clone()),
        Data::DurationIso(v) => CellValue::Text(v.clone()),
    }
}

fn convert_error(err: &CellErrorType) -> ErrorCode {
    match err {
        CellErrorType::Div0 => ErrorCode::Div0,
        CellErrorType::NA => ErrorCode::NA,
        CellErrorType::Name => ErrorCode::Name,
        CellErrorType::Null => ErrorCode::Null,
        CellErrorType::Num => ErrorCode::Num,
        CellErrorType::Ref => ErrorCode::Ref,
        CellErrorType::Value => ErrorCode::Value,
        CellErrorType::GettingData => ErrorCode::GettingData,
    }
}

/// Single-sheet .xlsx writer. Consumed by [`XlsxWriter::save`], so the
/// workbook is released whether or not the save succeeds.
pub struct XlsxWriter {
    workbook: Workbook,
    sheet: Worksheet,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self { workbook: Workbook::new(), sheet: Worksheet::new() }
    }

    pub fn save(self, path: &Path) -> Result<(), SheetError> {
        let XlsxWriter { mut workbook, sheet } = self;
        workbook.push_worksheet(sheet);
        workbook.save(path)?;
        logd!("xlsx: saved {}", path.display());
        Ok(())
    }
}

impl WorkbookSink for XlsxWriter {
    fn write_cell(&mut self, row: usize, col: usize, value: &CellValue) -> Result<(), SheetError> {
        let (r, c) = checked_coords(row, col)?;
        match value {
            CellValue::Text(s) => {
                self.sheet.write_string(r, c, s)?;
            }
            CellValue::Integer(v) => {
                // xlsx numbers are doubles
                self.sheet.write_number(r, c, *v as f64)?;
            }
            CellValue::Real(v) => {
                self.sheet.write_number(r, c, *v)?;
            }
            CellValue::Boolean(v) => {
                self.sheet.write_boolean(r, c, *v)?;
            }
            CellValue::Formula(f) => {
                self.sheet.write_formula(r, c, f.as_str())?;
            }
            CellValue::Blank => {}
            CellValue::Error(_) => {
                return Err(SheetError::UnsupportedCellType(value.kind().name()));
            }
        }
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), SheetError> {
        let (_, c) = checked_coords(0, col)?;
        self.sheet.set_column_width(c, width)?;
        Ok(())
    }
}
