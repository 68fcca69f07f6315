// src/pipeline.rs
//! Conversion pipeline: HTML → `TableModel` → workbook, and back.
//!
//! Sheet layout, left to right:
//! - `legacy_columns` columns of externally-maintained data. They are read
//!   and written back untouched and row-aligned by sheet row, not by
//!   product, so they never move when the table is re-sorted.
//! - the table: one sheet column per table column, one sheet row per table
//!   row in row order (header first).
//!
//! Workflows:
//! - `create`: scrape → sort → write a fresh workbook.
//! - `update`: read workbook → scrape → merge → sort → write.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cell::CellValue;
use crate::config::options::{ConvertOptions, ScrapeOptions};
use crate::core::charset::decode_page;
use crate::core::html::Document;
use crate::error::{Error, ScrapeError, SheetError};
use crate::file::ensure_parent;
use crate::infer::infer_cell;
use crate::progress::Progress;
use crate::sheet::{SheetGrid, WorkbookSink, WorkbookSource, XlsxReader, XlsxWriter};
use crate::specs::basket;
use crate::table::TableModel;

/// The externally-sourced leading columns of a workbook.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegacyBlock {
    grid: SheetGrid,
}

impl LegacyBlock {
    pub fn new(grid: SheetGrid) -> Self {
        Self { grid }
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.row_count() == 0
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.grid.cell(row, col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Scrape,
    Merge,
    Sort,
    Write,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Scrape => "scrape",
            Stage::Merge => "merge",
            Stage::Sort => "sort",
            Stage::Write => "write",
        }
    }
}

/// Summary of what was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub out_path: PathBuf,
    /// Product rows written (header excluded)
    pub rows: usize,
    pub columns: usize,
    /// Rows only the fresh scrape had (update only)
    pub new_rows: usize,
    /// Persisted rows the fresh scrape no longer lists (update only)
    pub dropped_rows: usize,
}

/* ---------------- Scrape ---------------- */

pub fn scrape(markup: &str, opts: &ScrapeOptions) -> Result<TableModel, ScrapeError> {
    let doc = Document::parse(markup);
    basket::scrape(&doc, opts)
}

/// Scrape a saved page in its declared charset (UTF-8 when none is
/// declared). Undecodable bytes are replaced, not fatal.
pub fn scrape_file(path: &Path, opts: &ScrapeOptions) -> Result<TableModel, ScrapeError> {
    let bytes = fs::read(path)?;
    let (text, encoding) = decode_page(&bytes);
    logd!("scrape: {} ({} bytes, {})", path.display(), bytes.len(), encoding.name());
    scrape(&text, opts)
}

/* ---------------- Persist ---------------- */

/// Write the legacy block and the table through `sink`, typing each table
/// cell with [`infer_cell`]. Absent cells are left blank. Column widths are
/// set for every column used.
pub fn persist<W: WorkbookSink + ?Sized>(
    table: &TableModel,
    legacy: &LegacyBlock,
    sink: &mut W,
    opts: &ConvertOptions,
) -> Result<(), SheetError> {
    let offset = opts.legacy_columns;

    for row in 0..legacy.row_count() {
        for col in 0..offset {
            let value = legacy.cell(row, col);
            if !value.is_blank() {
                sink.write_cell(row, col, value)?;
            }
        }
    }

    let width = table.column_count();
    for (row, (_, cells)) in table.rows().enumerate() {
        for (col, cell) in cells.iter().enumerate().take(width) {
            if let Some(text) = cell {
                let value = infer_cell(text, col, opts.numeric_from);
                sink.write_cell(row, offset + col, &value)?;
            }
        }
    }

    for col in 0..offset + width {
        sink.set_column_width(col, opts.widths.for_sheet_column(col, offset))?;
    }
    Ok(())
}

/* ---------------- Load ---------------- */

/// The persisted table: sheet 0 minus the legacy columns. Row 0 is the
/// header and fixes the column count; rows with a blank identifier are
/// skipped.
pub fn load<R: WorkbookSource + ?Sized>(source: &mut R, opts: &ConvertOptions) -> Result<TableModel, Error> {
    let grid = first_sheet(source)?;
    table_from_grid(&grid, opts)
}

/// The legacy columns of sheet 0. Error cells are carried as their literal
/// text, since no writer can emit them.
pub fn load_legacy<R: WorkbookSource + ?Sized>(
    source: &mut R,
    opts: &ConvertOptions,
) -> Result<LegacyBlock, Error> {
    let grid = first_sheet(source)?;
    Ok(legacy_from_grid(&grid, opts))
}

/// Legacy block and table from a single read of sheet 0.
pub fn load_workbook<R: WorkbookSource + ?Sized>(
    source: &mut R,
    opts: &ConvertOptions,
) -> Result<(LegacyBlock, TableModel), Error> {
    let grid = first_sheet(source)?;
    Ok((legacy_from_grid(&grid, opts), table_from_grid(&grid, opts)?))
}

fn first_sheet<R: WorkbookSource + ?Sized>(source: &mut R) -> Result<SheetGrid, SheetError> {
    if source.sheet_count() == 0 {
        return Err(SheetError::EmptySheet);
    }
    source.sheet(0)
}

fn table_from_grid(grid: &SheetGrid, opts: &ConvertOptions) -> Result<TableModel, Error> {
    let offset = opts.legacy_columns;
    let header = grid.row(0).ok_or(SheetError::MissingHeader)?;
    if header.len() <= offset {
        return Err(SheetError::MissingHeader.into());
    }
    let width = header.len() - offset;

    let mut table = TableModel::new(grid.row_count(), width);
    let mut skipped = 0usize;
    for row in 0..grid.row_count() {
        let id = grid.cell(row, offset).to_table_text();
        if id.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let values: Vec<String> =
            (0..width).map(|col| grid.cell(row, offset + col).to_table_text()).collect();
        table.add_row(id, &values)?;
    }

    logd!("load: {} row(s), {} column(s), {} blank-id row(s) skipped", table.row_count(), width, skipped);
    Ok(table)
}

fn legacy_from_grid(grid: &SheetGrid, opts: &ConvertOptions) -> LegacyBlock {
    let mut out = SheetGrid::new();
    for row in 0..grid.row_count() {
        for col in 0..opts.legacy_columns {
            let value = match grid.cell(row, col) {
                CellValue::Blank => continue,
                CellValue::Error(e) => CellValue::Text(s!(e.literal())),
                other => other.clone(),
            };
            out.set(row, col, value);
        }
    }
    LegacyBlock::new(out)
}

/* ---------------- Table steps ---------------- */

/// Reconcile `persisted` with `fresh` and order the result. Returns the
/// merged table plus (new, dropped) row counts.
pub fn update_table(
    mut persisted: TableModel,
    fresh: &TableModel,
    opts: &ConvertOptions,
) -> Result<(TableModel, usize, usize), Error> {
    let new_rows = fresh.row_keys().filter(|k| !persisted.contains_row(k)).count();
    let dropped_rows = persisted.row_keys().filter(|k| !fresh.contains_row(k)).count();

    persisted.merge(fresh, opts.key_columns)?;
    let sorted = persisted.sort(opts.sort_column)?;
    Ok((sorted, new_rows, dropped_rows))
}

/* ---------------- Workflows ---------------- */

/// Scrape `html`, sort, and write a new workbook at `out`.
pub fn create(
    html: &Path,
    out: &Path,
    opts: &ConvertOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, Error> {
    if let Some(p) = progress.as_deref_mut() {
        p.begin(3);
    }
    let result = run_create(html, out, opts, &mut progress);
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    result
}

fn run_create(
    html: &Path,
    out: &Path,
    opts: &ConvertOptions,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<RunSummary, Error> {
    step(progress, Stage::Scrape, &format!("Scraping {}", html.display()));
    let fresh = scrape_file(html, &opts.scrape)?;
    done(progress, Stage::Scrape);

    step(progress, Stage::Sort, "Sorting");
    let sorted = fresh.sort(opts.sort_column)?;
    done(progress, Stage::Sort);

    write_workbook(&sorted, &LegacyBlock::default(), out, opts, progress)?;
    logf!("create: {} row(s) written to {}", sorted.row_count(), out.display());

    Ok(RunSummary {
        out_path: out.to_path_buf(),
        rows: sorted.row_count().saturating_sub(1),
        columns: sorted.column_count(),
        new_rows: 0,
        dropped_rows: 0,
    })
}

/// Merge a fresh scrape of `html` into the workbook at `workbook` and write
/// the result to `out` (which may be the same file).
pub fn update(
    html: &Path,
    workbook: &Path,
    out: &Path,
    opts: &ConvertOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, Error> {
    if let Some(p) = progress.as_deref_mut() {
        p.begin(5);
    }
    let result = run_update(html, workbook, out, opts, &mut progress);
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    result
}

fn run_update(
    html: &Path,
    workbook: &Path,
    out: &Path,
    opts: &ConvertOptions,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<RunSummary, Error> {
    step(progress, Stage::Load, &format!("Reading {}", workbook.display()));
    // reader dropped here, before `out` may overwrite the same file
    let (legacy, persisted) = {
        let mut reader = XlsxReader::open(workbook)?;
        load_workbook(&mut reader, opts)?
    };
    done(progress, Stage::Load);

    step(progress, Stage::Scrape, &format!("Scraping {}", html.display()));
    let fresh = scrape_file(html, &opts.scrape)?;
    done(progress, Stage::Scrape);

    step(progress, Stage::Merge, "Merging");
    let (merged, new_rows, dropped_rows) = update_table(persisted, &fresh, opts)?;
    done(progress, Stage::Merge);
    done(progress, Stage::Sort);

    write_workbook(&merged, &legacy, out, opts, progress)?;
    logf!(
        "update: {} row(s), {} new, {} no longer listed, written to {}",
        merged.row_count(),
        new_rows,
        dropped_rows,
        out.display()
    );

    Ok(RunSummary {
        out_path: out.to_path_buf(),
        rows: merged.row_count().saturating_sub(1),
        columns: merged.column_count(),
        new_rows,
        dropped_rows,
    })
}

fn write_workbook(
    table: &TableModel,
    legacy: &LegacyBlock,
    out: &Path,
    opts: &ConvertOptions,
    progress: &mut Option<&mut dyn Progress>,
) -> Result<(), Error> {
    step(progress, Stage::Write, &format!("Writing {}", out.display()));
    ensure_parent(out)?;
    let mut writer = XlsxWriter::new();
    persist(table, legacy, &mut writer, opts)?;
    writer.save(out)?;
    done(progress, Stage::Write);
    Ok(())
}

fn step(progress: &mut Option<&mut dyn Progress>, stage: Stage, msg: &str) {
    logd!("{}: {}", stage.name(), msg);
    if let Some(p) = progress.as_deref_mut() {
        p.log(msg);
    }
}

fn done(progress: &mut Option<&mut dyn Progress>, stage: Stage) {
    if let Some(p) = progress.as_deref_mut() {
        p.item_done(stage.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ErrorCode;
    use crate::config::consts::HEADERS_KEY;
    use crate::progress::RecordingProgress;
    use crate::sheet::MemoryWorkbook;

    fn opts() -> ConvertOptions {
        ConvertOptions::default()
    }

    fn fresh() -> TableModel {
        let mut t = TableModel::new(4, 4);
        t.add_row(HEADERS_KEY, &["data-id", "name", "tone number", "17.10.2026 12:00:00"]).unwrap();
        t.add_row("A1", &["A1", "Widget", "7", "5"]).unwrap();
        t.add_row("A2", &["A2", "Widget", "8", "2.5"]).unwrap();
        t.add_row("B1", &["B1", "Gadget", "3", ""]).unwrap();
        t
    }

    #[test]
    fn persist_types_cells_and_offsets_legacy() {
        let mut wb = MemoryWorkbook::new();
        persist(&fresh(), &LegacyBlock::default(), &mut wb, &opts()).unwrap();
        let g = wb.grid(0).unwrap();
        assert_eq!(g.cell(0, 3), &CellValue::Text(s!("data-id")));
        assert_eq!(g.cell(0, 6), &CellValue::Text(s!("17.10.2026 12:00:00")));
        // identifier and tone stay text even when numeric-looking
        assert_eq!(g.cell(1, 5), &CellValue::Text(s!("7")));
        assert_eq!(g.cell(1, 6), &CellValue::Integer(5));
        assert_eq!(g.cell(2, 6), &CellValue::Real(2.5));
        assert_eq!(g.cell(3, 6), &CellValue::Text(s!()));
        assert_eq!(g.cell(1, 0), &CellValue::Blank);
    }

    #[test]
    fn persist_sets_widths_for_every_used_column() {
        let mut wb = MemoryWorkbook::new();
        persist(&fresh(), &LegacyBlock::default(), &mut wb, &opts()).unwrap();
        let widths: Vec<Option<f64>> = (0..8).map(|c| wb.column_width(c)).collect();
        assert_eq!(
            widths,
            vec![Some(12.0), Some(12.0), Some(12.0), Some(6.0), Some(48.0), Some(18.0), Some(6.0), None]
        );
    }

    #[test]
    fn persist_then_load_round_trips_text() {
        let mut wb = MemoryWorkbook::new();
        let table = fresh();
        persist(&table, &LegacyBlock::default(), &mut wb, &opts()).unwrap();
        let back = load(&mut wb, &opts()).unwrap();
        assert_eq!(back.row_keys().collect::<Vec<_>>(), table.row_keys().collect::<Vec<_>>());
        assert_eq!(back, table);
    }

    #[test]
    fn legacy_block_passes_through_including_extra_rows() {
        let mut grid = SheetGrid::new();
        grid.set(0, 0, CellValue::Text(s!("ext")));
        grid.set(1, 1, CellValue::Formula(s!("SUM(B1:B2)")));
        grid.set(2, 2, CellValue::Error(ErrorCode::NA));
        grid.set(9, 0, CellValue::Real(1.5));
        let mut source = MemoryWorkbook::with_sheet(grid);
        // no table columns at all: legacy still loads
        let legacy = load_legacy(&mut source, &opts()).unwrap();
        assert_eq!(legacy.row_count(), 10);
        assert_eq!(legacy.cell(2, 2), &CellValue::Text(s!("#N/A")));

        let mut wb = MemoryWorkbook::new();
        persist(&fresh(), &legacy, &mut wb, &opts()).unwrap();
        let g = wb.grid(0).unwrap();
        assert_eq!(g.cell(0, 0), &CellValue::Text(s!("ext")));
        assert_eq!(g.cell(1, 1), &CellValue::Formula(s!("SUM(B1:B2)")));
        assert_eq!(g.cell(9, 0), &CellValue::Real(1.5));
    }

    #[test]
    fn load_skips_blank_ids_and_reads_numbers_as_text() {
        let mut grid = SheetGrid::new();
        for (c, h) in ["data-id", "name", "tone number", "01.10.2026 10:00:00"].iter().enumerate() {
            grid.set(0, 3 + c, CellValue::Text(s!(*h)));
        }
        grid.set(1, 3, CellValue::Text(s!("A1")));
        grid.set(1, 4, CellValue::Text(s!("Widget")));
        grid.set(1, 6, CellValue::Real(5.0));
        grid.set(2, 4, CellValue::Text(s!("orphan")));
        grid.set(3, 3, CellValue::Text(s!("  ")));
        let table = load(&mut MemoryWorkbook::with_sheet(grid), &opts()).unwrap();
        assert_eq!(table.row_keys().collect::<Vec<_>>(), vec![HEADERS_KEY, "A1"]);
        assert_eq!(table.value("A1", "3"), Some("5"));
        assert_eq!(table.value("A1", "2"), Some(""));
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn load_structural_errors() {
        let err = load(&mut MemoryWorkbook::new(), &opts()).unwrap_err();
        assert!(matches!(err, Error::Sheet(SheetError::EmptySheet)));

        let err = load(&mut MemoryWorkbook::with_sheet(SheetGrid::new()), &opts()).unwrap_err();
        assert!(matches!(err, Error::Sheet(SheetError::MissingHeader)));

        let mut legacy_only = SheetGrid::new();
        legacy_only.set(0, 2, CellValue::Text(s!("x")));
        let err = load(&mut MemoryWorkbook::with_sheet(legacy_only), &opts()).unwrap_err();
        assert!(matches!(err, Error::Sheet(SheetError::MissingHeader)));
    }

    #[test]
    fn update_table_counts_new_and_dropped_rows() {
        let mut persisted = TableModel::new(4, 4);
        persisted.add_row(HEADERS_KEY, &["data-id", "name", "tone number", "01.10.2026 10:00:00"]).unwrap();
        persisted.add_row("A1", &["A1", "Widget", "7", "9"]).unwrap();
        persisted.add_row("Z9", &["Z9", "Zeta", "1", "4"]).unwrap();

        let (merged, new_rows, dropped) = update_table(persisted, &fresh(), &opts()).unwrap();
        assert_eq!((new_rows, dropped), (2, 1));
        assert_eq!(merged.column_count(), 5);
        assert_eq!(
            merged.row_keys().collect::<Vec<_>>(),
            vec![HEADERS_KEY, "B1", "A1", "A2", "Z9"]
        );
        assert_eq!(merged.value("Z9", "4"), Some(""));
        assert_eq!(merged.value("A1", "4"), Some("5"));
    }

    #[test]
    fn progress_brackets_failed_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let page = tmp.path().join("missing.html");
        let out = tmp.path().join("out.xlsx");

        let mut rec = RecordingProgress::default();
        assert!(create(&page, &out, &opts(), Some(&mut rec)).is_err());
        assert_eq!(rec.lines.first().map(String::as_str), Some("begin 3"));
        assert!(rec.lines[1].starts_with("Scraping"));
        assert_eq!(rec.lines.last().map(String::as_str), Some("finish"));

        let mut rec = RecordingProgress::default();
        assert!(update(&page, &out, &out, &opts(), Some(&mut rec)).is_err());
        assert_eq!(rec.lines.first().map(String::as_str), Some("begin 5"));
        assert!(rec.lines[1].starts_with("Reading"));
        assert_eq!(rec.lines.last().map(String::as_str), Some("finish"));
    }

    #[test]
    fn scrape_reads_markup() {
        let html = r#"<div class="b2b-basket-prods-list"><table>
            <tr data-id="A1"><td class="c1">Ink</td><td class="c2">2</td></tr></table></div>"#;
        let t = scrape(html, &ScrapeOptions::default()).unwrap();
        assert_eq!(t.value("A1", "1"), Some("Ink"));
        assert_eq!(t.row_count(), 2);
    }
}
