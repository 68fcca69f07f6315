// tests/pipeline_e2e.rs
use std::path::{Path, PathBuf};

use xlsx_scrape::config::consts::HEADERS_KEY;
use xlsx_scrape::config::options::ConvertOptions;
use xlsx_scrape::pipeline::{self, LegacyBlock};
use xlsx_scrape::progress::RecordingProgress;
use xlsx_scrape::sheet::{SheetGrid, WorkbookSource, XlsxReader, XlsxWriter};
use xlsx_scrape::{CellValue, Error, SheetError, TableModel};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn read_back(path: &Path) -> (LegacyBlock, TableModel) {
    let mut reader = XlsxReader::open(path).unwrap();
    pipeline::load_workbook(&mut reader, &ConvertOptions::default()).unwrap()
}

fn keys(t: &TableModel) -> Vec<&str> {
    t.row_keys().collect()
}

#[test]
fn create_writes_sorted_typed_workbook() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("stock.xlsx");
    let mut rec = RecordingProgress::default();

    let summary = pipeline::create(&fixture("basket.html"), &out, &ConvertOptions::default(), Some(&mut rec))
        .unwrap();
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.columns, 4);
    assert_eq!(rec.lines.first().map(String::as_str), Some("begin 3"));
    assert_eq!(rec.lines.last().map(String::as_str), Some("finish"));

    let (legacy, table) = read_back(&out);
    assert!(legacy.is_empty());
    assert_eq!(keys(&table), vec![HEADERS_KEY, "3001", "2001", "2002", "1001", "1002", "1003"]);
    assert_eq!(table.value("1002", "1"), Some("Velvet Lipstick"));
    assert_eq!(table.value("1002", "2"), Some("02"));
    assert_eq!(table.value("1001", "3"), Some("12"));
    assert_eq!(table.value("3001", "3"), Some(""));

    // numbers land as numbers, leading columns as text
    let mut reader = XlsxReader::open(&out).unwrap();
    let grid = reader.sheet(0).unwrap();
    assert_eq!(grid.cell(4, 3), &CellValue::Text("1001".into()));
    assert_eq!(grid.cell(4, 5), &CellValue::Text("01".into()));
    assert_eq!(grid.cell(4, 6).as_real(), Some(12.0));
}

#[test]
fn update_merges_fresh_page_into_workbook_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let book = tmp.path().join("stock.xlsx");
    let opts = ConvertOptions::default();
    pipeline::create(&fixture("basket.html"), &book, &opts, None).unwrap();

    let summary = pipeline::update(&fixture("basket_next.html"), &book, &book, &opts, None).unwrap();
    assert_eq!(summary.new_rows, 1);
    assert_eq!(summary.dropped_rows, 3);
    assert_eq!(summary.columns, 5);

    let (_, table) = read_back(&book);
    assert_eq!(
        keys(&table),
        vec![HEADERS_KEY, "4001", "3001", "2001", "2002", "1001", "1002", "1003"]
    );
    // previous snapshot kept, new snapshot appended
    assert_eq!(table.value("1001", "3"), Some("12"));
    assert_eq!(table.value("1001", "4"), Some("9"));
    assert_eq!(table.value("3001", "4"), Some("4"));
    // no longer listed: empty in the new column only
    assert_eq!(table.value("1002", "3"), Some("0"));
    assert_eq!(table.value("1002", "4"), Some(""));
    // new product: blank history, fresh count
    assert_eq!(table.value("4001", "1"), Some("Brow Gel"));
    assert_eq!(table.value("4001", "3"), Some(""));
    assert_eq!(table.value("4001", "4"), Some("2.5"));
    assert!(!table.value(HEADERS_KEY, "4").unwrap_or("").is_empty());
}

#[test]
fn update_keeps_legacy_block_including_extra_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let book = tmp.path().join("with_legacy.xlsx");
    let opts = ConvertOptions::default();

    let fresh = pipeline::scrape_file(&fixture("basket.html"), &opts.scrape).unwrap();
    let mut grid = SheetGrid::new();
    grid.set(0, 0, CellValue::Text("supplier".into()));
    grid.set(1, 1, CellValue::Real(3.5));
    grid.set(2, 2, CellValue::Formula("SUM(B1:B2)".into()));
    grid.set(12, 0, CellValue::Text("note far below".into()));
    let mut writer = XlsxWriter::new();
    pipeline::persist(&fresh, &LegacyBlock::new(grid), &mut writer, &opts).unwrap();
    writer.save(&book).unwrap();

    let out = tmp.path().join("next").join("stock.xlsx");
    pipeline::update(&fixture("basket_next.html"), &book, &out, &opts, None).unwrap();

    let (legacy, table) = read_back(&out);
    assert_eq!(legacy.cell(0, 0), &CellValue::Text("supplier".into()));
    assert_eq!(legacy.cell(1, 1), &CellValue::Real(3.5));
    assert!(matches!(legacy.cell(2, 2), CellValue::Formula(f) if f.contains("SUM")));
    assert_eq!(legacy.cell(12, 0), &CellValue::Text("note far below".into()));
    // the far legacy row has no identifier and is not a table row
    assert_eq!(table.row_count(), 8);
}

#[test]
fn update_with_too_short_table_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let book = tmp.path().join("narrow.xlsx");
    let out = tmp.path().join("out.xlsx");

    // three persisted columns cannot take four key columns
    let mut narrow = TableModel::new(2, 3);
    narrow.add_row(HEADERS_KEY, &["data-id", "name", "tone number"]).unwrap();
    narrow.add_row("1001", &["1001", "Velvet Lipstick", "01"]).unwrap();
    let mut writer = XlsxWriter::new();
    pipeline::persist(&narrow, &LegacyBlock::default(), &mut writer, &ConvertOptions::default()).unwrap();
    writer.save(&book).unwrap();

    let opts = ConvertOptions { key_columns: 4, ..ConvertOptions::default() };
    let err = pipeline::update(&fixture("basket_next.html"), &book, &out, &opts, None).unwrap_err();
    assert!(matches!(err, Error::Table(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn corrupt_and_missing_workbooks() {
    let tmp = tempfile::tempdir().unwrap();
    let bogus = tmp.path().join("bogus.xlsx");
    std::fs::write(&bogus, b"this is not a zip archive").unwrap();
    assert!(matches!(XlsxReader::open(&bogus), Err(SheetError::CorruptFormat(_))));

    let err = pipeline::update(
        &fixture("basket_next.html"),
        &tmp.path().join("absent.xlsx"),
        &tmp.path().join("out.xlsx"),
        &ConvertOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Sheet(SheetError::FileNotFound(_))));
}
