// src/config/consts.rs

// Scrape
pub const ROW_SELECTOR: &str = ".b2b-basket-prods-list table tr";
pub const NAME_CELL: &str = ".c1";
pub const TONE_CELL: &str = ".c2";
pub const MAX_COUNT_CELL: &str = ".c9";
pub const ROW_ID_ATTR: &str = "data-id";
pub const ROWSPAN_ATTR: &str = "rowspan";
pub const MAX_ATTR: &str = "max";
pub const MARKER_WORDS: &[&str] = &["PAESE", "Paese", "paese"];
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

// Table
/// Row key of the header row. Equal to column 0's label, so a header line
/// read back from a workbook lands under the same key.
pub const HEADERS_KEY: &str = "data-id";
pub const COLUMN_HEADERS: &[&str] = &["data-id", "name", "tone number"];
pub const EXPECTED_ROWS: usize = 600;
pub const EXPECTED_COLUMNS: usize = 4;

// Conversion
pub const DEFAULT_SORT_COLUMN: usize = 1; // name
pub const DEFAULT_KEY_COLUMNS: usize = 3; // id, name, tone
pub const LEGACY_COLUMNS: usize = 3;
/// First table column (not sheet column) eligible for numeric output.
pub const NUMERIC_FROM: usize = 3;

// Column widths, in characters
pub const LEGACY_WIDTH: f64 = 12.0;
pub const ID_WIDTH: f64 = 6.0;
pub const NAME_WIDTH: f64 = 48.0;
pub const CODE_WIDTH: f64 = 18.0;
pub const GENERATED_WIDTH: f64 = 6.0;

// Output
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "basket.xlsx";
