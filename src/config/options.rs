// src/config/options.rs
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::Error;

/// Knobs for one conversion run. Every field has a default, so an options
/// file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub scrape: ScrapeOptions,
    /// Table column to order rows by (0 = id, 1 = name, ...)
    pub sort_column: usize,
    /// Leading columns taken from the fresh scrape on update
    pub key_columns: usize,
    /// Table columns before this index are always written as text
    pub numeric_from: usize,
    /// Sheet columns reserved for externally-sourced data
    pub legacy_columns: usize,
    pub widths: ColumnWidths,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scrape: ScrapeOptions::default(),
            sort_column: DEFAULT_SORT_COLUMN,
            key_columns: DEFAULT_KEY_COLUMNS,
            numeric_from: NUMERIC_FROM,
            legacy_columns: LEGACY_COLUMNS,
            widths: ColumnWidths::default(),
        }
    }
}

impl ConvertOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    pub row_selector: String,
    /// Supplier words dropped from product names
    pub marker_words: Vec<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            row_selector: s!(ROW_SELECTOR),
            marker_words: MARKER_WORDS.iter().map(|w| s!(*w)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidths {
    pub legacy: f64,
    pub identifier: f64,
    pub name: f64,
    pub code: f64,
    pub generated: f64,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            legacy: LEGACY_WIDTH,
            identifier: ID_WIDTH,
            name: NAME_WIDTH,
            code: CODE_WIDTH,
            generated: GENERATED_WIDTH,
        }
    }
}

impl ColumnWidths {
    /// Width for an absolute sheet column, given how many legacy columns
    /// precede the table.
    pub fn for_sheet_column(&self, col: usize, legacy_columns: usize) -> f64 {
        if col < legacy_columns {
            return self.legacy;
        }
        match col - legacy_columns {
            0 => self.identifier,
            1 => self.name,
            2 => self.code,
            _ => self.generated,
        }
    }
}
