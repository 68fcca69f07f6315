// src/specs/basket.rs
//! Basket listing page → `TableModel`.
//!
//! Page shape (per `<tr>` under the basket table):
//! - `data-id` on the row: the product id and row key
//! - `.c1`: product name; carries `rowspan` when several rows (tone variants)
//!   share one name, and is only present on the first row of such a group
//! - `.c2`: tone number
//! - `.c9 input[max]`: how many units can currently be ordered
//!
//! Output columns: `[data-id, name, tone number, <scrape timestamp>]`. The
//! header row is keyed by [`HEADERS_KEY`]; its last label is the time of
//! the scrape, which is what makes the last column a dated snapshot.

use crate::config::consts::{
    COLUMN_HEADERS, HEADERS_KEY, MAX_ATTR, MAX_COUNT_CELL, NAME_CELL, ROWSPAN_ATTR,
    ROW_ID_ATTR, TIMESTAMP_FORMAT, TONE_CELL,
};
use crate::config::options::ScrapeOptions;
use crate::core::sanitize::strip_markers;
use crate::error::ScrapeError;
use crate::markup::{MarkupDocument, MarkupElement};
use crate::table::TableModel;

/// Scrape stamped with the current local time.
pub fn scrape<D: MarkupDocument>(doc: &D, opts: &ScrapeOptions) -> Result<TableModel, ScrapeError> {
    scrape_at(doc, opts, &timestamp_now())
}

pub fn scrape_at<D: MarkupDocument>(
    doc: &D,
    opts: &ScrapeOptions,
    timestamp: &str,
) -> Result<TableModel, ScrapeError> {
    let rows = doc.select(&opts.row_selector);
    if rows.is_empty() {
        return Err(ScrapeError::Parse(format!(
            "no rows match selector '{}'",
            opts.row_selector
        )));
    }

    let headers = headers(timestamp);
    let mut table = TableModel::new(rows.len() + 1, headers.len());
    table.add_row(HEADERS_KEY, &headers)?;

    // rows left in the current rowspan group, and the name they share
    let mut remaining = 0usize;
    let mut name = s!();

    for (i, row) in rows.iter().enumerate() {
        if remaining == 0 {
            remaining = span_of(row, i)?;
            name = strip_markers(&row.text(NAME_CELL), &opts.marker_words);
        }
        remaining -= 1;

        let id = row.attr(ROW_ID_ATTR).ok_or_else(|| {
            ScrapeError::Parse(format!("row {i} has no '{ROW_ID_ATTR}' attribute"))
        })?;
        let tone = row.text(TONE_CELL);
        let max = row.input_attr(MAX_COUNT_CELL, MAX_ATTR).unwrap_or_default();

        table.add_row(id.clone(), &[id, name.clone(), tone, max])?;
    }

    logd!("basket: {} product row(s) scraped", table.row_count() - 1);
    Ok(table)
}

/// Header labels for a scrape taken at `timestamp`.
pub fn headers(timestamp: &str) -> Vec<String> {
    let mut out: Vec<String> = COLUMN_HEADERS.iter().map(|h| s!(*h)).collect();
    out.push(s!(timestamp));
    out
}

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Rows covered by the name cell starting at `row`. No `rowspan` (or a
/// name cell without one) is a single row; `0` is read as 1 as well.
fn span_of<E: MarkupElement>(row: &E, index: usize) -> Result<usize, ScrapeError> {
    match row.sub_attr(NAME_CELL, ROWSPAN_ATTR) {
        None => Ok(1),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(|n| n.max(1))
            .map_err(|_| ScrapeError::MalformedSpan { row: index, value: raw }),
    }
}
