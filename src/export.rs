//! CSV export of the OCR grid.
//!
//! One header row (`Image Name` plus the live region names), then one row
//! per image in catalog order. Data cells are quoted, embedded quotes are
//! doubled, and newlines collapse to single spaces. Cells that never ran or
//! failed export as an empty quoted string rather than an error marker.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::store::ProjectStore;

/// Default export filename.
pub const EXPORT_FILENAME: &str = "ocr_results.csv";

/// Doubles embedded quotes and collapses newlines to single spaces.
fn escape_cell(text: &str) -> String {
    text.replace('"', "\"\"")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Renders the full grid as CSV text.
///
/// Region names are read live: renaming a region changes the header of the
/// next export, never the stored result text.
pub fn render_csv(store: &ProjectStore) -> String {
    let mut csv = String::from("Image Name");
    for region in store.regions() {
        csv.push(',');
        csv.push_str(&region.name);
    }
    csv.push('\n');

    for (index, entry) in store.images().iter().enumerate() {
        let name = if entry.filename.is_empty() {
            format!("Image {}", index + 1)
        } else {
            entry.filename.clone()
        };
        let _ = write!(csv, "\"{}\"", escape_cell(&name));
        for cell in &entry.results {
            csv.push_str(",\"");
            if let Some(text) = cell.text() {
                csv.push_str(&escape_cell(text));
            }
            csv.push('"');
        }
        csv.push('\n');
    }
    csv
}

/// Renders the grid as a UTF-8 byte stream (MIME `text/csv`).
pub fn export_csv(store: &ProjectStore) -> Vec<u8> {
    render_csv(store).into_bytes()
}

/// Writes the CSV to `path`.
pub fn export_to_file(store: &ProjectStore, path: &Path) -> Result<()> {
    fs::write(path, export_csv(store))
        .with_context(|| format!("failed to write {}", path.display()))
}
