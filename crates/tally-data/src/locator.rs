//! Header-row discovery for exports whose header sits below free-form
//! metadata rows.

use tally_core::models::{CellValue, RawTable};

/// Index of the first row containing `marker` in any rendered cell.
///
/// Scans top to bottom and stops at the first hit: data rows further down may
/// repeat the marker text, and only the topmost occurrence is the header.
pub fn locate_header(table: &RawTable, marker: &str) -> Option<usize> {
    table
        .iter()
        .position(|row| row_contains_marker(row, marker))
}

fn row_contains_marker(row: &[CellValue], marker: &str) -> bool {
    row.iter().any(|cell| cell.render().contains(marker))
}
