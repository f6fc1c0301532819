//! Column-name normalisation and required-column checks.

use tally_core::error::ProcessError;
use tally_core::models::HeaderedTable;

/// Trim surrounding whitespace from every column name in place.
pub fn normalize_columns(table: &mut HeaderedTable) {
    for column in &mut table.columns {
        let trimmed = column.trim();
        if trimmed.len() != column.len() {
            *column = trimmed.to_string();
        }
    }
}

/// Check that every name in `required` is a column, in order.
///
/// Fails on the first absent column; later ones are not inspected.
pub fn validate_columns(columns: &[String], required: &[&str]) -> Result<(), ProcessError> {
    match required
        .iter()
        .find(|name| !columns.iter().any(|c| c == *name))
    {
        Some(missing) => Err(ProcessError::SchemaMissingColumn {
            column: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}
