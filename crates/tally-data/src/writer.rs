//! Output artifacts: the normalized per-file table and the summary table.
//!
//! `.csv` destinations are written as UTF-8 with a BOM (so spreadsheet
//! programs detect the encoding); any other destination gets a single-sheet
//! `.xlsx`. Both are rendered in memory first, so a refused write surfaces as
//! a plain [`std::io::Error`].

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tally_core::models::{AggregatedRecord, CellValue, NormalizedTable};
use tally_core::schema::SchemaConfig;
use thiserror::Error;

/// Number format applied to date cells in xlsx output.
const XLSX_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Name of the per-file artifact for `input`: `<stem><suffix>.xlsx`.
pub fn output_file_name(input: &Path, schema: &SchemaConfig) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{}.xlsx", schema.output_suffix)
}

/// Default location of the per-file artifact: next to the input.
pub fn default_output_path(input: &Path, schema: &SchemaConfig) -> PathBuf {
    let name = output_file_name(input, schema);
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Write a header row followed by `rows`.
pub fn write_table(path: &Path, header: &[String], rows: &[Vec<CellValue>]) -> Result<(), WriteError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let buffer = if is_csv {
        render_csv(header, rows)?
    } else {
        render_xlsx(header, rows)?
    };
    std::fs::write(path, buffer)?;
    Ok(())
}

/// Write every source column of `table` plus the signal column.
pub fn write_normalized_table(
    path: &Path,
    table: &NormalizedTable,
    schema: &SchemaConfig,
) -> Result<(), WriteError> {
    let (header, rows) = normalized_rows(table, schema);
    write_table(path, &header, &rows)
}

/// Write one row per person: the six identity columns plus the total.
pub fn write_summary_table(
    path: &Path,
    records: &[AggregatedRecord],
    schema: &SchemaConfig,
) -> Result<(), WriteError> {
    let (header, rows) = summary_rows(records, schema);
    write_table(path, &header, &rows)
}

/// Header and rows of the normalized artifact.
///
/// The signal column is appended, or overwritten when the source already
/// carries one (re-processing an earlier artifact).
pub fn normalized_rows(
    table: &NormalizedTable,
    schema: &SchemaConfig,
) -> (Vec<String>, Vec<Vec<CellValue>>) {
    let mut header = table.table.columns.clone();
    let signal_idx = match table.table.column_index(&schema.signal_column) {
        Some(idx) => idx,
        None => {
            header.push(schema.signal_column.clone());
            header.len() - 1
        }
    };

    let rows = table
        .table
        .rows
        .iter()
        .zip(table.signals())
        .map(|(row, signal)| {
            let mut row = row.clone();
            row.resize(header.len(), CellValue::Blank);
            row[signal_idx] = signal
                .value()
                .map(|v| CellValue::Number(f64::from(v)))
                .unwrap_or(CellValue::Blank);
            row
        })
        .collect();

    (header, rows)
}

/// Header and rows of the summary artifact.
pub fn summary_rows(
    records: &[AggregatedRecord],
    schema: &SchemaConfig,
) -> (Vec<String>, Vec<Vec<CellValue>>) {
    let mut header: Vec<String> = schema
        .identity_columns()
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.push(schema.total_column.clone());

    let rows = records
        .iter()
        .map(|r| {
            vec![
                text_cell(&r.key.name),
                text_cell(&r.key.identity_code),
                text_cell(&r.key.institution),
                text_cell(&r.key.department),
                text_cell(&r.key.major),
                text_cell(&r.key.class_name),
                CellValue::Number(f64::from(r.total_signal)),
            ]
        })
        .collect();

    (header, rows)
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Blank
    } else {
        CellValue::Text(s.to_string())
    }
}

fn render_xlsx(header: &[String], rows: &[Vec<CellValue>]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(XLSX_DATE_FORMAT);
    let sheet = workbook.add_worksheet();

    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, xlsx_col(col)?, name)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = u32::try_from(row_idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.iter().enumerate() {
            let col = xlsx_col(col)?;
            match cell {
                CellValue::Blank => {}
                CellValue::Number(n) => {
                    sheet.write_number(excel_row, col, *n)?;
                }
                CellValue::Date(dt) => {
                    sheet.write_datetime_with_format(excel_row, col, dt, &date_format)?;
                }
                CellValue::Text(text) => {
                    sheet.write_string(excel_row, col, text)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

fn xlsx_col(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn render_csv(header: &[String], rows: &[Vec<CellValue>]) -> Result<Vec<u8>, WriteError> {
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(CellValue::render))?;
    }
    writer
        .into_inner()
        .map_err(|e| WriteError::Io(std::io::Error::other(e.to_string())))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
