//! Input discovery and headerless table loading.
//!
//! Spreadsheets are read with `calamine` (first worksheet only), delimited
//! text with the `csv` crate. Both produce a [`RawTable`] with no header
//! applied; the header row is found later by content.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use encoding_rs::GBK;
use tally_core::error::ProcessError;
use tally_core::models::{CellValue, HeaderedTable, RawTable};
use tracing::{debug, warn};

// ── InputFormat ───────────────────────────────────────────────────────────────

/// Physical layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Delimited,
}

impl InputFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Some(InputFormat::Spreadsheet),
            "csv" => Some(InputFormat::Delimited),
            _ => None,
        }
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Editor lock files (`~$report.xlsx`) and hidden files are never inputs.
pub fn is_transient_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with("~$") || name.starts_with('.'))
        .unwrap_or(false)
}

/// Find all supported input files recursively under `folder`, sorted by path.
///
/// Transient and hidden files are excluded.
pub fn find_input_files(folder: &Path) -> Vec<PathBuf> {
    if !folder.exists() {
        warn!("Input folder does not exist: {}", folder.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && InputFormat::from_path(entry.path()).is_some()
                && !is_transient_file(entry.path())
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse `bytes` into a headerless table.
pub fn load_raw_table(bytes: &[u8], format: InputFormat) -> Result<RawTable, ProcessError> {
    match format {
        InputFormat::Spreadsheet => load_spreadsheet(bytes),
        InputFormat::Delimited => load_delimited(bytes),
    }
}

/// Re-read `raw` with row `offset` as the header.
///
/// Rows above the header are dropped, as are data rows whose cells are all
/// blank. Blank header cells are named `Unnamed: {index}` so they can never
/// satisfy a required column. Data rows are padded or widened to a common
/// width.
pub fn apply_header(raw: &RawTable, offset: usize) -> HeaderedTable {
    let Some(header) = raw.get(offset) else {
        return HeaderedTable::default();
    };

    let data: Vec<&Vec<CellValue>> = raw[offset + 1..]
        .iter()
        .filter(|row| !row.iter().all(CellValue::is_blank))
        .collect();

    let width = data
        .iter()
        .map(|row| row.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let columns: Vec<String> = (0..width)
        .map(|i| match header.get(i) {
            Some(cell) if !cell.is_blank() => cell.render(),
            _ => format!("Unnamed: {i}"),
        })
        .collect();

    let rows = data
        .into_iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, CellValue::Blank);
            row
        })
        .collect();

    HeaderedTable { columns, rows }
}

fn load_spreadsheet(bytes: &[u8]) -> Result<RawTable, ProcessError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ProcessError::Unclassified(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ProcessError::Unclassified("workbook has no worksheet".to_string()))?
        .map_err(|e| ProcessError::Unclassified(e.to_string()))?;

    // calamine trims leading empty rows and columns; restore them so row
    // indices match what the user sees in the sheet.
    let (row_start, col_start) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut table: RawTable = vec![Vec::new(); row_start];
    for row in range.rows() {
        let mut cells = vec![CellValue::Blank; col_start];
        cells.extend(row.iter().map(cell_from_data));
        table.push(cells);
    }

    debug!("Loaded spreadsheet with {} rows", table.len());
    Ok(table)
}

fn load_delimited(bytes: &[u8]) -> Result<RawTable, ProcessError> {
    let text = decode_text(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut table: RawTable = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ProcessError::Unclassified(e.to_string()))?;
        table.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Blank
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    debug!("Loaded delimited text with {} rows", table.len());
    Ok(table)
}

/// UTF-8 (BOM stripped) when valid, otherwise GBK.
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (text, _, had_errors) = GBK.decode(bytes);
            if had_errors {
                warn!("Input is neither valid UTF-8 nor GBK; undecodable bytes replaced");
            }
            text
        }
    }
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Blank,
        Data::String(s) if s.is_empty() => CellValue::Blank,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Text(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => CellValue::Date(dt),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        other => CellValue::Text(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    // ── InputFormat ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("a/b/week1.xlsx")),
            Some(InputFormat::Spreadsheet)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("WEEK1.CSV")),
            Some(InputFormat::Delimited)
        );
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("no_extension")), None);
    }

    // ── is_transient_file ─────────────────────────────────────────────────────

    #[test]
    fn test_is_transient_file() {
        assert!(is_transient_file(Path::new("/x/~$week1.xlsx")));
        assert!(is_transient_file(Path::new("/x/.hidden.csv")));
        assert!(!is_transient_file(Path::new("/x/week1.xlsx")));
        assert!(!is_transient_file(Path::new("/x/a~$b.xlsx")));
    }

    // ── find_input_files ──────────────────────────────────────────────────────

    #[test]
    fn test_find_input_files_recursive_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("week2");
        std::fs::create_dir_all(&sub).unwrap();
        for name in ["b.csv", "a.xlsx", "~$a.xlsx", ".c.csv", "readme.txt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::write(sub.join("d.csv"), "x").unwrap();

        let files = find_input_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.csv", "week2/d.csv"]);
    }

    #[test]
    fn test_find_input_files_nonexistent_path() {
        let files = find_input_files(Path::new("/tmp/does-not-exist-tally-test-xyz"));
        assert!(files.is_empty());
    }

    // ── load_raw_table: delimited ─────────────────────────────────────────────

    #[test]
    fn test_load_delimited_utf8_with_bom_and_ragged_rows() {
        let bytes = "\u{feff}课程: 数学\n姓名,签到状态\n张三,已签\n".as_bytes();
        let table = load_raw_table(bytes, InputFormat::Delimited).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0], vec![text("课程: 数学")]);
        assert_eq!(table[1], vec![text("姓名"), text("签到状态")]);
    }

    #[test]
    fn test_load_delimited_empty_field_is_blank() {
        let table = load_raw_table(b"a,,c\n", InputFormat::Delimited).unwrap();
        assert_eq!(table[0], vec![text("a"), CellValue::Blank, text("c")]);
    }

    #[test]
    fn test_load_delimited_gbk_fallback() {
        let (encoded, _, _) = GBK.encode("姓名,签到状态\n李四,未参与\n");
        let table = load_raw_table(&encoded, InputFormat::Delimited).unwrap();
        assert_eq!(table[1], vec![text("李四"), text("未参与")]);
    }

    // ── load_raw_table: spreadsheet ───────────────────────────────────────────

    #[test]
    fn test_load_spreadsheet_mixed_cells_and_leading_blank_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 0, "姓名").unwrap();
        sheet.write_string(2, 1, "学号/工号").unwrap();
        sheet.write_string(3, 0, "张三").unwrap();
        sheet.write_number(3, 1, 2021001.0).unwrap();
        workbook.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let table = load_raw_table(&bytes, InputFormat::Spreadsheet).unwrap();

        assert_eq!(table.len(), 4);
        assert!(table[0].is_empty());
        assert_eq!(table[2][0], text("姓名"));
        assert_eq!(table[3][1].render(), "2021001");
    }

    #[test]
    fn test_load_spreadsheet_garbage_is_unclassified() {
        let err = load_raw_table(b"definitely not a zip", InputFormat::Spreadsheet).unwrap_err();
        assert!(matches!(err, ProcessError::Unclassified(_)));
    }

    // ── apply_header ──────────────────────────────────────────────────────────

    #[test]
    fn test_apply_header_drops_rows_above_and_blank_rows() {
        let raw: RawTable = vec![
            vec![text("导出时间"), text("2024-03-01")],
            vec![text("姓名"), text("签到状态")],
            vec![text("张三"), text("已签")],
            vec![CellValue::Blank, text("  ")],
            vec![text("李四")],
        ];
        let table = apply_header(&raw, 1);

        assert_eq!(table.columns, vec!["姓名", "签到状态"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec![text("李四"), CellValue::Blank]);
    }

    #[test]
    fn test_apply_header_names_blank_and_extra_columns() {
        let raw: RawTable = vec![
            vec![text("姓名"), CellValue::Blank],
            vec![text("张三"), text("x"), text("extra")],
        ];
        let table = apply_header(&raw, 0);
        assert_eq!(table.columns, vec!["姓名", "Unnamed: 1", "Unnamed: 2"]);
    }

    #[test]
    fn test_apply_header_out_of_range_offset() {
        let raw: RawTable = vec![vec![text("a")]];
        assert_eq!(apply_header(&raw, 3), HeaderedTable::default());
    }
}
