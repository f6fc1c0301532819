use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single untyped cell as it came out of a spreadsheet or CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    #[default]
    Blank,
}

impl CellValue {
    /// Render the cell to the string a user would see in the sheet.
    ///
    /// Integral numbers drop the fractional part so that identity codes read
    /// back as numbers (`2021001.0`) render the way they were typed.
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Blank => String::new(),
        }
    }

    /// `true` for [`CellValue::Blank`] and for text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A headerless table: rows of cells, row 0 is whatever the file starts with.
pub type RawTable = Vec<Vec<CellValue>>;

/// A table whose column names were taken from a discovered header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl HeaderedTable {
    /// Index of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cell at (`row`, `col`), or blank when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static BLANK: CellValue = CellValue::Blank;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }
}

/// Per-row attendance signal derived from the categorical status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSignal {
    /// Checked in; contributes 1.
    Present,
    /// Did not participate; contributes 0.
    NotParticipated,
    /// Any other status, including blank. Contributes nothing to sums.
    Unrecognized,
}

impl AttendanceSignal {
    pub fn value(self) -> Option<u32> {
        match self {
            AttendanceSignal::Present => Some(1),
            AttendanceSignal::NotParticipated => Some(0),
            AttendanceSignal::Unrecognized => None,
        }
    }
}

/// The composite key that identifies one person across files.
///
/// Ordering is lexicographic over the fields in declaration order, which is
/// the order summary rows are emitted in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub name: String,
    pub identity_code: String,
    pub institution: String,
    pub department: String,
    pub major: String,
    pub class_name: String,
}

/// One validated data row of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub identity_code: String,
    pub institution: String,
    pub department: String,
    pub major: String,
    pub class_name: String,
    pub status: String,
    pub attendance_signal: AttendanceSignal,
}

impl NormalizedRecord {
    /// Tag this record with the file it came from.
    pub fn to_summary(&self, source_file: &str) -> SummaryRecord {
        SummaryRecord {
            name: self.name.clone(),
            identity_code: self.identity_code.clone(),
            institution: self.institution.clone(),
            department: self.department.clone(),
            major: self.major.clone(),
            class_name: self.class_name.clone(),
            source_file: source_file.to_string(),
            attendance_signal: self.attendance_signal,
        }
    }
}

/// A fully processed input file: every source column plus the derived signal.
///
/// `table` and `records` are index-aligned: `records[i]` was read from
/// `table.rows[i]`, and `signals()` yields the value of the appended column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub table: HeaderedTable,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn signals(&self) -> impl Iterator<Item = AttendanceSignal> + '_ {
        self.records.iter().map(|r| r.attendance_signal)
    }
}

/// One person's row from one file, ready for cross-file aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub name: String,
    pub identity_code: String,
    pub institution: String,
    pub department: String,
    pub major: String,
    pub class_name: String,
    pub source_file: String,
    pub attendance_signal: AttendanceSignal,
}

impl SummaryRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            name: self.name.clone(),
            identity_code: self.identity_code.clone(),
            institution: self.institution.clone(),
            department: self.department.clone(),
            major: self.major.clone(),
            class_name: self.class_name.clone(),
        }
    }
}

/// Final per-person total across every processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub key: IdentityKey,
    pub total_signal: u32,
}

/// Summary records collected over one processing run.
///
/// Owned by the run orchestrator: created empty when a run starts, extended
/// once per successfully processed file and read by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryAccumulator {
    records: Vec<SummaryRecord>,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = SummaryRecord>) {
        self.records.extend(records);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }
}
