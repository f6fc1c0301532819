//! Single-file pipeline: load → locate header → validate → score → persist.
//!
//! Every failure is scoped to the file being processed and returned as a
//! [`ProcessError`]; the caller decides whether to continue with the next
//! file.

use std::path::{Path, PathBuf};

use tally_core::collaborator::{Collaborator, Destination, LogLevel};
use tally_core::error::{is_access_denied, ProcessError};
use tally_core::models::{HeaderedTable, NormalizedRecord, NormalizedTable, SummaryRecord};
use tally_core::schema::SchemaConfig;
use tracing::debug;

use crate::locator::locate_header;
use crate::reader::{apply_header, load_raw_table, InputFormat};
use crate::scorer::score_status;
use crate::validator::{normalize_columns, validate_columns};
use crate::writer::{default_output_path, output_file_name, write_normalized_table, WriteError};

// ── Public types ──────────────────────────────────────────────────────────────

/// An input that has been parsed, validated and scored, but not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// Zero-based row index of the header in the raw sheet.
    pub header_row: usize,
    pub table: NormalizedTable,
    /// One record per data row, tagged with the file's display name.
    pub summaries: Vec<SummaryRecord>,
}

/// A fully processed input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub source: PathBuf,
    /// Where the normalized table was written.
    pub output_path: PathBuf,
    pub header_row: usize,
    pub table: NormalizedTable,
    pub summaries: Vec<SummaryRecord>,
}

// ── FileProcessor ─────────────────────────────────────────────────────────────

/// Processes one check-in export at a time against a fixed schema.
#[derive(Debug, Clone, Default)]
pub struct FileProcessor {
    schema: SchemaConfig,
}

impl FileProcessor {
    pub fn new(schema: SchemaConfig) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Process the file at `path` and write its normalized table.
    ///
    /// The table goes next to the input. When that location refuses the
    /// write, `collaborator` is asked for another destination; declining
    /// fails the file with [`ProcessError::AccessDenied`].
    pub fn process(
        &self,
        path: &Path,
        collaborator: &mut dyn Collaborator,
    ) -> Result<ProcessedFile, ProcessError> {
        let format = InputFormat::from_path(path).ok_or_else(|| {
            ProcessError::Unclassified(format!("Unsupported file type: {}", path.display()))
        })?;
        let bytes = std::fs::read(path).map_err(|e| ProcessError::from_io(path, &e))?;

        let parsed = self.process_bytes(&bytes, format, &display_name(path))?;
        let output_path = self.persist(path, &parsed.table, collaborator)?;

        Ok(ProcessedFile {
            source: path.to_path_buf(),
            output_path,
            header_row: parsed.header_row,
            table: parsed.table,
            summaries: parsed.summaries,
        })
    }

    /// Parse, validate and score raw file contents without touching disk.
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        format: InputFormat,
        display_name: &str,
    ) -> Result<ParsedFile, ProcessError> {
        let raw = load_raw_table(bytes, format)?;

        let marker = self.schema.header_marker();
        let header_row = locate_header(&raw, marker).ok_or_else(|| ProcessError::HeaderNotFound {
            marker: marker.to_string(),
        })?;

        let mut table = apply_header(&raw, header_row);
        normalize_columns(&mut table);

        let required = self.schema.required_columns();
        validate_columns(&table.columns, &required)?;
        let indices = resolve_indices(&table, &required)?;

        let records: Vec<NormalizedRecord> = (0..table.rows.len())
            .map(|row| self.build_record(&table, row, &indices))
            .collect();
        let summaries = records
            .iter()
            .map(|r| r.to_summary(display_name))
            .collect();

        debug!(
            "{}: header at row {}, {} data rows",
            display_name,
            header_row,
            records.len()
        );

        Ok(ParsedFile {
            header_row,
            table: NormalizedTable { table, records },
            summaries,
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn build_record(&self, table: &HeaderedTable, row: usize, indices: &[usize; 7]) -> NormalizedRecord {
        let [name, identity, institution, department, major, class_name, status] =
            indices.map(|col| table.cell(row, col).render().trim().to_string());
        let attendance_signal = score_status(&status, &self.schema);

        NormalizedRecord {
            name,
            identity_code: identity,
            institution,
            department,
            major,
            class_name,
            status,
            attendance_signal,
        }
    }

    fn persist(
        &self,
        input: &Path,
        table: &NormalizedTable,
        collaborator: &mut dyn Collaborator,
    ) -> Result<PathBuf, ProcessError> {
        save_with_fallback(
            default_output_path(input, &self.schema),
            &output_file_name(input, &self.schema),
            collaborator,
            |path| write_normalized_table(path, table, &self.schema),
        )
    }
}

/// Run `write` against `default_path`; when that location refuses access,
/// ask `collaborator` for another destination and write there instead.
///
/// Returns the path that was written. A declined prompt fails with
/// [`ProcessError::AccessDenied`]; a failed write to the chosen path is
/// returned as is.
pub fn save_with_fallback<F>(
    default_path: PathBuf,
    suggested_name: &str,
    collaborator: &mut dyn Collaborator,
    mut write: F,
) -> Result<PathBuf, ProcessError>
where
    F: FnMut(&Path) -> Result<(), WriteError>,
{
    match write(&default_path) {
        Ok(()) => {
            collaborator.report_log(
                &format!("Saved normalized table: {}", display_name(&default_path)),
                LogLevel::Info,
            );
            Ok(default_path)
        }
        Err(WriteError::Io(e)) if is_access_denied(&e) => {
            collaborator.report_log(
                &format!(
                    "Cannot write {} ({e}), asking for another destination",
                    display_name(&default_path)
                ),
                LogLevel::Warning,
            );

            match collaborator.choose_save_destination(suggested_name) {
                Destination::Path(alternate) => {
                    write(&alternate).map_err(|e| classify_write_error(&alternate, e))?;
                    collaborator.report_log(
                        &format!("Saved normalized table to {}", alternate.display()),
                        LogLevel::Info,
                    );
                    Ok(alternate)
                }
                Destination::Cancelled => Err(ProcessError::AccessDenied {
                    path: default_path,
                    reason: "save was cancelled and no alternate destination was given"
                        .to_string(),
                }),
            }
        }
        Err(e) => Err(classify_write_error(&default_path, e)),
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// The file name component shown to users and stored in summary records.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn resolve_indices(table: &HeaderedTable, required: &[&str; 7]) -> Result<[usize; 7], ProcessError> {
    let mut indices = [0usize; 7];
    for (slot, name) in indices.iter_mut().zip(required.iter()) {
        *slot = table
            .column_index(name)
            .ok_or_else(|| ProcessError::SchemaMissingColumn {
                column: name.to_string(),
            })?;
    }
    Ok(indices)
}

fn classify_write_error(path: &Path, err: WriteError) -> ProcessError {
    match err {
        WriteError::Io(e) => ProcessError::from_io(path, &e),
        other => ProcessError::Unclassified(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
