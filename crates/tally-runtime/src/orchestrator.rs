//! Batch orchestration: process every queued file, then aggregate.
//!
//! [`AttendanceRun`] owns the import list and the summary accumulator for the
//! lifetime of a run. Processing is sequential and never aborted by a single
//! bad file; every outcome is reported to the [`Collaborator`].

use std::path::PathBuf;

use tally_core::collaborator::{Collaborator, Destination, LogLevel};
use tally_core::error::{AggregateError, ProcessError};
use tally_core::models::SummaryAccumulator;
use tally_core::schema::SchemaConfig;
use tally_data::aggregator::SummaryAggregator;
use tally_data::processor::{display_name, FileProcessor};
use tally_data::writer::{write_summary_table, WriteError};
use thiserror::Error;
use tracing::info;

use crate::session::ImportList;

// ── Public types ──────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum RunError {
    #[error("No files imported")]
    NoInputFiles,

    #[error("No summary data available; process files first")]
    NoSummaryData,

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: WriteError,
    },
}

/// A file that made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFileInfo {
    pub source: PathBuf,
    pub output_path: PathBuf,
    /// Data rows contributed to the accumulator.
    pub rows: usize,
}

/// A file that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ProcessError,
}

/// Per-file outcomes of one `process_files` call, in import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub successes: Vec<ProcessedFileInfo>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Saved { path: PathBuf, people: usize },
    Cancelled,
}

// ── AttendanceRun ─────────────────────────────────────────────────────────────

pub struct AttendanceRun {
    processor: FileProcessor,
    imports: ImportList,
    accumulator: SummaryAccumulator,
}

impl AttendanceRun {
    pub fn new(schema: SchemaConfig) -> Self {
        Self {
            processor: FileProcessor::new(schema),
            imports: ImportList::new(),
            accumulator: SummaryAccumulator::new(),
        }
    }

    pub fn schema(&self) -> &SchemaConfig {
        self.processor.schema()
    }

    pub fn imports(&self) -> &ImportList {
        &self.imports
    }

    pub fn imports_mut(&mut self) -> &mut ImportList {
        &mut self.imports
    }

    pub fn accumulator(&self) -> &SummaryAccumulator {
        &self.accumulator
    }

    /// Forget every imported file and all accumulated summaries.
    pub fn reset(&mut self) {
        self.imports.clear();
        self.accumulator.clear();
    }

    /// Process every imported file in order.
    ///
    /// The accumulator is rebuilt from scratch: only files that succeed in
    /// this call contribute to the next summary.
    pub fn process_files(
        &mut self,
        collaborator: &mut dyn Collaborator,
    ) -> Result<BatchReport, RunError> {
        if self.imports.is_empty() {
            collaborator.report_log("Processing failed: no files imported", LogLevel::Error);
            return Err(RunError::NoInputFiles);
        }

        self.accumulator.clear();
        let total = self.imports.len();
        let mut report = BatchReport::default();
        collaborator.report_log(&format!("Processing {total} files"), LogLevel::Info);

        for (i, path) in self.imports.paths().iter().enumerate() {
            let name = display_name(path);
            collaborator.report_log(&format!("Processing file: {name}"), LogLevel::Info);

            match self.processor.process(path, collaborator) {
                Ok(processed) => {
                    collaborator.report_log(
                        &format!("Processed {name}: {} rows", processed.summaries.len()),
                        LogLevel::Info,
                    );
                    report.successes.push(ProcessedFileInfo {
                        source: processed.source,
                        output_path: processed.output_path,
                        rows: processed.summaries.len(),
                    });
                    self.accumulator.extend(processed.summaries);
                }
                Err(error) => {
                    collaborator.report_log(&failure_message(&name, &error), LogLevel::Error);
                    report.failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }

            collaborator.report_progress(i + 1, total);
        }

        info!(
            "batch finished: {} ok, {} failed, {} summary rows",
            report.successes.len(),
            report.failures.len(),
            self.accumulator.len()
        );
        collaborator.report_log(
            &format!(
                "Finished processing: {} succeeded, {} failed",
                report.successes.len(),
                report.failures.len()
            ),
            LogLevel::Info,
        );

        Ok(report)
    }

    /// Aggregate everything accumulated so far and save the summary table
    /// wherever the collaborator chooses.
    pub fn generate_summary(
        &self,
        collaborator: &mut dyn Collaborator,
    ) -> Result<SummaryOutcome, RunError> {
        let aggregated = match SummaryAggregator::aggregate(self.accumulator.records()) {
            Ok(records) => records,
            Err(AggregateError::NoSummaryData) => {
                collaborator.report_log(
                    "Cannot generate summary: no summary data, process files first",
                    LogLevel::Warning,
                );
                return Err(RunError::NoSummaryData);
            }
        };

        collaborator.report_log("Generating summary table", LogLevel::Info);
        let schema = self.processor.schema();

        match collaborator.choose_save_destination(&schema.summary_file_name) {
            Destination::Cancelled => {
                collaborator.report_log("Summary save was cancelled", LogLevel::Warning);
                Ok(SummaryOutcome::Cancelled)
            }
            Destination::Path(path) => {
                if let Err(source) = write_summary_table(&path, &aggregated, schema) {
                    collaborator.report_log(
                        &format!("Failed to save summary to {}: {source}", path.display()),
                        LogLevel::Error,
                    );
                    return Err(RunError::Write { path, source });
                }

                collaborator.report_log(
                    &format!("Summary saved: {}", display_name(&path)),
                    LogLevel::Info,
                );
                collaborator.report_log(
                    &format!(
                        "Summary covers {} people, {} check-ins in total",
                        aggregated.len(),
                        SummaryAggregator::calculate_total(&aggregated)
                    ),
                    LogLevel::Info,
                );
                Ok(SummaryOutcome::Saved {
                    path,
                    people: aggregated.len(),
                })
            }
        }
    }
}

fn failure_message(name: &str, error: &ProcessError) -> String {
    match error {
        ProcessError::AccessDenied { .. } => format!("Permission error while processing {name}: {error}"),
        ProcessError::SchemaMissingColumn { .. } => format!("Column error in {name}: {error}"),
        ProcessError::HeaderNotFound { .. } => format!("Header error in {name}: {error}"),
        ProcessError::Unclassified(_) => format!("Failed to process {name}: {error}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
