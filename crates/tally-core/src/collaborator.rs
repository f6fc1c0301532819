//! The boundary between the tally pipeline and whatever presents it.
//!
//! The pipeline never talks to a user directly. File choice, destination
//! prompts, progress and log display are all routed through [`Collaborator`],
//! implemented by the console front end and by test doubles.

use std::fmt;
use std::path::PathBuf;

/// Outcome of asking the user where to save an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Path(PathBuf),
    /// The user declined to choose. Not an error.
    Cancelled,
}

/// Severity attached to a collaborator log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

pub trait Collaborator {
    /// Files picked for import.
    fn choose_files(&mut self) -> Vec<PathBuf>;

    /// A folder to scan for input files, or `None` when the user declined.
    fn choose_folder(&mut self) -> Option<PathBuf>;

    /// Ask where to save an artifact. Blocks until the user answers.
    fn choose_save_destination(&mut self, suggested_name: &str) -> Destination;

    fn report_progress(&mut self, current: usize, total: usize);

    fn report_log(&mut self, message: &str, level: LogLevel);
}
