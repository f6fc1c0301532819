use std::path::PathBuf;
use thiserror::Error;

/// Why a single input file could not be processed.
///
/// The set is closed: the batch loop matches on it to decide how a failure is
/// reported, and every variant is scoped to one file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The input could not be read, or the output artifact could not be
    /// written and no alternate destination was supplied.
    #[error("Access denied for {path}: {reason}")]
    AccessDenied { path: PathBuf, reason: String },

    /// A required column is absent after header normalisation.
    #[error("Missing required column: {column}")]
    SchemaMissingColumn { column: String },

    /// No row of the sheet contains the status-column marker.
    #[error("No header row containing '{marker}' was found")]
    HeaderNotFound { marker: String },

    /// Any other parse or format failure, message kept verbatim.
    #[error("{0}")]
    Unclassified(String),
}

/// Tag of a [`ProcessError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessErrorKind {
    AccessDenied,
    SchemaMissingColumn,
    HeaderNotFound,
    Unclassified,
}

impl ProcessError {
    pub fn kind(&self) -> ProcessErrorKind {
        match self {
            ProcessError::AccessDenied { .. } => ProcessErrorKind::AccessDenied,
            ProcessError::SchemaMissingColumn { .. } => ProcessErrorKind::SchemaMissingColumn,
            ProcessError::HeaderNotFound { .. } => ProcessErrorKind::HeaderNotFound,
            ProcessError::Unclassified(_) => ProcessErrorKind::Unclassified,
        }
    }

    /// Classify an I/O failure on `path`.
    ///
    /// Anything [`is_access_denied`] accepts becomes
    /// [`ProcessError::AccessDenied`]; everything else is unclassified.
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        if is_access_denied(err) {
            ProcessError::AccessDenied {
                path: path.into(),
                reason: err.to_string(),
            }
        } else {
            ProcessError::Unclassified(err.to_string())
        }
    }
}

/// OS error codes that mean "this location cannot be written right now".
#[cfg(windows)]
const ACCESS_DENIED_OS_ERRORS: &[i32] = &[
    32, // ERROR_SHARING_VIOLATION: open in another program
    33, // ERROR_LOCK_VIOLATION
];
#[cfg(unix)]
const ACCESS_DENIED_OS_ERRORS: &[i32] = &[
    30, // EROFS
];
#[cfg(not(any(windows, unix)))]
const ACCESS_DENIED_OS_ERRORS: &[i32] = &[];

/// Whether `err` means the path exists but may not be read or written:
/// missing permissions, a file locked by another program, or a read-only
/// filesystem.
pub fn is_access_denied(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::PermissionDenied
        || err
            .raw_os_error()
            .is_some_and(|code| ACCESS_DENIED_OS_ERRORS.contains(&code))
}

/// Errors raised while reducing summary records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Nothing has been accumulated yet; the caller must process files first.
    #[error("No summary data available; process files first")]
    NoSummaryData,
}

/// Application-level errors (configuration, bootstrap).
#[derive(Error, Debug)]
pub enum TallyError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the tally crates.
pub type Result<T> = std::result::Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display_names_column() {
        let err = ProcessError::SchemaMissingColumn {
            column: "专业".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required column: 专业");
        assert_eq!(err.kind(), ProcessErrorKind::SchemaMissingColumn);
    }

    #[test]
    fn test_header_not_found_display() {
        let err = ProcessError::HeaderNotFound {
            marker: "签到状态".to_string(),
        };
        assert!(err.to_string().contains("签到状态"));
        assert_eq!(err.kind(), ProcessErrorKind::HeaderNotFound);
    }

    #[test]
    fn test_from_io_permission_denied_is_access_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ProcessError::from_io("/data/a.xlsx", &io_err);
        assert_eq!(err.kind(), ProcessErrorKind::AccessDenied);
        assert!(err.to_string().contains("/data/a.xlsx"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_io_read_only_filesystem_is_access_denied() {
        let io_err = std::io::Error::from_raw_os_error(30);
        assert!(is_access_denied(&io_err));
        let err = ProcessError::from_io("/mnt/ro/a_统计结果.xlsx", &io_err);
        assert_eq!(err.kind(), ProcessErrorKind::AccessDenied);
    }

    #[cfg(windows)]
    #[test]
    fn test_from_io_file_open_elsewhere_is_access_denied() {
        for code in [32, 33] {
            let io_err = std::io::Error::from_raw_os_error(code);
            assert!(is_access_denied(&io_err), "os error {code}");
            let err = ProcessError::from_io("C:\\data\\a_统计结果.xlsx", &io_err);
            assert_eq!(err.kind(), ProcessErrorKind::AccessDenied);
        }
    }

    #[test]
    fn test_is_access_denied_rejects_other_errors() {
        assert!(!is_access_denied(&std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone"
        )));
        assert!(!is_access_denied(&std::io::Error::other("disk full")));
    }

    #[test]
    fn test_from_io_other_is_unclassified() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ProcessError::from_io("/data/a.xlsx", &io_err);
        assert_eq!(err, ProcessError::Unclassified("no such file".to_string()));
    }

    #[test]
    fn test_unclassified_message_is_verbatim() {
        let err = ProcessError::Unclassified("invalid zip header".to_string());
        assert_eq!(err.to_string(), "invalid zip header");
    }

    #[test]
    fn test_aggregate_error_display() {
        assert_eq!(
            AggregateError::NoSummaryData.to_string(),
            "No summary data available; process files first"
        );
    }

    #[test]
    fn test_tally_error_display_config() {
        let err = TallyError::Config("bad schema file".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad schema file");
    }

    #[test]
    fn test_tally_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: TallyError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
