use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Tally check-in exports into a per-person attendance summary
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attendance-tally",
    about = "Tally check-in exports into a per-person attendance summary",
    version
)]
pub struct Settings {
    /// Input files (.xlsx or .csv)
    pub inputs: Vec<PathBuf>,

    /// Folder to scan recursively for input files
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Where to write the aggregated summary (.xlsx or .csv)
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// JSON file overriding column labels and status values
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Never prompt for a destination; treat every prompt as cancelled
    #[arg(long)]
    pub no_prompt: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Parse `args`; `--debug` overrides the log level.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from(["attendance-tally"]);

        assert!(settings.inputs.is_empty());
        assert!(settings.folder.is_none());
        assert!(settings.summary.is_none());
        assert!(settings.schema.is_none());
        assert!(!settings.no_prompt);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_inputs_and_summary() {
        let settings = Settings::load_from([
            "attendance-tally",
            "a.xlsx",
            "b.csv",
            "--summary",
            "out.xlsx",
        ]);
        assert_eq!(
            settings.inputs,
            vec![PathBuf::from("a.xlsx"), PathBuf::from("b.csv")]
        );
        assert_eq!(settings.summary, Some(PathBuf::from("out.xlsx")));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from(["attendance-tally", "--log-level", "ERROR", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_nothing_carries_over_between_runs() {
        let first = Settings::load_from([
            "attendance-tally",
            "week1.csv",
            "--summary",
            "/old/summary.xlsx",
            "--folder",
            "/exports",
        ]);
        assert_eq!(first.summary, Some(PathBuf::from("/old/summary.xlsx")));

        let second = Settings::load_from(["attendance-tally", "week2.csv"]);
        assert_eq!(second.summary, None);
        assert_eq!(second.folder, None);
        assert_eq!(second.schema, None);
    }

    #[test]
    fn test_clear_flag_is_gone() {
        let result = Settings::try_parse_from(["attendance-tally", "--clear"]);
        assert!(result.is_err());
    }
}
