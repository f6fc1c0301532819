mod bootstrap;
mod console;

use anyhow::Result;
use tally_core::collaborator::{Collaborator, LogLevel};
use tally_core::schema::SchemaConfig;
use tally_core::settings::Settings;
use tally_runtime::orchestrator::{AttendanceRun, RunError, SummaryOutcome};
use tally_runtime::session::ImportStats;

use crate::console::ConsoleCollaborator;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("attendance-tally v{} starting", env!("CARGO_PKG_VERSION"));

    let schema = match &settings.schema {
        Some(path) => SchemaConfig::load_from(path)?,
        None => SchemaConfig::default(),
    };

    let stdin = std::io::stdin();
    let mut console = ConsoleCollaborator::new(stdin.lock(), settings.no_prompt);
    let mut run = AttendanceRun::new(schema);

    import_inputs(&settings, &mut run, &mut console);

    let report = run.process_files(&mut console)?;
    for failure in &report.failures {
        eprintln!("failed: {} ({})", failure.path.display(), failure.error);
    }

    if let Some(summary) = &settings.summary {
        console.preset_destination(summary.clone());
    }

    match run.generate_summary(&mut console) {
        Ok(SummaryOutcome::Saved { path, people }) => {
            println!("Summary saved to {} ({} people)", path.display(), people);
        }
        Ok(SummaryOutcome::Cancelled) => {
            println!("Summary not saved");
        }
        // Already reported through the console; every file failed or was empty.
        Err(RunError::NoSummaryData) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Fill the import list from the command line, falling back to prompts.
fn import_inputs<C: Collaborator>(settings: &Settings, run: &mut AttendanceRun, console: &mut C) {
    if !settings.inputs.is_empty() {
        let stats = run.imports_mut().add_files(settings.inputs.iter().cloned());
        log_import(console, "Imported files", stats);
    }

    if let Some(folder) = &settings.folder {
        let stats = run.imports_mut().add_folder(folder);
        log_import(console, &format!("Imported folder {}", folder.display()), stats);
    }

    if run.imports().is_empty() {
        if let Some(folder) = console.choose_folder() {
            let stats = run.imports_mut().add_folder(&folder);
            log_import(console, &format!("Imported folder {}", folder.display()), stats);
        } else {
            let files = console.choose_files();
            if !files.is_empty() {
                let stats = run.imports_mut().add_files(files);
                log_import(console, "Imported files", stats);
            }
        }
    }
}

fn log_import<C: Collaborator>(console: &mut C, what: &str, stats: ImportStats) {
    console.report_log(
        &format!(
            "{what}: {} imported, {} transient skipped, {} already queued",
            stats.imported, stats.skipped_transient, stats.duplicates
        ),
        LogLevel::Info,
    );
}
