use std::io::BufRead;
use std::path::PathBuf;

use tally_core::collaborator::{Collaborator, Destination, LogLevel};

/// Terminal front end: prompts on stderr, answers from `input`, and mirrors
/// every log line into `tracing`.
pub struct ConsoleCollaborator<R> {
    input: R,
    no_prompt: bool,
    /// Answer for the next destination prompt, consumed on use.
    preset: Option<PathBuf>,
}

impl<R: BufRead> ConsoleCollaborator<R> {
    pub fn new(input: R, no_prompt: bool) -> Self {
        Self {
            input,
            no_prompt,
            preset: None,
        }
    }

    /// Answer the next destination prompt with `path` without asking.
    pub fn preset_destination(&mut self, path: PathBuf) {
        self.preset = Some(path);
    }

    /// One trimmed line of input; `None` on EOF, read error or a blank line.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        if self.no_prompt {
            return None;
        }
        eprint!("{prompt}");

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
        }
    }
}

impl<R: BufRead> Collaborator for ConsoleCollaborator<R> {
    fn choose_files(&mut self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        while let Some(path) = self.ask("File to import (blank to finish): ") {
            files.push(PathBuf::from(path));
        }
        files
    }

    fn choose_folder(&mut self) -> Option<PathBuf> {
        self.ask("Folder to import (blank to skip): ")
            .map(PathBuf::from)
    }

    fn choose_save_destination(&mut self, suggested_name: &str) -> Destination {
        let chosen = match self.preset.take() {
            Some(path) => Some(path),
            None => self
                .ask(&format!("Save {suggested_name} to (blank to cancel): "))
                .map(PathBuf::from),
        };

        match chosen {
            Some(path) if path.is_dir() => Destination::Path(path.join(suggested_name)),
            Some(path) => Destination::Path(path),
            None => Destination::Cancelled,
        }
    }

    fn report_progress(&mut self, current: usize, total: usize) {
        tracing::info!("[{current}/{total}]");
    }

    fn report_log(&mut self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn console(input: &str, no_prompt: bool) -> ConsoleCollaborator<Cursor<Vec<u8>>> {
        ConsoleCollaborator::new(Cursor::new(input.as_bytes().to_vec()), no_prompt)
    }

    #[test]
    fn test_choose_files_until_blank_line() {
        let mut c = console("a.csv\n  b.xlsx  \n\nc.csv\n", false);
        assert_eq!(
            c.choose_files(),
            vec![PathBuf::from("a.csv"), PathBuf::from("b.xlsx")]
        );
    }

    #[test]
    fn test_choose_files_stops_at_eof() {
        let mut c = console("a.csv", false);
        assert_eq!(c.choose_files(), vec![PathBuf::from("a.csv")]);
    }

    #[test]
    fn test_choose_folder_blank_is_none() {
        assert_eq!(console("\n", false).choose_folder(), None);
        assert_eq!(
            console("/data\n", false).choose_folder(),
            Some(PathBuf::from("/data"))
        );
    }

    #[test]
    fn test_no_prompt_cancels_everything() {
        let mut c = console("/tmp/out.xlsx\n", true);
        assert_eq!(c.choose_save_destination("x.xlsx"), Destination::Cancelled);
        assert!(c.choose_files().is_empty());
        assert_eq!(c.choose_folder(), None);
    }

    #[test]
    fn test_preset_is_used_once() {
        let mut c = console("", true);
        c.preset_destination(PathBuf::from("/tmp/summary.xlsx"));
        assert_eq!(
            c.choose_save_destination("学习通签到汇总表.xlsx"),
            Destination::Path(PathBuf::from("/tmp/summary.xlsx"))
        );
        assert_eq!(
            c.choose_save_destination("学习通签到汇总表.xlsx"),
            Destination::Cancelled
        );
    }

    #[test]
    fn test_directory_answer_gets_suggested_name() {
        let dir = TempDir::new().unwrap();
        let mut c = console(&format!("{}\n", dir.path().display()), false);
        assert_eq!(
            c.choose_save_destination("week1_统计结果.xlsx"),
            Destination::Path(dir.path().join("week1_统计结果.xlsx"))
        );
    }
}
