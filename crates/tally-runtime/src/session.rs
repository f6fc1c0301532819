//! The ordered list of files queued for a processing run.

use std::path::{Path, PathBuf};

use tally_data::reader::{find_input_files, is_transient_file};
use tracing::debug;

/// Outcome of one `add_*` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    /// Editor lock files and hidden files that were not queued.
    pub skipped_transient: usize,
    /// Paths already present in the list.
    pub duplicates: usize,
}

/// Files queued for processing, in import order and without duplicates.
#[derive(Debug, Clone, Default)]
pub struct ImportList {
    paths: Vec<PathBuf>,
}

impl ImportList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `paths`, skipping transient files and anything already queued.
    pub fn add_files<I, P>(&mut self, paths: I) -> ImportStats
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut stats = ImportStats::default();
        for path in paths {
            let path = path.into();
            if is_transient_file(&path) {
                stats.skipped_transient += 1;
            } else if self.paths.contains(&path) {
                stats.duplicates += 1;
            } else {
                self.paths.push(path);
                stats.imported += 1;
            }
        }
        debug!("import: {:?}", stats);
        stats
    }

    /// Queue every supported file found under `folder`.
    pub fn add_folder(&mut self, folder: &Path) -> ImportStats {
        self.add_files(find_input_files(folder))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_files_keeps_order_and_skips_duplicates() {
        let mut list = ImportList::new();
        let stats = list.add_files(["b.xlsx", "a.csv", "b.xlsx"]);

        assert_eq!(
            stats,
            ImportStats {
                imported: 2,
                skipped_transient: 0,
                duplicates: 1
            }
        );
        assert_eq!(
            list.paths(),
            &[PathBuf::from("b.xlsx"), PathBuf::from("a.csv")]
        );

        let again = list.add_files(["a.csv"]);
        assert_eq!(again.duplicates, 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_add_files_skips_transient() {
        let mut list = ImportList::new();
        let stats = list.add_files(["~$week1.xlsx", ".hidden.csv", "week1.xlsx"]);
        assert_eq!(stats.skipped_transient, 2);
        assert_eq!(stats.imported, 1);
    }

    #[test]
    fn test_add_folder() {
        let dir = TempDir::new().unwrap();
        for name in ["1.csv", "2.xlsx", "~$2.xlsx", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let mut list = ImportList::new();
        let stats = list.add_folder(dir.path());
        assert_eq!(stats.imported, 2);
        assert_eq!(list.paths()[0], dir.path().join("1.csv"));

        // Re-importing the same folder only finds duplicates.
        let again = list.add_folder(dir.path());
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 2);
    }

    #[test]
    fn test_clear() {
        let mut list = ImportList::new();
        list.add_files(["a.csv"]);
        list.clear();
        assert!(list.is_empty());
    }
}
