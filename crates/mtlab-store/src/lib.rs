//! CSV-backed storage for mtlab.
//!
//! Everything lives in one data directory:
//!
//! - `sample_pairs.csv`: the demo dataset used by `lab` and pairs-mode work
//! - `tickets.csv`: instructor assignments
//! - `results.csv`: the append-only submissions log

pub mod error;
pub mod pairs;
pub mod results;
pub mod tickets;

use std::path::{Path, PathBuf};

pub use error::StoreError;
pub use pairs::{validate_pairs, ValidationWarning, SAMPLE_PAIRS};
pub use results::ResultsTable;
pub use tickets::TICKET_COLUMNS;

pub type Result<T> = std::result::Result<T, StoreError>;

pub const PAIRS_FILE: &str = "sample_pairs.csv";
pub const TICKETS_FILE: &str = "tickets.csv";
pub const RESULTS_FILE: &str = "results.csv";

/// Handle to the data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pairs_path(&self) -> PathBuf {
        self.root.join(PAIRS_FILE)
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.root.join(TICKETS_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }

    /// Create the directory if it does not exist.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))
    }

    /// Which of the three data files exist, by file name.
    pub fn present_files(&self) -> Vec<(&'static str, bool)> {
        [PAIRS_FILE, TICKETS_FILE, RESULTS_FILE]
            .into_iter()
            .map(|name| (name, self.root.join(name).is_file()))
            .collect()
    }

    /// Write `contents` next to `path` and move it into place.
    pub(crate) fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        use std::io::Write;

        self.ensure()?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        tmp.write_all(contents)
            .and_then(|_| tmp.flush())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
        Ok(())
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new("data")
    }
}
