use serde::Serialize;
use std::path::PathBuf;

/// Name and content size of one archived entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
}

/// An entry that could not be written during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of extracting an archive
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub archive: PathBuf,
    pub output_dir: PathBuf,
    /// Paths written, in archive order
    pub extracted: Vec<PathBuf>,
    pub failures: Vec<ExtractFailure>,
}

impl ExtractReport {
    /// Entries seen, written or not
    pub fn total(&self) -> usize {
        self.extracted.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.extracted.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
