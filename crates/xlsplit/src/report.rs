//! Split results

use std::path::PathBuf;

use xlsplit_core::SplitKey;

/// One written output workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutput {
    /// Sanitized split value
    pub key: SplitKey,
    /// Number of data rows written
    pub rows: usize,
    /// Path of the saved file
    pub path: PathBuf,
}

/// Summary of a successful split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Source sheet name
    pub sheet: String,
    /// Sanitized split column header
    pub column: SplitKey,
    /// Directory holding the output files
    pub output_dir: PathBuf,
    /// Total data rows read
    pub rows: usize,
    /// Written workbooks in emission order
    pub groups: Vec<GroupOutput>,
}

impl SplitReport {
    /// Paths of all written files
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.groups.iter().map(|g| &g.path)
    }

    /// Output for one key
    pub fn group(&self, key: &str) -> Option<&GroupOutput> {
        self.groups.iter().find(|g| g.key.as_str() == key)
    }
}
