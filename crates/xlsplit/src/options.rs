//! Split options

use std::path::{Path, PathBuf};

/// What happens to already written files when a later group fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Leave every file written before the failure in place
    #[default]
    KeepWritten,
    /// Delete the files written by the failed call, and the output directory
    /// if the call created it and it ends up empty
    RemoveWritten,
}

/// Options for a split
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Directory under which `<column>/` is created (default: working directory)
    pub output_root: PathBuf,
    /// Behavior on a failed write
    pub on_failure: FailurePolicy,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            on_failure: FailurePolicy::default(),
        }
    }
}

impl SplitOptions {
    /// Set the output root directory
    pub fn output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }

    /// Set the failure policy
    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}
