//! # xlsplit
//!
//! Split one sheet of an XLSX workbook into one workbook per distinct value
//! of a chosen column.
//!
//! ## Features
//!
//! - Single streaming pass over the source rows
//! - Cell types inferred per column from the first data row
//! - Source style table, column styles and column widths carried over
//! - Bold, centered header with an autofilter and a frozen first row
//! - Progress observers for status reporting
//!
//! ## Example
//!
//! ```rust,no_run
//! use xlsplit::prelude::*;
//!
//! let mut splitter = Splitter::open_file("sales.xlsx")?;
//! let sheet = splitter.sheets().remove(0);
//! let report = splitter.split_by_column(&sheet, 0)?;
//!
//! // One file per value, e.g. ./Region/Data-Region-East.xlsx
//! for group in &report.groups {
//!     println!("{}: {} rows", group.key, group.rows);
//! }
//! # Ok::<(), SplitError>(())
//! ```

pub mod error;
pub mod options;
pub mod prelude;
pub mod progress;
pub mod report;
pub mod splitter;

pub use error::{SplitError, SplitResult};
pub use options::{FailurePolicy, SplitOptions};
pub use progress::ProgressEvent;
pub use report::{GroupOutput, SplitReport};
pub use splitter::Splitter;

// Re-export core types
pub use xlsplit_core::{
    sanitize, sheet_name, CellKind, CellValue, ColumnFormat, SplitKey, BLANK_KEY,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use xlsplit_xlsx::{XlsxError, XlsxSource};
