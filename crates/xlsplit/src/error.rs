//! Split error types

use std::path::PathBuf;

use thiserror::Error;
use xlsplit_xlsx::XlsxError;

/// Result type for split operations
pub type SplitResult<T> = std::result::Result<T, SplitError>;

/// Errors that abort a split operation
#[derive(Debug, Error)]
pub enum SplitError {
    /// The container could not be opened or is not a readable workbook
    #[error("failed to read workbook")]
    Load(#[source] XlsxError),

    /// No sheet with this name
    #[error("sheet \"{0}\" not found")]
    SheetNotFound(String),

    /// The sheet lacks a header row followed by at least one data row
    #[error("sheet \"{0}\" has no data")]
    NoData(String),

    /// Split column index past the last header column
    #[error("column index {index} is out of range (sheet has {count} columns)")]
    InvalidColumn { index: usize, count: usize },

    /// A row could not be decoded
    #[error("failed to read row {row}")]
    RowRead {
        row: u32,
        #[source]
        source: XlsxError,
    },

    /// A sampled style id is not part of the workbook's style table
    #[error("failed to get style of column {column}: style {style} is not defined")]
    StyleRead { column: String, style: u32 },

    /// A column width could not be read
    #[error("failed to get width of column {column}")]
    WidthRead {
        column: String,
        #[source]
        source: XlsxError,
    },

    /// An output workbook could not be created or saved
    #[error("failed to save file for value \"{value}\" ({})", .path.display())]
    OutputWrite {
        value: String,
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

impl SplitError {
    /// Map an error from opening a sheet's row stream
    pub(crate) fn from_sheet_open(err: XlsxError) -> Self {
        match err {
            XlsxError::SheetNotFound(name) => SplitError::SheetNotFound(name),
            other => SplitError::Load(other),
        }
    }
}
