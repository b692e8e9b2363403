//! # xlsplit-xlsx
//!
//! XLSX (Office Open XML) access for xlsplit.
//!
//! - [`XlsxSource`] opens a workbook container, lists its sheets and streams
//!   the rows of one sheet as raw text with storage kind and style id.
//! - [`OutputWorkbook`] and [`XlsxWriter`] build a fresh single-sheet workbook
//!   that reuses the source style table.

pub mod error;
pub mod reader;
pub mod writer;

mod escape;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::{ColumnLayout, RawCell, RowStream, SheetRow, XlsxSource};
pub use styles::StyleTable;
pub use writer::{OutputCell, OutputWorkbook, XlsxWriter};
