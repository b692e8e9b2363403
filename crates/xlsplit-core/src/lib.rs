//! # xlsplit-core
//!
//! Core data structures for the xlsplit workbook splitter.
//!
//! This crate provides the types shared by the XLSX adapter and the split engine:
//! - [`CellKind`] - The storage kind of a source cell (the XLSX `t` attribute)
//! - [`CellValue`] - A typed cell value produced by [`CellValue::coerce`]
//! - [`CellAddress`] and [`CellRange`] - A1 addressing for output ranges
//! - [`ColumnFormat`] - The style id and width sampled for one column
//! - [`SplitKey`] - Sanitized group keys and output naming helpers
//!
//! ## Example
//!
//! ```rust
//! use xlsplit_core::{CellKind, CellValue, SplitKey};
//!
//! assert_eq!(CellValue::coerce("42.5", CellKind::Unset), CellValue::Number(42.5));
//! assert_eq!(CellValue::coerce("1", CellKind::Boolean), CellValue::Boolean(true));
//! assert_eq!(SplitKey::new("North / East").as_str(), "North East");
//! assert_eq!(SplitKey::new("?!").as_str(), "Blank");
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod key;

// Re-exports for convenience
pub use cell::{CellAddress, CellKind, CellRange, CellValue};
pub use column::{ColumnFormat, DEFAULT_COLUMN_WIDTH};
pub use error::{Error, Result};
pub use key::{sanitize, sheet_name, SplitKey, BLANK_KEY};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
