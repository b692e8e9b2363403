//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellKind`] - How a source cell stores its value
//! - [`CellValue`] - A typed value written to an output cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::{CellKind, CellValue};
