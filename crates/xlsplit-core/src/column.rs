//! Column types

/// Width applied when a source column has no custom width and the sheet
/// declares no default (Excel's Calibri 11 default, in character units)
pub const DEFAULT_COLUMN_WIDTH: f64 = 9.140625;

/// Formatting sampled once per column and applied to the whole output column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnFormat {
    /// Column index (0-based)
    pub index: u16,
    /// Style id into the (copied) source style table
    pub style_id: u32,
    /// Column width in character units
    pub width: f64,
}

impl ColumnFormat {
    /// Create a column format
    pub fn new(index: u16, style_id: u32, width: f64) -> Self {
        Self {
            index,
            style_id,
            width,
        }
    }
}

impl Default for ColumnFormat {
    fn default() -> Self {
        Self::new(0, 0, DEFAULT_COLUMN_WIDTH)
    }
}
