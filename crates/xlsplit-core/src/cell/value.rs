//! Cell value types

use std::fmt;

/// How a source cell stores its value (the XLSX `t` attribute)
///
/// A cell without a `t` attribute is [`CellKind::Unset`]; writers omit the
/// attribute for plain numbers, so `Unset` columns are treated as numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellKind {
    /// No type attribute
    #[default]
    Unset,
    /// `t="n"`
    Number,
    /// `t="b"`
    Boolean,
    /// `t="d"` (ISO 8601 text)
    Date,
    /// `t="e"`
    Error,
    /// `t="str"` (formula with a cached string result)
    Formula,
    /// `t="s"`
    SharedString,
    /// `t="inlineStr"`
    InlineString,
}

impl CellKind {
    /// Map an XLSX `t` attribute value to a kind
    ///
    /// Returns `None` for values outside the OOXML vocabulary.
    pub fn from_xlsx(t: &str) -> Option<Self> {
        match t {
            "" => Some(CellKind::Unset),
            "n" => Some(CellKind::Number),
            "b" => Some(CellKind::Boolean),
            "d" => Some(CellKind::Date),
            "e" => Some(CellKind::Error),
            "str" => Some(CellKind::Formula),
            "s" => Some(CellKind::SharedString),
            "inlineStr" => Some(CellKind::InlineString),
            _ => None,
        }
    }

    /// Whether values of this kind are parsed as numbers
    pub fn is_numeric(self) -> bool {
        matches!(self, CellKind::Number | CellKind::Unset)
    }
}

/// A typed cell value ready to be written to an output sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell (nothing is written)
    Empty,
    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl CellValue {
    /// Coerce raw cell text using the classification sampled for its column
    ///
    /// - empty text is [`CellValue::Empty`]
    /// - numeric or unclassified columns parse as `f64`, falling back to text
    /// - boolean columns map `"1"`/`"0"`, falling back to text
    /// - everything else stays text
    pub fn coerce(raw: &str, column_kind: CellKind) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        match column_kind {
            kind if kind.is_numeric() => match raw.parse::<f64>() {
                // NaN and infinities have no representation in a sheet cell
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::Text(raw.to_string()),
            },
            CellKind::Boolean => match raw {
                "1" => CellValue::Boolean(true),
                "0" => CellValue::Boolean(false),
                _ => CellValue::Text(raw.to_string()),
            },
            _ => CellValue::Text(raw.to_string()),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}
