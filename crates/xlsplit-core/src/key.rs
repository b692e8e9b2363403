//! Split keys and output naming
//!
//! Group keys, output directory names and output file names are all derived
//! from cell text through [`sanitize`], so they only ever contain ASCII
//! letters, digits, `_` and single spaces.

use std::fmt;

use lazy_regex::regex;

use crate::MAX_SHEET_NAME_LEN;

/// Key used when a value sanitizes to nothing
pub const BLANK_KEY: &str = "Blank";

/// Collapse every run of non-word characters to a single space and trim the ends
///
/// Word characters are ASCII letters, digits and `_`; accented and other
/// non-ASCII letters count as separators. The result may be empty; use
/// [`SplitKey::new`] to get the `"Blank"` substitution.
pub fn sanitize(value: &str) -> String {
    regex!(r"[^A-Za-z0-9_]+").replace_all(value, " ").trim().to_string()
}

/// A sanitized discriminator derived from cell text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitKey(String);

impl SplitKey {
    /// Sanitize a raw value into a key; empty results become [`BLANK_KEY`]
    pub fn new(raw: &str) -> Self {
        let sanitized = sanitize(raw);
        if sanitized.is_empty() {
            SplitKey(BLANK_KEY.to_string())
        } else {
            SplitKey(sanitized)
        }
    }

    /// The blank key
    pub fn blank() -> Self {
        SplitKey(BLANK_KEY.to_string())
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the blank key
    pub fn is_blank(&self) -> bool {
        self.0 == BLANK_KEY
    }
}

impl fmt::Display for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SplitKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Output sheet name: `<column>-<value>`, truncated to 31 characters
pub fn sheet_name(column: &SplitKey, value: &SplitKey) -> String {
    format!("{}-{}", column, value)
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}
