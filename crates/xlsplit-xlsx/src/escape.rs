//! Text escaping shared by the reader and writer
//!
//! Excel stores characters that XML 1.0 cannot carry as `_xHHHH_` sequences
//! (`_x000d_` for CR, `_x0001_` for SOH). A literal `_xHHHH_` in cell text is
//! protected by escaping its leading underscore as `_x005F_`.

/// Decode Excel's `_xHHHH_` escape sequences in strings
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match parse_escape(candidate) {
            Some(decoded) => {
                result.push(decoded);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Parse `_xHHHH_` at the start of `s`
fn parse_escape(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || bytes[6] != b'_' {
        return None;
    }
    let hex = &s[2..6];
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Encode text for an XML text node or attribute
///
/// Markup characters become entities; control characters other than tab,
/// LF and CR become `_xHHHH_` sequences.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            '_' if parse_escape(&s[i..]).is_some() => result.push_str("_x005F_"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {
                result.push_str(&format!("_x{:04X}_", c as u32));
            }
            c => result.push(c),
        }
    }

    result
}
