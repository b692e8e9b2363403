//! XLSX style table (styles.xml) handling
//!
//! The style table of a source workbook is carried over to every output
//! workbook as-is, so cell style ids sampled from the source stay valid.
//! The only edit ever made is appending one font and one cell format for the
//! bold, centered header row.

use std::io::{Cursor, Write};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{XlsxError, XlsxResult};

/// Stylesheet used when the source workbook has no styles.xml
const MINIMAL_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

const HEADER_FONT: &str = r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#;

/// The complete style table of a workbook
///
/// Cloning is cheap; the XML is shared.
#[derive(Debug, Clone)]
pub struct StyleTable {
    xml: Arc<str>,
    theme: Option<Arc<str>>,
    font_count: u32,
    cell_xf_count: u32,
}

/// Result of appending the header format to a style table
#[derive(Debug)]
pub(crate) struct StylesWithHeader {
    pub(crate) xml: String,
    pub(crate) header_xf: u32,
}

impl StyleTable {
    /// Parse a styles.xml document
    pub fn parse(xml: String) -> XlsxResult<Self> {
        let (font_count, cell_xf_count) = count_tables(&xml)?;
        Ok(Self {
            xml: xml.into(),
            theme: None,
            font_count,
            cell_xf_count,
        })
    }

    /// A table with only the default cell format
    pub fn minimal() -> Self {
        Self {
            xml: MINIMAL_STYLES_XML.into(),
            theme: None,
            font_count: 1,
            cell_xf_count: 1,
        }
    }

    /// Attach the workbook theme the style table's colors refer to
    pub fn with_theme(mut self, theme: String) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Number of cell formats (`<cellXfs>` entries); valid style ids are `0..count`
    pub fn cell_xf_count(&self) -> u32 {
        self.cell_xf_count
    }

    /// Number of fonts in the table
    pub fn font_count(&self) -> u32 {
        self.font_count
    }

    /// Whether a cell style id refers to an entry of this table
    ///
    /// Id 0 is always accepted; it is the implicit default format.
    pub fn contains(&self, style_id: u32) -> bool {
        style_id == 0 || style_id < self.cell_xf_count
    }

    /// The styles.xml document
    pub fn as_xml(&self) -> &str {
        &self.xml
    }

    /// The theme document, if the source workbook had one
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Copy the table with a bold, centered cell format appended
    pub(crate) fn with_header_style(&self) -> XlsxResult<StylesWithHeader> {
        let header_font = self.font_count;
        let header_xf = self.cell_xf_count;
        let header_xf_xml = format!(
            r#"<xf numFmtId="0" fontId="{}" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="center"/></xf>"#,
            header_font
        );

        let mut reader = Reader::from_str(&self.xml);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut saw_fonts = false;
        let mut saw_cell_xfs = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if is_top_table(&stack, &name, b"fonts") {
                        saw_fonts = true;
                        writer.write_event(Event::Start(with_count(&e, header_font + 1)))?;
                    } else if is_top_table(&stack, &name, b"cellXfs") {
                        saw_cell_xfs = true;
                        writer.write_event(Event::Start(with_count(&e, header_xf + 1)))?;
                    } else {
                        writer.write_event(Event::Start(e))?;
                    }
                    stack.push(name);
                }
                Event::End(e) => {
                    let name = stack.pop().unwrap_or_default();
                    if stack.len() == 1 && name == b"fonts" {
                        writer.get_mut().write_all(HEADER_FONT.as_bytes())?;
                    } else if stack.len() == 1 && name == b"cellXfs" {
                        writer.get_mut().write_all(header_xf_xml.as_bytes())?;
                    }
                    writer.write_event(Event::End(e))?;
                }
                Event::Empty(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if is_top_table(&stack, &name, b"fonts") {
                        saw_fonts = true;
                        let start = with_count(&e, 1);
                        let end = start.to_end().into_owned();
                        writer.write_event(Event::Start(start))?;
                        writer.get_mut().write_all(HEADER_FONT.as_bytes())?;
                        writer.write_event(Event::End(end))?;
                    } else if is_top_table(&stack, &name, b"cellXfs") {
                        saw_cell_xfs = true;
                        let start = with_count(&e, 1);
                        let end = start.to_end().into_owned();
                        writer.write_event(Event::Start(start))?;
                        writer.get_mut().write_all(header_xf_xml.as_bytes())?;
                        writer.write_event(Event::End(end))?;
                    } else {
                        writer.write_event(Event::Empty(e))?;
                    }
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        if !saw_fonts || !saw_cell_xfs {
            return Err(XlsxError::InvalidFormat(
                "styles.xml lacks a <fonts> or <cellXfs> table".into(),
            ));
        }

        let xml = String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| XlsxError::Parse(format!("styles.xml is not UTF-8: {}", e)))?;

        Ok(StylesWithHeader { xml, header_xf })
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::minimal()
    }
}

/// Whether `name` opens a table directly under the `<styleSheet>` root
fn is_top_table(stack: &[Vec<u8>], name: &[u8], table: &[u8]) -> bool {
    stack.len() == 1 && name == table
}

/// Copy a start tag, replacing its `count` attribute
fn with_count(e: &BytesStart<'_>, count: u32) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut start = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"count" {
            continue;
        }
        start.push_attribute((attr.key.as_ref(), attr.value.as_ref()));
    }
    start.push_attribute(("count", count.to_string().as_str()));
    start
}

/// Count `<fonts>/<font>` and `<cellXfs>/<xf>` entries
fn count_tables(xml: &str) -> XlsxResult<(u32, u32)> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut fonts = 0u32;
    let mut cell_xfs = 0u32;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                count_entry(&stack, &name, &mut fonts, &mut cell_xfs);
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                count_entry(&stack, &name, &mut fonts, &mut cell_xfs);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((fonts, cell_xfs))
}

fn count_entry(stack: &[Vec<u8>], name: &[u8], fonts: &mut u32, cell_xfs: &mut u32) {
    if stack.len() != 2 {
        return;
    }
    match (stack[1].as_slice(), name) {
        (b"fonts", b"font") => *fonts += 1,
        (b"cellXfs", b"xf") => *cell_xfs += 1,
        _ => {}
    }
}
