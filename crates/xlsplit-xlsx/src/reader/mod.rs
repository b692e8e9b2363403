//! XLSX reader
//!
//! [`XlsxSource`] keeps the container open and hands out one forward-only
//! [`RowStream`] per request. Shared strings and the style table are read
//! eagerly when the source is opened; worksheet XML is only ever streamed.

mod rows;

pub use rows::{ColumnLayout, RawCell, RowStream, SheetRow};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::styles::StyleTable;

/// A worksheet entry from workbook.xml
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    path: String,
}

/// An open XLSX workbook
pub struct XlsxSource<R> {
    archive: zip::ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    shared_strings: Vec<String>,
    styles: StyleTable,
}

impl XlsxSource<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxSource<R> {
    /// Open a workbook from a reader
    pub fn open(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;

        let sheets = Self::read_sheet_index(&mut archive)?;

        Ok(Self {
            archive,
            sheets,
            shared_strings,
            styles,
        })
    }

    /// Names of all worksheets, in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Whether a worksheet with this name exists
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// The workbook's style table
    pub fn style_table(&self) -> &StyleTable {
        &self.styles
    }

    /// Number of entries in the shared string table
    pub fn shared_string_count(&self) -> usize {
        self.shared_strings.len()
    }

    /// Start streaming the rows of a worksheet
    ///
    /// The stream is lazy and single-pass; call again for a fresh pass.
    pub fn rows(&mut self, sheet: &str) -> XlsxResult<RowStream<'_, impl BufRead + '_>> {
        let path = self
            .sheets
            .iter()
            .find(|s| s.name == sheet)
            .map(|s| s.path.clone())
            .ok_or_else(|| XlsxError::SheetNotFound(sheet.to_string()))?;

        let file = self
            .archive
            .by_name(&path)
            .map_err(|_| XlsxError::MissingPart(path.clone()))?;

        Ok(RowStream::new(BufReader::new(file), &self.shared_strings))
    }

    /// Read the shared strings table
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) carry reading hints, not cell text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles(archive: &mut zip::ZipArchive<R>) -> XlsxResult<StyleTable> {
        let styles = match read_part(archive, "xl/styles.xml")? {
            Some(xml) => StyleTable::parse(xml)?,
            None => {
                log::debug!("workbook has no styles.xml, using the default style table");
                StyleTable::minimal()
            }
        };

        Ok(match read_part(archive, "xl/theme/theme1.xml")? {
            Some(theme) => styles.with_theme(theme),
            None => styles,
        })
    }

    /// Worksheets listed in workbook.xml, resolved to their part paths
    ///
    /// Sheets whose `r:id` does not point at a worksheet relationship
    /// (chartsheets, dialog sheets, dangling ids) are left out.
    fn read_sheet_index(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<SheetEntry>> {
        let mut worksheet_parts = HashMap::new();
        for_each_element(archive, "xl/_rels/workbook.xml.rels", b"Relationship", |attrs| {
            let (Some(id), Some(target), Some(kind)) = (
                attr(attrs, b"Id"),
                attr(attrs, b"Target"),
                attr(attrs, b"Type"),
            ) else {
                return;
            };
            if kind.ends_with("/worksheet") {
                worksheet_parts.insert(id.to_string(), part_path(target));
            }
        })?;

        let mut sheets = Vec::new();
        for_each_element(archive, "xl/workbook.xml", b"sheet", |attrs| {
            let Some(name) = attr(attrs, b"name") else {
                return;
            };
            // The relationship prefix is conventionally `r` but not fixed
            let Some(r_id) = attrs
                .iter()
                .find(|(key, _)| key.ends_with(b":id"))
                .map(|(_, value)| value.as_str())
            else {
                log::warn!("sheet '{}' has no relationship id", name);
                return;
            };
            match worksheet_parts.get(r_id) {
                Some(path) => sheets.push(SheetEntry {
                    name: name.to_string(),
                    path: path.clone(),
                }),
                None => log::warn!("sheet '{}' has no worksheet relationship ({})", name, r_id),
            }
        })?;

        Ok(sheets)
    }
}

/// Attributes of one element, as (qualified key, unescaped value)
type Attributes = [(Vec<u8>, String)];

fn attr<'a>(attrs: &'a Attributes, key: &[u8]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_slice() == key)
        .map(|(_, value)| value.as_str())
}

/// Relationship targets are relative to `xl/` unless rooted
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Call `visit` with the attributes of every `tag` element in a required part
fn for_each_element<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    part: &str,
    tag: &[u8],
    mut visit: impl FnMut(&Attributes),
) -> XlsxResult<()> {
    let file = archive
        .by_name(part)
        .map_err(|_| XlsxError::MissingPart(part.to_string()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut attrs = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == tag => {
                attrs.clear();
                for a in e.attributes().flatten() {
                    if let Ok(value) = a.unescape_value() {
                        attrs.push((a.key.as_ref().to_vec(), value.into_owned()));
                    }
                }
                visit(&attrs);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Read an optional UTF-8 part from the archive
fn read_part<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> XlsxResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}
