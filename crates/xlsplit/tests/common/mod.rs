//! Source workbooks for split tests, written with the crate's own writer.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use xlsplit::{CellValue, Splitter};
use xlsplit_core::{CellKind, ColumnFormat};
use xlsplit_xlsx::{OutputCell, OutputWorkbook, SheetRow, StyleTable, XlsxSource, XlsxWriter};
use zip::write::SimpleFileOptions;

/// Three cell formats: default, `0.00` number format, italic font
pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="0.00"/></numFmts>
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><i/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

/// Builder for a single-sheet source workbook
pub struct Source {
    workbook: OutputWorkbook,
}

impl Source {
    pub fn new(sheet: &str) -> Self {
        let styles = StyleTable::parse(STYLES_XML.to_string()).unwrap();
        Self {
            workbook: OutputWorkbook::new(sheet, styles),
        }
    }

    pub fn header(mut self, header: &[&str]) -> Self {
        self.workbook.set_header(header.iter().copied());
        self
    }

    /// Append a row of unstyled values
    pub fn row(mut self, values: Vec<CellValue>) -> Self {
        self.workbook
            .push_row(values.into_iter().map(|v| OutputCell::new(v, 0)).collect());
        self
    }

    /// Append a row of styled cells
    pub fn styled_row(mut self, cells: Vec<OutputCell>) -> Self {
        self.workbook.push_row(cells);
        self
    }

    pub fn column(mut self, format: ColumnFormat) -> Self {
        self.workbook.set_column_format(format);
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        XlsxWriter::write(&self.workbook, &mut cursor).unwrap();
        cursor.into_inner()
    }

    pub fn splitter(&self) -> Splitter<Cursor<Vec<u8>>> {
        Splitter::open(Cursor::new(self.bytes())).unwrap()
    }
}

pub fn text(s: &str) -> CellValue {
    CellValue::from(s)
}

pub fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

/// The `Region`/`Amount` sheet used throughout the tests
pub fn regions() -> Source {
    Source::new("Data")
        .header(&["Region", "Amount"])
        .row(vec![text("East"), num(10.0)])
        .row(vec![text("West"), num(20.0)])
        .row(vec![text("East"), num(30.0)])
}

/// All rows of the only sheet of an output file
pub fn read_output(path: &Path) -> (String, Vec<SheetRow>) {
    let mut source = XlsxSource::open_file(path).unwrap();
    let sheet = source.sheet_names().remove(0);
    let rows = source
        .rows(&sheet)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    (sheet, rows)
}

/// Typed values of a read-back row, using the stored cell kinds
pub fn typed(row: &SheetRow) -> Vec<CellValue> {
    row.cells
        .iter()
        .map(|c| {
            let kind = match c.kind {
                CellKind::InlineString | CellKind::SharedString => CellKind::InlineString,
                other => other,
            };
            CellValue::coerce(&c.value, kind)
        })
        .collect()
}

/// A single-sheet workbook assembled from raw worksheet XML
///
/// For sources the writer never produces: shared strings, broken cells,
/// malformed column declarations.
pub fn raw_source(sheet: &str, shared_strings: &[&str], sheet_body: &str) -> Splitter<Cursor<Vec<u8>>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut put = |name: &str, content: String| {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };

    put(
        "[Content_Types].xml",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.to_string(),
    );
    put(
        "xl/workbook.xml",
        format!(
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            sheet
        ),
    );
    put(
        "xl/_rels/workbook.xml.rels",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
    );
    let items: String = shared_strings
        .iter()
        .map(|s| format!("<si><t>{}</t></si>", s))
        .collect();
    put(
        "xl/sharedStrings.xml",
        format!(
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</sst>"#,
            items
        ),
    );
    put("xl/styles.xml", STYLES_XML.to_string());
    put(
        "xl/worksheets/sheet1.xml",
        format!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</worksheet>"#,
            sheet_body
        ),
    );

    let bytes = zip.finish().unwrap().into_inner();
    Splitter::open(Cursor::new(bytes)).unwrap()
}
