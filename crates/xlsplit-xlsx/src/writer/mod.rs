//! XLSX writer
//!
//! Builds a single-sheet workbook from scratch. The source style table is
//! written back unchanged apart from the appended header format, so style ids
//! taken from the source workbook resolve to the same formats.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use xlsplit_core::{CellAddress, CellRange, CellValue, ColumnFormat, MAX_SHEET_NAME_LEN};

use crate::error::{XlsxError, XlsxResult};
use crate::escape::escape_xml;
use crate::styles::StyleTable;

/// Characters Excel rejects in sheet names
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// One value to write, with the style id it should carry
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCell {
    /// Typed value
    pub value: CellValue,
    /// Style id into the copied style table
    pub style: u32,
}

impl OutputCell {
    /// Create an output cell
    pub fn new(value: impl Into<CellValue>, style: u32) -> Self {
        Self {
            value: value.into(),
            style,
        }
    }
}

/// An output workbook with exactly one worksheet
#[derive(Debug, Clone)]
pub struct OutputWorkbook {
    sheet_name: String,
    styles: StyleTable,
    header: Vec<String>,
    header_style: bool,
    rows: Vec<Vec<OutputCell>>,
    columns: Vec<ColumnFormat>,
    auto_filter: Option<CellRange>,
    frozen_rows: u32,
}

impl OutputWorkbook {
    /// Create an empty workbook whose sheet uses `styles`
    pub fn new(sheet_name: impl Into<String>, styles: StyleTable) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            styles,
            header: Vec::new(),
            header_style: false,
            rows: Vec::new(),
            columns: Vec::new(),
            auto_filter: None,
            frozen_rows: 0,
        }
    }

    /// Name of the only sheet
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Set the text of row 1
    pub fn set_header<I, S>(&mut self, header: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = header.into_iter().map(Into::into).collect();
    }

    /// Header row text
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Give row 1 a bold, centered format
    pub fn set_header_style(&mut self, enabled: bool) {
        self.header_style = enabled;
    }

    /// Append a data row below the header and any earlier rows
    pub fn push_row(&mut self, row: Vec<OutputCell>) {
        self.rows.push(row);
    }

    /// Number of data rows (excluding the header)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Vec<OutputCell>] {
        &self.rows
    }

    /// Set the width and style of one column, replacing an earlier setting
    pub fn set_column_format(&mut self, format: ColumnFormat) {
        match self.columns.iter_mut().find(|c| c.index == format.index) {
            Some(existing) => *existing = format,
            None => {
                self.columns.push(format);
                self.columns.sort_by_key(|c| c.index);
            }
        }
    }

    /// Column formats, ordered by column
    pub fn column_formats(&self) -> &[ColumnFormat] {
        &self.columns
    }

    /// Enable an autofilter over `range`
    pub fn set_auto_filter(&mut self, range: CellRange) {
        self.auto_filter = Some(range);
    }

    /// Autofilter range, if any
    pub fn auto_filter(&self) -> Option<CellRange> {
        self.auto_filter
    }

    /// Freeze the top `rows` rows (0 unfreezes)
    pub fn freeze_rows(&mut self, rows: u32) {
        self.frozen_rows = rows;
    }

    /// Range from A1 to the last header column of the last row
    ///
    /// `None` when there is no header.
    pub fn data_range(&self) -> Option<CellRange> {
        if self.header.is_empty() {
            return None;
        }
        let last_col = (self.header.len() - 1) as u16;
        let last_row = self.rows.len() as u32;
        Some(CellRange::from_indices(0, 0, last_row, last_col))
    }

    /// Write the workbook to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        XlsxWriter::write_file(self, path)
    }

    fn used_range(&self) -> CellRange {
        let width = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
            .max(1);
        CellRange::from_indices(0, 0, self.rows.len() as u32, (width - 1) as u16)
    }

    fn validate(&self) -> XlsxResult<()> {
        let name = &self.sheet_name;
        if name.trim().is_empty() {
            return Err(XlsxError::InvalidFormat("sheet name is empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(XlsxError::InvalidFormat(format!(
                "sheet name '{}' is longer than {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }
        if name.contains(INVALID_SHEET_CHARS) {
            return Err(XlsxError::InvalidFormat(format!(
                "sheet name '{}' contains a character Excel does not allow",
                name
            )));
        }
        Ok(())
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &OutputWorkbook, path: P) -> XlsxResult<()> {
        workbook.validate()?;
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        Self::write(workbook, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &OutputWorkbook, writer: W) -> XlsxResult<()> {
        workbook.validate()?;

        let (styles_xml, header_xf) = if workbook.header_style {
            let styles = workbook.styles.with_header_style()?;
            (styles.xml, Some(styles.header_xf))
        } else {
            (workbook.styles.as_xml().to_string(), None)
        };
        let theme = workbook.styles.theme();

        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip, theme.is_some())?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, theme.is_some())?;
        Self::write_part(&mut zip, "xl/styles.xml", &styles_xml)?;
        if let Some(theme) = theme {
            Self::write_part(&mut zip, "xl/theme/theme1.xml", theme)?;
        }
        Self::write_worksheet(&mut zip, workbook, header_xf)?;

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        with_theme: bool,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        );

        if with_theme {
            content.push_str(
                r#"
    <Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            );
        }

        content.push_str("\n</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
        Self::write_part(zip, "_rels/.rels", content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &OutputWorkbook,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="0"/>
    </bookViews>
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>"#,
            escape_xml(&workbook.sheet_name)
        );

        if let Some(range) = workbook.auto_filter {
            // Excel expects the filter range as a hidden sheet-local name
            content.push_str(&format!(
                r#"
    <definedNames>
        <definedName name="_xlnm._FilterDatabase" localSheetId="0" hidden="1">{}</definedName>
    </definedNames>"#,
                escape_xml(&format!(
                    "'{}'!{}",
                    workbook.sheet_name.replace('\'', "''"),
                    range.to_absolute()
                ))
            ));
        }

        content.push_str("\n</workbook>");
        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        with_theme: bool,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );

        if with_theme {
            content.push_str(
                r#"
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#,
            );
        }

        content.push_str("\n</Relationships>");
        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &OutputWorkbook,
        header_xf: Option<u32>,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <dimension ref="{}"/>"#,
            workbook.used_range()
        );

        Self::write_sheet_views(&mut content, workbook.frozen_rows);
        content.push_str("\n    <sheetFormatPr defaultRowHeight=\"15\"/>");
        Self::write_cols(&mut content, &workbook.columns);

        content.push_str("\n    <sheetData>");
        if !workbook.header.is_empty() {
            Self::write_header_row(&mut content, &workbook.header, header_xf);
        }
        for (i, row) in workbook.rows.iter().enumerate() {
            Self::write_data_row(&mut content, i as u32 + 1, row);
        }
        content.push_str("\n    </sheetData>");

        if let Some(range) = workbook.auto_filter {
            content.push_str(&format!("\n    <autoFilter ref=\"{}\"/>", range));
        }

        content.push_str(
            "\n    <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
        );
        content.push_str("\n</worksheet>");

        Self::write_part(zip, "xl/worksheets/sheet1.xml", &content)
    }

    fn write_sheet_views(content: &mut String, frozen_rows: u32) {
        if frozen_rows == 0 {
            content.push_str(
                r#"
    <sheetViews>
        <sheetView tabSelected="1" workbookViewId="0"/>
    </sheetViews>"#,
            );
            return;
        }

        let top_left = CellAddress::new(frozen_rows, 0);
        content.push_str(&format!(
            r#"
    <sheetViews>
        <sheetView tabSelected="1" workbookViewId="0">
            <pane ySplit="{rows}" topLeftCell="{cell}" activePane="bottomLeft" state="frozen"/>
            <selection pane="bottomLeft" activeCell="{cell}" sqref="{cell}"/>
        </sheetView>
    </sheetViews>"#,
            rows = frozen_rows,
            cell = top_left
        ));
    }

    fn write_cols(content: &mut String, columns: &[ColumnFormat]) {
        if columns.is_empty() {
            return;
        }

        content.push_str("\n    <cols>");
        for column in columns {
            let style_attr = if column.style_id != 0 {
                format!(" style=\"{}\"", column.style_id)
            } else {
                String::new()
            };
            content.push_str(&format!(
                "\n        <col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"{2}/>",
                column.index as u32 + 1,
                column.width,
                style_attr
            ));
        }
        content.push_str("\n    </cols>");
    }

    fn write_header_row(content: &mut String, header: &[String], header_xf: Option<u32>) {
        let style_attr = header_xf
            .map(|xf| format!(" s=\"{}\"", xf))
            .unwrap_or_default();

        match header_xf {
            Some(xf) => content.push_str(&format!(
                "\n        <row r=\"1\" s=\"{}\" customFormat=\"1\">",
                xf
            )),
            None => content.push_str("\n        <row r=\"1\">"),
        }

        for (col, text) in header.iter().enumerate() {
            let cell_ref = CellAddress::new(0, col as u16);
            if text.is_empty() {
                if header_xf.is_some() {
                    content.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
                }
                continue;
            }
            content.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                cell_ref,
                style_attr,
                escape_xml(text)
            ));
        }

        content.push_str("\n        </row>");
    }

    fn write_data_row(content: &mut String, row: u32, cells: &[OutputCell]) {
        content.push_str(&format!("\n        <row r=\"{}\">", row + 1));

        for (col, cell) in cells.iter().enumerate() {
            let cell_ref = CellAddress::new(row, col as u16);
            let style_attr = if cell.style != 0 {
                format!(" s=\"{}\"", cell.style)
            } else {
                String::new()
            };

            match &cell.value {
                CellValue::Number(n) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{}><v>{}</v></c>",
                        cell_ref, style_attr, n
                    ));
                }
                CellValue::Text(s) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                        cell_ref,
                        style_attr,
                        escape_xml(s)
                    ));
                }
                CellValue::Boolean(b) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                        cell_ref,
                        style_attr,
                        if *b { 1 } else { 0 }
                    ));
                }
                CellValue::Empty => {
                    // Keep the column format on blank cells
                    if cell.style != 0 {
                        content.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
                    }
                }
            }
        }

        content.push_str("\n        </row>");
    }
}
