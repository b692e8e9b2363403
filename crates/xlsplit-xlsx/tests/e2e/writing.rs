//! Writing output workbooks and reading them back.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use xlsplit_core::{CellKind, CellValue, ColumnFormat};
use xlsplit_xlsx::{OutputCell, OutputWorkbook, StyleTable, XlsxSource, XlsxWriter};

use crate::{read_part, STYLES_XML};

fn styles() -> StyleTable {
    StyleTable::parse(STYLES_XML.to_string()).unwrap()
}

fn sample() -> OutputWorkbook {
    let mut workbook = OutputWorkbook::new("Region-East", styles());
    workbook.set_header(["Region", "Amount", "Paid"]);
    workbook.push_row(vec![
        OutputCell::new("East", 0),
        OutputCell::new(10.0, 1),
        OutputCell::new(true, 0),
    ]);
    workbook.push_row(vec![
        OutputCell::new("East", 0),
        OutputCell::new(CellValue::Empty, 1),
        OutputCell::new(false, 0),
    ]);
    workbook.set_column_format(ColumnFormat::new(0, 2, 18.0));
    workbook.set_column_format(ColumnFormat::new(1, 1, 12.0));
    workbook.set_header_style(true);
    if let Some(range) = workbook.data_range() {
        workbook.set_auto_filter(range);
    }
    workbook.freeze_rows(1);
    workbook
}

fn write(workbook: &OutputWorkbook) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    XlsxWriter::write(workbook, &mut cursor).unwrap();
    cursor.into_inner()
}

#[test]
fn test_written_workbook_reads_back() {
    let bytes = write(&sample());
    let mut source = XlsxSource::open(Cursor::new(bytes)).unwrap();
    assert_eq!(source.sheet_names(), vec!["Region-East"]);

    let mut rows = source.rows("Region-East").unwrap();
    let header = rows.next().unwrap().unwrap();
    assert_eq!(header.texts(), vec!["Region", "Amount", "Paid"]);
    assert!(header.cells.iter().all(|c| c.style == 3));

    let first = rows.next().unwrap().unwrap();
    assert_eq!(first.texts(), vec!["East", "10", "1"]);
    assert_eq!(first.cells[0].kind, CellKind::InlineString);
    assert_eq!(first.cells[1].kind, CellKind::Unset);
    assert_eq!(first.cells[1].style, 1);
    assert_eq!(first.cells[2].kind, CellKind::Boolean);

    let second = rows.next().unwrap().unwrap();
    assert_eq!(second.texts(), vec!["East", "", "0"]);
    assert_eq!(second.cells[1].style, 1);
    assert!(rows.next().is_none());

    let layout = rows.columns();
    assert_eq!(layout.width(0).unwrap(), 18.0);
    assert_eq!(layout.style(0), 2);
    assert_eq!(layout.style(1), 1);
}

#[test]
fn test_style_table_is_copied_with_header_format() {
    let bytes = write(&sample());
    let source = XlsxSource::open(Cursor::new(bytes.clone())).unwrap();
    let copied = source.style_table();

    assert_eq!(copied.cell_xf_count(), 4);
    assert_eq!(copied.font_count(), 3);

    let xml = read_part(&bytes, "xl/styles.xml");
    assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.00"/>"#));
    assert!(xml.contains(r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#));
    assert!(xml.contains(
        r#"<xf numFmtId="0" fontId="2" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="center"/></xf></cellXfs>"#
    ));
}

#[test]
fn test_filter_and_frozen_pane() {
    let bytes = write(&sample());

    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<autoFilter ref="A1:C3"/>"#));
    assert!(sheet.contains(r#"topLeftCell="A2" activePane="bottomLeft" state="frozen""#));

    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="_xlnm._FilterDatabase" localSheetId="0" hidden="1""#));
    assert!(workbook.contains("$A$1:$C$3"));
}

#[test]
fn test_save_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    sample().save(&path).unwrap();

    let mut source = XlsxSource::open_file(&path).unwrap();
    assert_eq!(source.rows("Region-East").unwrap().count(), 3);
}

#[test]
fn test_control_characters_round_trip() {
    let mut workbook = OutputWorkbook::new("Text", StyleTable::minimal());
    workbook.set_header(["Note"]);
    workbook.push_row(vec![OutputCell::new("bell\u{7} and _x0041_", 0)]);

    let mut source = XlsxSource::open(Cursor::new(write(&workbook))).unwrap();
    let rows: Vec<_> = source.rows("Text").unwrap().map(Result::unwrap).collect();
    assert_eq!(rows[1].texts(), vec!["bell\u{7} and _x0041_"]);
}
