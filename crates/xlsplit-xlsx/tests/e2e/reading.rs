//! Reading sheets, rows and styles from assembled fixtures.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use xlsplit_core::{CellKind, DEFAULT_COLUMN_WIDTH};
use xlsplit_xlsx::{SheetRow, XlsxError, XlsxSource};

use crate::{Fixture, STYLES_XML};

fn open(fixture: &Fixture) -> XlsxSource<Cursor<Vec<u8>>> {
    XlsxSource::open(Cursor::new(fixture.build())).expect("fixture should open")
}

fn collect(source: &mut XlsxSource<Cursor<Vec<u8>>>, sheet: &str) -> Vec<SheetRow> {
    source
        .rows(sheet)
        .expect("sheet should exist")
        .collect::<Result<Vec<_>, _>>()
        .expect("rows should parse")
}

#[test]
fn test_sheet_names_in_workbook_order() {
    let fixture = Fixture::new()
        .sheet("Sales", "<sheetData/>")
        .sheet("Notes &amp; Ideas", "<sheetData/>")
        .sheet("Archive", "<sheetData/>");
    let source = open(&fixture);

    assert_eq!(
        source.sheet_names(),
        vec!["Sales", "Notes & Ideas", "Archive"]
    );
    assert!(source.has_sheet("Archive"));
    assert!(!source.has_sheet("archive"));
}

#[test]
fn test_shared_strings_and_types() {
    let fixture = Fixture::new()
        .shared_strings(&["Region", "Amount", "East"])
        .sheet(
            "Data",
            r#"<sheetData>
                <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
                <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2" s="1"><v>10.25</v></c><c r="C2" t="b"><v>0</v></c></row>
            </sheetData>"#,
        );
    let mut source = open(&fixture);
    assert_eq!(source.shared_string_count(), 3);

    let rows = collect(&mut source, "Data");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].texts(), vec!["Region", "Amount"]);
    assert_eq!(rows[1].texts(), vec!["East", "10.25", "0"]);
    assert_eq!(rows[1].cells[0].kind, CellKind::SharedString);
    assert_eq!(rows[1].cells[1].kind, CellKind::Unset);
    assert_eq!(rows[1].cells[1].style, 1);
    assert_eq!(rows[1].cells[2].kind, CellKind::Boolean);
}

#[test]
fn test_rich_text_and_phonetic_runs() {
    let fixture = Fixture::new()
        .shared_strings_xml(
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
                <si><r><rPr><b/></rPr><t>Nor</t></r><r><t>th</t></r></si>
                <si><t>東京</t><rPh sb="0" eb="2"><t>トウキョウ</t></rPh></si>
                <si/>
                <si><t>tab_x0009_here</t></si>
            </sst>"#,
        )
        .sheet(
            "Data",
            r#"<sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c><c r="D1" t="s"><v>3</v></c></row></sheetData>"#,
        );
    let mut source = open(&fixture);
    let rows = collect(&mut source, "Data");

    assert_eq!(rows[0].texts(), vec!["North", "東京", "", "tab\there"]);
}

#[test]
fn test_rows_stream_is_repeatable() {
    let fixture = Fixture::new().sheet(
        "Data",
        r#"<sheetData><row r="1"><c r="A1"><v>1</v></c></row><row r="3"><c r="A3"><v>3</v></c></row></sheetData>"#,
    );
    let mut source = open(&fixture);

    let first = collect(&mut source, "Data");
    let second = collect(&mut source, "Data");
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert!(first[1].cells.is_empty());
}

#[test]
fn test_column_layout_from_sheet() {
    let fixture = Fixture::new().sheet(
        "Data",
        r#"<cols><col min="1" max="1" width="30.7109375" customWidth="1"/><col min="2" max="3" style="2"/></cols>
           <sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>"#,
    );
    let mut source = open(&fixture);
    let mut rows = source.rows("Data").unwrap();
    rows.next().unwrap().unwrap();

    let layout = rows.columns();
    assert_eq!(layout.width(0).unwrap(), 30.7109375);
    assert_eq!(layout.width(1).unwrap(), DEFAULT_COLUMN_WIDTH);
    assert_eq!(layout.style(2), 2);
    assert_eq!(layout.style(3), 0);
}

#[test]
fn test_style_table_is_exposed() {
    let fixture = Fixture::new()
        .styles(STYLES_XML)
        .theme("<a:theme/>")
        .sheet("Data", "<sheetData/>");
    let source = open(&fixture);
    let styles = source.style_table();

    assert_eq!(styles.cell_xf_count(), 3);
    assert_eq!(styles.font_count(), 2);
    assert!(styles.contains(2));
    assert!(!styles.contains(3));
    assert_eq!(styles.theme(), Some("<a:theme/>"));
}

#[test]
fn test_missing_styles_fall_back_to_minimal_table() {
    let source = open(&Fixture::new().sheet("Data", "<sheetData/>"));
    assert_eq!(source.style_table().cell_xf_count(), 1);
    assert!(source.style_table().contains(0));
    assert!(!source.style_table().contains(1));
}

#[test]
fn test_unknown_sheet() {
    let mut source = open(&Fixture::new().sheet("Data", "<sheetData/>"));
    assert!(matches!(
        source.rows("Other"),
        Err(XlsxError::SheetNotFound(name)) if name == "Other"
    ));
}

#[test]
fn test_not_a_workbook() {
    assert!(XlsxSource::open(Cursor::new(b"plain text".to_vec())).is_err());

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    assert!(matches!(
        XlsxSource::open(Cursor::new(bytes)),
        Err(XlsxError::InvalidFormat(_))
    ));
}

#[test]
fn test_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.xlsx");
    std::fs::write(
        &path,
        Fixture::new()
            .sheet("Data", r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c></row></sheetData>"#)
            .build(),
    )
    .unwrap();

    let mut source = XlsxSource::open_file(&path).unwrap();
    let rows: Vec<_> = source.rows("Data").unwrap().map(Result::unwrap).collect();
    assert_eq!(rows[0].texts(), vec!["Name"]);
}
