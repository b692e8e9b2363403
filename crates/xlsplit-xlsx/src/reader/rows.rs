//! Forward-only worksheet row stream

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use xlsplit_core::{CellAddress, CellKind, DEFAULT_COLUMN_WIDTH, MAX_ROWS};

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;

/// One cell as stored in the source sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Raw text (shared strings resolved, booleans as `"1"`/`"0"`)
    pub value: String,
    /// Storage kind from the `t` attribute
    pub kind: CellKind,
    /// Style id from the `s` attribute (0 when absent)
    pub style: u32,
}

/// One worksheet row; cells are dense up to the last cell present in the XML
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// Row number (1-based)
    pub number: u32,
    /// Cells by column index; gaps are default cells
    pub cells: Vec<RawCell>,
}

impl SheetRow {
    fn empty(number: u32) -> Self {
        Self {
            number,
            cells: Vec::new(),
        }
    }

    /// Raw text of a cell; empty for columns past the end of the row
    pub fn text(&self, col: usize) -> &str {
        self.cells.get(col).map_or("", |c| c.value.as_str())
    }

    /// Raw text of every cell
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.value.clone()).collect()
    }

    fn set(&mut self, col: usize, cell: RawCell) {
        if self.cells.len() <= col {
            self.cells.resize_with(col + 1, RawCell::default);
        }
        self.cells[col] = cell;
    }
}

/// A `<col>` entry; `min`/`max` are 1-based and inclusive
#[derive(Debug, Clone)]
struct ColumnSpec {
    min: u32,
    max: u32,
    width: Option<String>,
    style: Option<u32>,
}

/// Column metadata declared ahead of the sheet data
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    specs: Vec<ColumnSpec>,
    default_width: Option<f64>,
}

impl ColumnLayout {
    fn spec(&self, col: u16) -> Option<&ColumnSpec> {
        let col = col as u32 + 1;
        self.specs.iter().find(|s| s.min <= col && col <= s.max)
    }

    /// Width of a column (0-based)
    ///
    /// Falls back to the sheet default width, then to [`DEFAULT_COLUMN_WIDTH`].
    /// Fails if the declared width is not a number.
    pub fn width(&self, col: u16) -> XlsxResult<f64> {
        match self.spec(col).and_then(|s| s.width.as_deref()) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .ok_or_else(|| {
                    XlsxError::Parse(format!(
                        "invalid width '{}' for column {}",
                        raw,
                        CellAddress::column_to_letters(col)
                    ))
                }),
            None => Ok(self.default_width.unwrap_or(DEFAULT_COLUMN_WIDTH)),
        }
    }

    /// Column-level style id of a column (0-based), 0 when none is declared
    pub fn style(&self, col: u16) -> u32 {
        self.spec(col).and_then(|s| s.style).unwrap_or(0)
    }
}

/// Cell being assembled from `<c>` children
#[derive(Debug, Default)]
struct PendingCell {
    col: Option<usize>,
    kind: CellKind,
    style: u32,
    value: String,
}

/// Lazy, single-pass stream of worksheet rows
///
/// Row numbers missing from the XML are yielded as empty rows, so the
/// n-th item is always sheet row n. Column metadata becomes available
/// through [`RowStream::columns`] once the first row has been read.
pub struct RowStream<'a, B: BufRead> {
    xml: Reader<B>,
    buf: Vec<u8>,
    shared_strings: &'a [String],
    columns: ColumnLayout,
    next_number: u32,
    pending: Option<SheetRow>,
    done: bool,
}

impl<'a, B: BufRead> RowStream<'a, B> {
    pub(crate) fn new(reader: B, shared_strings: &'a [String]) -> Self {
        Self {
            xml: Reader::from_reader(reader),
            buf: Vec::new(),
            shared_strings,
            columns: ColumnLayout::default(),
            next_number: 1,
            pending: None,
            done: false,
        }
    }

    /// Column widths and styles declared by the sheet
    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    /// Parse XML up to the end of the next `<row>`
    fn read_row(&mut self) -> XlsxResult<Option<SheetRow>> {
        let mut row: Option<SheetRow> = None;
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => row = Some(SheetRow::empty(row_number(&e, self.next_number)?)),
                    b"c" => {
                        let current = row.get_or_insert_with(|| SheetRow::empty(self.next_number));
                        cell = Some(parse_cell_start(&e, current)?);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if cell.is_some() && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" => return Ok(Some(SheetRow::empty(row_number(&e, self.next_number)?))),
                    b"c" => {
                        let current = row.get_or_insert_with(|| SheetRow::empty(self.next_number));
                        let pending = parse_cell_start(&e, current)?;
                        finish_cell(self.shared_strings, current, pending)?;
                    }
                    b"col" => self.columns.specs.push(parse_col(&e)?),
                    b"sheetFormatPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"defaultColWidth" {
                                self.columns.default_width = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<f64>().ok());
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(e) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        pending.value.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        pending.value.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"rPh" => in_phonetic = false,
                    b"c" => {
                        if let (Some(current), Some(pending)) = (row.as_mut(), cell.take()) {
                            finish_cell(self.shared_strings, current, pending)?;
                        }
                    }
                    b"row" => return Ok(row),
                    b"sheetData" => return Ok(row),
                    _ => {}
                },
                Event::Eof => return Ok(row),
                _ => {}
            }
        }
    }
}

impl<'a, B: BufRead> Iterator for RowStream<'a, B> {
    type Item = XlsxResult<SheetRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_none() && !self.done {
            match self.read_row() {
                Ok(Some(row)) => self.pending = Some(row),
                Ok(None) => self.done = true,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let row = self.pending.take()?;
        if row.number > self.next_number {
            // Fill the gap before handing out the row that was read ahead
            let filler = SheetRow::empty(self.next_number);
            self.pending = Some(row);
            self.next_number += 1;
            return Some(Ok(filler));
        }
        if row.number < self.next_number {
            log::warn!(
                "row {} appears out of order (expected {})",
                row.number,
                self.next_number
            );
        }

        self.next_number = self.next_number.max(row.number.saturating_add(1));
        Some(Ok(row))
    }
}

fn row_number(e: &BytesStart<'_>, next_number: u32) -> XlsxResult<u32> {
    let mut number = next_number;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"r" {
            let value = attr.unescape_value()?;
            number = value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| XlsxError::Parse(format!("invalid row number '{}'", value)))?;
        }
    }

    if number > MAX_ROWS {
        return Err(XlsxError::Parse(format!(
            "row number {} is beyond the last sheet row ({})",
            number, MAX_ROWS
        )));
    }
    Ok(number)
}

/// Resolve the raw text of a finished cell and store it in the row
fn finish_cell(
    shared_strings: &[String],
    row: &mut SheetRow,
    pending: PendingCell,
) -> XlsxResult<()> {
    let value = match pending.kind {
        CellKind::SharedString => {
            let index = pending.value.trim();
            if index.is_empty() {
                String::new()
            } else {
                index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| shared_strings.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        XlsxError::Parse(format!("invalid shared string index '{}'", index))
                    })?
            }
        }
        CellKind::InlineString => decode_excel_escapes(&pending.value),
        _ => pending.value,
    };

    let col = pending.col.unwrap_or(row.cells.len());
    row.set(
        col,
        RawCell {
            value,
            kind: pending.kind,
            style: pending.style,
        },
    );
    Ok(())
}

fn parse_cell_start(e: &BytesStart<'_>, row: &SheetRow) -> XlsxResult<PendingCell> {
    let mut pending = PendingCell::default();

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                let reference = attr.unescape_value()?;
                match CellAddress::parse(&reference) {
                    Ok(addr) => pending.col = Some(addr.col as usize),
                    Err(err) => {
                        log::warn!("ignoring cell reference '{}' in row {}: {}", reference, row.number, err);
                    }
                }
            }
            b"t" => {
                let t = attr.unescape_value()?;
                pending.kind = CellKind::from_xlsx(&t).unwrap_or_else(|| {
                    log::warn!("unknown cell type '{}' in row {}", t, row.number);
                    CellKind::Unset
                });
            }
            b"s" => {
                let s = attr.unescape_value()?;
                pending.style = s.trim().parse::<u32>().map_err(|_| {
                    XlsxError::Parse(format!("invalid style id '{}' in row {}", s, row.number))
                })?;
            }
            _ => {}
        }
    }

    Ok(pending)
}

fn parse_col(e: &BytesStart<'_>) -> XlsxResult<ColumnSpec> {
    let mut min = None;
    let mut max = None;
    let mut width = None;
    let mut style = None;

    for attr in e.attributes().flatten() {
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"min" => min = value.parse::<u32>().ok(),
            b"max" => max = value.parse::<u32>().ok(),
            b"width" => width = Some(value.to_string()),
            b"style" => style = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    match (min, max) {
        (Some(min), Some(max)) if min >= 1 && min <= max => Ok(ColumnSpec {
            min,
            max,
            width,
            style,
        }),
        _ => Err(XlsxError::Parse("invalid <col> range".into())),
    }
}
