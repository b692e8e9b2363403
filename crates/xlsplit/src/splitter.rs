//! The split engine

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;
use std::time::Instant;

use xlsplit_core::{
    sheet_name, CellAddress, CellKind, CellValue, ColumnFormat, SplitKey, MAX_COLS,
};
use xlsplit_xlsx::{
    ColumnLayout, OutputCell, OutputWorkbook, SheetRow, StyleTable, XlsxError, XlsxSource,
};

use crate::error::{SplitError, SplitResult};
use crate::options::{FailurePolicy, SplitOptions};
use crate::progress::{ProgressEvent, ProgressRegistry};
use crate::report::{GroupOutput, SplitReport};

/// Kind and output format of one column, taken from the first data row
#[derive(Debug, Clone, Copy)]
struct ColumnSample {
    kind: CellKind,
    format: ColumnFormat,
}

#[derive(Debug)]
struct Group {
    key: SplitKey,
    rows: Vec<Vec<CellValue>>,
}

/// A sheet read and grouped in memory
#[derive(Debug)]
struct Partition {
    header: Vec<String>,
    column: SplitKey,
    samples: Vec<ColumnSample>,
    groups: Vec<Group>,
    rows: usize,
}

/// Splits sheets of one open workbook
///
/// # Example
///
/// ```rust,no_run
/// use xlsplit::{SplitOptions, Splitter};
///
/// let mut splitter = Splitter::open_file("sales.xlsx")?
///     .with_options(SplitOptions::default().output_root("out"));
/// splitter.register_observer("log", |status| eprintln!("{}", status));
///
/// let columns = splitter.columns("Data")?;
/// let region = columns.iter().position(|c| c == "Region").unwrap_or(0);
/// let report = splitter.split_by_column("Data", region)?;
/// for path in report.paths() {
///     println!("{}", path.display());
/// }
/// # Ok::<(), xlsplit::SplitError>(())
/// ```
pub struct Splitter<R> {
    source: XlsxSource<R>,
    options: SplitOptions,
    progress: ProgressRegistry,
}

impl Splitter<BufReader<File>> {
    /// Open a workbook file
    pub fn open_file<P: AsRef<Path>>(path: P) -> SplitResult<Self> {
        let source = XlsxSource::open_file(path).map_err(SplitError::Load)?;
        Ok(Self::from_source(source))
    }
}

impl<R: Read + Seek> Splitter<R> {
    /// Open a workbook from any seekable byte source
    pub fn open(reader: R) -> SplitResult<Self> {
        let source = XlsxSource::open(reader).map_err(SplitError::Load)?;
        Ok(Self::from_source(source))
    }

    fn from_source(source: XlsxSource<R>) -> Self {
        Self {
            source,
            options: SplitOptions::default(),
            progress: ProgressRegistry::default(),
        }
    }

    /// Replace the split options
    pub fn with_options(mut self, options: SplitOptions) -> Self {
        self.options = options;
        self
    }

    /// Current split options
    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Sheet names in workbook order
    pub fn sheets(&self) -> Vec<String> {
        self.source.sheet_names()
    }

    /// Header row of a sheet, verbatim
    ///
    /// Fails with [`SplitError::NoData`] unless the sheet has a header row
    /// followed by at least one more row.
    pub fn columns(&mut self, sheet: &str) -> SplitResult<Vec<String>> {
        let mut rows = self
            .source
            .rows(sheet)
            .map_err(SplitError::from_sheet_open)?;

        let header = match rows.next() {
            None => return Err(SplitError::NoData(sheet.to_string())),
            Some(Err(source)) => return Err(SplitError::RowRead { row: 1, source }),
            Some(Ok(row)) => row,
        };
        match rows.next() {
            None => Err(SplitError::NoData(sheet.to_string())),
            Some(Err(source)) => Err(SplitError::RowRead { row: 2, source }),
            Some(Ok(_)) => Ok(header.texts()),
        }
    }

    /// Register a progress observer; an observer with the same id is replaced
    pub fn register_observer<F>(&mut self, id: impl Into<String>, observer: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.progress.register(id.into(), Box::new(observer));
    }

    /// Write one workbook per distinct sanitized value of `column` (0-based)
    ///
    /// Files land in `<output_root>/<column header>/` and are named
    /// `<sheet>-<column header>-<value>.xlsx`.
    pub fn split_by_column(&mut self, sheet: &str, column: usize) -> SplitResult<SplitReport> {
        let started = Instant::now();
        log::info!("splitting sheet \"{}\" on column {}", sheet, column);

        self.progress.emit(ProgressEvent::ReadingRows);
        let partition = self.read_partition(sheet, column)?;
        let report = self.write_partition(sheet, partition)?;

        log::info!(
            "wrote {} files for {} rows of sheet \"{}\" in {:.2?}",
            report.groups.len(),
            report.rows,
            sheet,
            started.elapsed()
        );
        Ok(report)
    }

    fn read_partition(&mut self, sheet: &str, column: usize) -> SplitResult<Partition> {
        let styles = self.source.style_table().clone();
        let mut rows = self
            .source
            .rows(sheet)
            .map_err(SplitError::from_sheet_open)?;

        let header = match rows.next() {
            None => return Err(SplitError::NoData(sheet.to_string())),
            Some(Err(source)) => return Err(SplitError::RowRead { row: 1, source }),
            Some(Ok(row)) => row.texts(),
        };
        if column >= header.len() {
            return Err(SplitError::InvalidColumn {
                index: column,
                count: header.len(),
            });
        }
        let column_key = SplitKey::new(&header[column]);

        let mut samples = Vec::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut slots: HashMap<SplitKey, usize> = HashMap::new();
        let mut data_rows = 0usize;

        while let Some(next) = rows.next() {
            let row = next.map_err(|source| SplitError::RowRead {
                row: data_rows as u32 + 2,
                source,
            })?;

            if data_rows == 0 {
                let width = header.len().max(row.cells.len());
                samples = sample_columns(&row, rows.columns(), &styles, width)?;
            }
            data_rows += 1;
            self.progress
                .emit(ProgressEvent::ProcessingRow(row.number.saturating_sub(1)));

            let key = SplitKey::new(row.text(column));
            let values = coerce_row(&row, &samples);
            let slot = *slots.entry(key.clone()).or_insert_with(|| {
                groups.push(Group {
                    key,
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].rows.push(values);
        }

        if data_rows == 0 {
            return Err(SplitError::NoData(sheet.to_string()));
        }

        Ok(Partition {
            header,
            column: column_key,
            samples,
            groups,
            rows: data_rows,
        })
    }

    fn write_partition(&mut self, sheet: &str, partition: Partition) -> SplitResult<SplitReport> {
        let Partition {
            header,
            column,
            samples,
            groups,
            rows,
        } = partition;

        let styles = self.source.style_table();
        let output_dir = self.options.output_root.join(column.as_str());
        let created_dir = !output_dir.exists();
        let mut outputs: Vec<GroupOutput> = Vec::with_capacity(groups.len());

        for group in groups {
            self.progress
                .emit(ProgressEvent::WritingGroup(group.key.as_str()));

            let path = output_dir.join(format!("{}-{}-{}.xlsx", sheet, column, group.key));
            let row_count = group.rows.len();
            let workbook = build_workbook(&column, &group.key, &header, &samples, styles, group.rows);

            log::debug!("writing {} rows to {}", row_count, path.display());
            let saved = fs::create_dir_all(&output_dir)
                .map_err(XlsxError::from)
                .and_then(|()| workbook.save(&path));

            if let Err(source) = saved {
                if self.options.on_failure == FailurePolicy::RemoveWritten {
                    remove_outputs(&outputs, &path, &output_dir, created_dir);
                }
                return Err(SplitError::OutputWrite {
                    value: group.key.to_string(),
                    path,
                    source,
                });
            }

            outputs.push(GroupOutput {
                key: group.key,
                rows: row_count,
                path,
            });
        }

        Ok(SplitReport {
            sheet: sheet.to_string(),
            column,
            output_dir,
            rows,
            groups: outputs,
        })
    }
}

/// Sample kind, style and width of the first `width` columns from the first data row
fn sample_columns(
    row: &SheetRow,
    layout: &ColumnLayout,
    styles: &StyleTable,
    width: usize,
) -> SplitResult<Vec<ColumnSample>> {
    let samples = (0..width.min(MAX_COLS as usize))
        .map(|col| {
            let index = col as u16;
            let cell = row.cells.get(col);
            let kind = cell.map_or(CellKind::Unset, |c| c.kind);
            let style = match cell {
                Some(c) if c.style != 0 => c.style,
                _ => layout.style(index),
            };
            if !styles.contains(style) {
                return Err(SplitError::StyleRead {
                    column: CellAddress::column_to_letters(index),
                    style,
                });
            }
            let width = layout
                .width(index)
                .map_err(|source| SplitError::WidthRead {
                    column: CellAddress::column_to_letters(index),
                    source,
                })?;
            Ok(ColumnSample {
                kind,
                format: ColumnFormat::new(index, style, width),
            })
        })
        .collect::<SplitResult<Vec<_>>>()?;

    log::debug!("sampled columns: {:?}", samples);
    Ok(samples)
}

fn coerce_row(row: &SheetRow, samples: &[ColumnSample]) -> Vec<CellValue> {
    row.cells
        .iter()
        .enumerate()
        .map(|(col, cell)| {
            let kind = samples.get(col).map_or(CellKind::Unset, |s| s.kind);
            CellValue::coerce(&cell.value, kind)
        })
        .collect()
}

fn build_workbook(
    column: &SplitKey,
    key: &SplitKey,
    header: &[String],
    samples: &[ColumnSample],
    styles: &StyleTable,
    rows: Vec<Vec<CellValue>>,
) -> OutputWorkbook {
    let mut workbook = OutputWorkbook::new(sheet_name(column, key), styles.clone());
    workbook.set_header(header.iter().cloned());

    for row in rows {
        let cells = row
            .into_iter()
            .enumerate()
            .map(|(col, value)| {
                let style = samples.get(col).map_or(0, |s| s.format.style_id);
                OutputCell::new(value, style)
            })
            .collect();
        workbook.push_row(cells);
    }

    for sample in samples {
        workbook.set_column_format(sample.format);
    }
    workbook.set_header_style(true);
    if let Some(range) = workbook.data_range() {
        workbook.set_auto_filter(range);
    }
    workbook.freeze_rows(1);
    workbook
}

/// Delete the files of a failed split
fn remove_outputs(written: &[GroupOutput], failed: &Path, dir: &Path, created_dir: bool) {
    let paths = written
        .iter()
        .map(|g| g.path.as_path())
        .chain(std::iter::once(failed));

    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => log::debug!("removed {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("failed to remove {}: {}", path.display(), e),
        }
    }

    if created_dir {
        // Only succeeds if nothing else was put there
        if let Err(e) = fs::remove_dir(dir) {
            log::debug!("kept output directory {}: {}", dir.display(), e);
        }
    }
}
