use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use tracing::info;

use crate::ctx::InputFormat;
use crate::records::{CellValue, RawRecord};

const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Debug)]
pub struct SheetRecords {
    /// Workbook sheet the rows came from; `None` for delimited text.
    pub sheet: Option<String>,
    pub records: Vec<RawRecord>,
}

pub fn read_records(path: &Path, format: InputFormat) -> Result<SheetRecords> {
    match format {
        InputFormat::Workbook => read_workbook(path),
        InputFormat::Delimited { delimiter } => read_delimited(path, delimiter),
    }
}

/// First sheet whose name mentions "data" (any case), else the first sheet.
pub fn select_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .find(|name| name.to_lowercase().contains("data"))
        .or_else(|| names.first())
        .map(String::as_str)
}

fn read_workbook(path: &Path) -> Result<SheetRecords> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;
    let names = workbook.sheet_names();
    let sheet = select_sheet(&names)
        .context("workbook has no sheets")?
        .to_string();
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("failed to read sheet '{}'", sheet))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
    let records = records_from_rows(rows);
    info!(sheet = %sheet, rows = records.len(), "workbook_sheet_read");
    Ok(SheetRecords {
        sheet: Some(sheet),
        records,
    })
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<SheetRecords> {
    let reader = super::open_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record =
            result.with_context(|| format!("malformed row {} in {}", i + 1, path.display()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim_start_matches('\u{feff}');
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect::<Vec<_>>(),
        );
    }
    let records = records_from_rows(rows);
    info!(rows = records.len(), "delimited_file_read");
    Ok(SheetRecords {
        sheet: None,
        records,
    })
}

pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

/// First row names the keys; later rows become records. Empty cells are
/// left out and blank rows are skipped.
pub fn records_from_rows<I>(rows: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let mut rows = rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers = header_keys(&header_row);

    rows.filter_map(|row| {
        let mut record = RawRecord::with_capacity(row.len());
        for (i, cell) in row.into_iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let key = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", EMPTY_HEADER, i));
            record.insert(key, cell);
        }
        (!record.is_empty()).then_some(record)
    })
    .collect()
}

/// Blank header cells become `__EMPTY`, `__EMPTY_1`, ...; repeats get a
/// numeric suffix.
fn header_keys(row: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .map(|cell| {
            let base = cell
                .to_display()
                .unwrap_or_else(|| EMPTY_HEADER.to_string());
            let count = seen.entry(base.clone()).or_insert(0);
            let key = if *count == 0 {
                base
            } else {
                format!("{}_{}", base, count)
            };
            *count += 1;
            key
        })
        .collect()
}
