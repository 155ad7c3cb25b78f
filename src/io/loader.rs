//! Spreadsheet loading: CSV through `csv`, workbooks through `calamine`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::core::{Cell, RawTable};
use crate::error::{Error, Result};

/// Workbook extensions handled by calamine.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load the first sheet of a spreadsheet, or a CSV file, into a table.
///
/// The first row is the header. A file without data rows is an error.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|e| unreadable(path, e))?;
            read_csv(BufReader::new(file)).map_err(|e| match e {
                Error::Unreadable { reason, .. } => Error::Unreadable {
                    path: path.display().to_string(),
                    reason,
                },
                other => other,
            })?
        }
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => read_workbook(path)?,
        "" => return Err(Error::UnsupportedFormat("file has no extension".into())),
        other => return Err(Error::UnsupportedFormat(format!(".{}", other))),
    };

    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Read CSV text with a header row. Every field is kept as text.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_unreadable(&e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_unreadable(&e))?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    non_empty(RawTable::from_rows(headers, rows))
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable(path, "workbook has no sheets"))?
        .map_err(|e| unreadable(path, e))?;
    debug!(path = %path.display(), size = ?range.get_size(), "read first worksheet");

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|h| h.to_string()).collect(),
        None => return Err(Error::EmptyTable),
    };
    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    non_empty(RawTable::from_rows(headers, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::from_text(s),
        Data::DateTime(dt) => dt.as_datetime().map(Cell::Date).unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
    }
}

fn non_empty(table: RawTable) -> Result<RawTable> {
    if table.is_empty() {
        Err(Error::EmptyTable)
    } else {
        Ok(table)
    }
}

fn unreadable(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::Unreadable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn csv_unreadable(err: &csv::Error) -> Error {
    Error::Unreadable {
        path: "<csv>".to_string(),
        reason: err.to_string(),
    }
}
