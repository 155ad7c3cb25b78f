//! CSV export of history and forecast.
//!
//! ```text
//! Date,Revenue,Type
//! 01/01/2024,1200.5,Historical
//! 01/07/2024,1390.2,Forecast
//! ```

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::{ForecastResult, TimeSeries};
use crate::error::{Error, Result};
use crate::utils::format::{format_date, EXPORT_DATE};

/// Whether an exported row is observed or projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Historical,
    Forecast,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Historical => f.write_str("Historical"),
            RowKind::Forecast => f.write_str("Forecast"),
        }
    }
}

impl FromStr for RowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Historical" => Ok(RowKind::Historical),
            "Forecast" => Ok(RowKind::Forecast),
            other => Err(Error::Export(format!("unknown row type '{}'", other))),
        }
    }
}

/// One exported row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: NaiveDateTime,
    pub value: f64,
    pub kind: RowKind,
}

/// History rows followed by forecast rows.
pub fn export_rows(history: &TimeSeries, forecast: &ForecastResult) -> Vec<ExportRow> {
    let historical = history.points().map(|(date, value)| ExportRow {
        date,
        value,
        kind: RowKind::Historical,
    });
    let projected = forecast.points().map(|(date, value)| ExportRow {
        date,
        value,
        kind: RowKind::Forecast,
    });
    historical.chain(projected).collect()
}

/// Write `Date,<value column>,Type` rows.
pub fn write_csv<W: Write>(
    writer: W,
    history: &TimeSeries,
    forecast: &ForecastResult,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Date", history.name(), "Type"])
        .map_err(Error::export)?;

    for row in export_rows(history, forecast) {
        csv.write_record([
            format_date(row.date, EXPORT_DATE),
            row.value.to_string(),
            row.kind.to_string(),
        ])
        .map_err(Error::export)?;
    }
    csv.flush().map_err(Error::export)
}

/// Render the export to a string.
pub fn to_csv_string(history: &TimeSeries, forecast: &ForecastResult) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, history, forecast)?;
    String::from_utf8(buf).map_err(Error::export)
}

/// Parse an export back into its value column name and rows.
pub fn read_csv_export<R: Read>(reader: R) -> Result<(String, Vec<ExportRow>)> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers().map_err(Error::export)?.clone();
    if headers.len() != 3 || &headers[0] != "Date" || &headers[2] != "Type" {
        return Err(Error::Export(format!(
            "unexpected export header: {:?}",
            headers.iter().collect::<Vec<_>>()
        )));
    }
    let value_column = headers[1].to_string();

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record.map_err(Error::export)?;
        let field = |i: usize| record.get(i).unwrap_or_default();
        let date = NaiveDate::parse_from_str(field(0), EXPORT_DATE)
            .map_err(|e| Error::Export(format!("bad date '{}': {}", field(0), e)))?;
        let value = field(1)
            .parse::<f64>()
            .map_err(|e| Error::Export(format!("bad value '{}': {}", field(1), e)))?;
        let date = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::Export(format!("bad date '{}'", field(0))))?;
        rows.push(ExportRow {
            date,
            value,
            kind: field(2).parse()?,
        });
    }
    Ok((value_column, rows))
}
