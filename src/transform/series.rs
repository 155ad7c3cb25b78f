//! Turning a raw table plus a column choice into a clean time series.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::{AppConfig, DetectionConfig};
use crate::core::{Column, RawTable, TimeSeries, MIN_OBSERVATIONS};
use crate::detection::parse_date_column;
use crate::error::{Error, Result};
use crate::utils::format::{format_currency, format_date, PREVIEW_DATE};

/// Validates a column selection and builds the ordered series from it.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    detection: DetectionConfig,
    min_observations: usize,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            min_observations: MIN_OBSERVATIONS,
        }
    }
}

impl SeriesBuilder {
    /// `min_observations` below the built-in floor is raised to it.
    pub fn new(detection: DetectionConfig, min_observations: usize) -> Self {
        Self {
            detection,
            min_observations: min_observations.max(MIN_OBSERVATIONS),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.detection.clone(), config.forecast.min_observations)
    }

    /// Check the selection without building anything.
    pub fn validate(&self, table: &RawTable, date_col: &str, value_col: &str) -> Result<()> {
        self.selected(table, date_col, value_col).map(|_| ())
    }

    /// Parse, clean and sort the selected columns.
    ///
    /// Rows with a missing or unparseable date or value are dropped; the
    /// remaining rows are stably sorted by date, so duplicates keep their
    /// table order.
    pub fn build(&self, table: &RawTable, date_col: &str, value_col: &str) -> Result<TimeSeries> {
        let (dates, values) = self.selected(table, date_col, value_col)?;

        let parsed = parse_date_column(
            dates.cells(),
            self.detection.sample_size,
            self.detection.parse_threshold,
        );

        let mut points: Vec<(NaiveDateTime, f64)> = parsed
            .dates
            .iter()
            .zip(values.cells())
            .filter_map(|(date, cell)| Some(((*date)?, cell.as_number()?)))
            .collect();
        points.sort_by_key(|(date, _)| *date);

        let dropped = table.row_count() - points.len();
        if dropped > 0 {
            warn!(dropped, "rows with a missing date or value were removed");
        }
        if points.len() < self.min_observations {
            return Err(Error::InsufficientData {
                needed: self.min_observations,
                got: points.len(),
            });
        }

        info!(
            date_column = date_col,
            value_column = value_col,
            rows = points.len(),
            format = parsed.parser.format().unwrap_or("auto"),
            "built time series"
        );
        TimeSeries::from_points(value_col, points)
    }

    fn selected<'t>(
        &self,
        table: &'t RawTable,
        date_col: &str,
        value_col: &str,
    ) -> Result<(&'t Column, &'t Column)> {
        if date_col == value_col {
            return Err(Error::SameColumn(date_col.to_string()));
        }
        let dates = table
            .column(date_col)
            .ok_or_else(|| Error::ColumnNotFound(date_col.to_string()))?;
        let values = table
            .column(value_col)
            .ok_or_else(|| Error::ColumnNotFound(value_col.to_string()))?;

        let parsed = parse_date_column(
            dates.cells(),
            self.detection.sample_size,
            self.detection.parse_threshold,
        );
        if parsed.parsed_count() == 0 {
            return Err(Error::UnparseableDates(date_col.to_string()));
        }
        if parsed.ratio() < self.detection.parse_threshold {
            warn!(
                column = date_col,
                parsed = parsed.parsed_count(),
                rows = table.row_count(),
                "some dates could not be parsed, those rows will be skipped"
            );
        }

        if !values.is_numeric() {
            return Err(Error::NonNumeric(value_col.to_string()));
        }

        if table.row_count() < self.min_observations {
            return Err(Error::InsufficientData {
                needed: self.min_observations,
                got: table.row_count(),
            });
        }

        Ok((dates, values))
    }
}

/// One display row of the cleaned data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub date: String,
    pub value: String,
}

/// The first `n` points of `series`, formatted for display with `currency`.
pub fn preview(series: &TimeSeries, n: usize, currency: &str) -> Vec<PreviewRow> {
    series
        .head(n)
        .map(|(date, value)| PreviewRow {
            date: format_date(date, PREVIEW_DATE),
            value: format_currency(currency, value, 2),
        })
        .collect()
}
