//! Pipeline orchestration and the interactive session state.
//!
//! [`Pipeline`] is stateless: every run takes a table plus the user's column
//! and horizon choices and returns a fresh [`PipelineSnapshot`]. [`Session`]
//! holds the loaded table and the last good snapshot, and only replaces
//! either when the corresponding action succeeds.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::{ForecastResult, RawTable, TimeSeries};
use crate::detection::{ColumnClassifier, ColumnSuggestion};
use crate::error::{Error, Result};
use crate::io::{demo_table, load_table};
use crate::models::ForecastEngine;
use crate::report::{compute_metrics, ForecastMetrics};
use crate::transform::SeriesBuilder;

/// A table together with where it came from and the classifier's guess.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub source: String,
    pub table: RawTable,
    pub suggestion: ColumnSuggestion,
}

/// Everything produced by one forecast run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    pub date_column: String,
    pub value_column: String,
    pub series: TimeSeries,
    pub forecast: ForecastResult,
    pub metrics: ForecastMetrics,
}

/// Stateless classifier → builder → engine → metrics chain.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Suggest date and value columns.
    pub fn detect(&self, table: &RawTable) -> ColumnSuggestion {
        ColumnClassifier::new(self.config.detection.clone()).classify(table)
    }

    /// Build the series, forecast it and compute the metrics.
    pub fn run(
        &self,
        table: &RawTable,
        date_column: &str,
        value_column: &str,
        horizon: usize,
    ) -> Result<PipelineSnapshot> {
        let series = SeriesBuilder::from_config(&self.config).build(table, date_column, value_column)?;
        let forecast = ForecastEngine::new(&self.config.forecast).forecast(&series, horizon)?;
        let metrics = compute_metrics(&series, &forecast)?;
        info!(
            variant = %forecast.variant(),
            horizon = forecast.horizon(),
            "pipeline finished"
        );

        Ok(PipelineSnapshot {
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
            series,
            forecast,
            metrics,
        })
    }
}

/// Mutable holder for the current table and the last successful run.
#[derive(Debug, Default)]
pub struct Session {
    pipeline: Pipeline,
    table: Option<LoadedTable>,
    snapshot: Option<Arc<PipelineSnapshot>>,
    last_error: Option<Error>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            ..Default::default()
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn table(&self) -> Option<&LoadedTable> {
        self.table.as_ref()
    }

    /// The last successful run, if any.
    pub fn snapshot(&self) -> Option<Arc<PipelineSnapshot>> {
        self.snapshot.clone()
    }

    /// The error of the most recent failed action, cleared by the next
    /// success.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Load a spreadsheet or CSV file.
    pub fn load_file(&mut self, path: &Path) -> Result<&LoadedTable> {
        let table = self.record(load_table(path))?;
        Ok(self.install(path.display().to_string(), table))
    }

    /// Load the bundled demo data set.
    pub fn load_demo(&mut self) -> &LoadedTable {
        self.install("demo".to_string(), demo_table())
    }

    /// Use an already materialised table.
    pub fn load_table(&mut self, source: impl Into<String>, table: RawTable) -> &LoadedTable {
        self.install(source.into(), table)
    }

    /// Run the pipeline on the loaded table. On failure the previous snapshot
    /// stays current.
    pub fn generate(
        &mut self,
        date_column: &str,
        value_column: &str,
        horizon: usize,
    ) -> Result<Arc<PipelineSnapshot>> {
        let result = match &self.table {
            Some(loaded) => self
                .pipeline
                .run(&loaded.table, date_column, value_column, horizon),
            None => Err(Error::EmptyTable),
        };
        let snapshot = Arc::new(self.record(result)?);
        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn install(&mut self, source: String, table: RawTable) -> &LoadedTable {
        let suggestion = self.pipeline.detect(&table);
        info!(
            source = %source,
            rows = table.row_count(),
            columns = table.column_count(),
            date = ?suggestion.date,
            value = ?suggestion.value,
            "table loaded"
        );
        self.snapshot = None;
        self.last_error = None;
        self.table.insert(LoadedTable {
            source,
            table,
            suggestion,
        })
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, "action failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, Column};
    use crate::error::ErrorKind;

    #[test]
    fn demo_session_produces_snapshot() {
        let mut session = Session::default();
        let loaded = session.load_demo();
        assert_eq!(loaded.suggestion.date.as_deref(), Some("Date"));
        assert_eq!(loaded.suggestion.value.as_deref(), Some("Revenue"));

        let snapshot = session.generate("Date", "Revenue", 6).unwrap();
        assert_eq!(snapshot.series.len(), 24);
        assert_eq!(snapshot.forecast.horizon(), 6);
        assert_eq!(snapshot.metrics.forecast_periods, 6);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn failed_run_keeps_previous_snapshot() {
        let mut session = Session::default();
        session.load_demo();
        let good = session.generate("Date", "Revenue", 3).unwrap();

        let err = session.generate("Date", "Date", 3).unwrap_err();
        assert_eq!(err, Error::SameColumn("Date".into()));
        assert_eq!(session.snapshot().as_deref(), Some(&*good));
        assert_eq!(session.last_error(), Some(&err));

        let err = session.generate("Date", "Revenue", 13).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(session.snapshot().as_deref(), Some(&*good));
    }

    #[test]
    fn generate_without_table_fails() {
        let mut session = Session::default();
        assert_eq!(session.generate("a", "b", 3), Err(Error::EmptyTable));
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn failed_load_keeps_table() {
        let mut session = Session::default();
        session.load_demo();
        let err = session
            .load_file(Path::new("/nonexistent/revcast/input.csv"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(session.table().map(|t| t.source.as_str()), Some("demo"));
    }

    #[test]
    fn unvalidated_config_cannot_loosen_limits() {
        let mut config = AppConfig::default();
        config.forecast.max_horizon = 48;
        config.forecast.min_observations = 3;
        let pipeline = Pipeline::new(config);

        let table = RawTable::new(vec![
            Column::new(
                "Date",
                vec![
                    Cell::from_text("2024-01-01"),
                    Cell::from_text("2024-02-01"),
                    Cell::from_text("2024-03-01"),
                ],
            ),
            Column::new("Sales", vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]),
        ])
        .unwrap();
        let err = pipeline.run(&table, "Date", "Sales", 3).unwrap_err();
        assert_eq!(err, Error::InsufficientData { needed: 6, got: 3 });

        let err = pipeline.run(&demo_table(), "Date", "Revenue", 40).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let pipeline = Pipeline::default();
        let table = demo_table();
        let a = pipeline.run(&table, "Date", "Revenue", 6).unwrap();
        let b = pipeline.run(&table, "Date", "Revenue", 6).unwrap();
        assert_eq!(a, b);
    }
}
