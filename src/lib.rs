//! # revcast
//!
//! Spreadsheet-to-forecast pipeline for monthly financial figures.
//!
//! A table loaded from CSV or a workbook goes through column detection,
//! series preparation and an exponential smoothing forecast whose model
//! variant follows the history length. Results are summarised as metrics
//! and exported to CSV or a two-page PDF report.
//!
//! ```no_run
//! use revcast::prelude::*;
//!
//! # fn main() -> revcast::Result<()> {
//! let pipeline = Pipeline::default();
//! let table = revcast::io::demo_table();
//! let suggestion = pipeline.detect(&table);
//! let snapshot = pipeline.run(&table, "Date", "Revenue", 6)?;
//! println!("{:?} -> {:?}", suggestion.date, snapshot.metrics.growth_rate);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod io;
pub mod models;
pub mod report;
pub mod session;
pub mod transform;
pub mod utils;

pub use error::{Error, ErrorKind, Result};

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::{ForecastResult, ModelVariant, RawTable, TimeSeries};
    pub use crate::detection::{ColumnClassifier, ColumnSuggestion};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::models::{ForecastEngine, Forecaster};
    pub use crate::report::{compute_metrics, ForecastMetrics};
    pub use crate::session::{Pipeline, PipelineSnapshot, Session};
    pub use crate::transform::SeriesBuilder;
}
