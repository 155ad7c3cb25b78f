//! Metrics, CSV export and the PDF report.

mod chart;
mod csv_export;
mod layout;
mod metrics;
mod pdf;

pub use chart::{ChartRasterizer, PlottersRasterizer};
pub use csv_export::{export_rows, read_csv_export, to_csv_string, write_csv, ExportRow, RowKind};
pub use layout::{
    build_report, summary_text, Block, ChartData, Page, ReportDocument, ReportInput, Table, Tile,
    HISTORY_TABLE_ROWS,
};
pub use metrics::{compute_metrics, growth_rate, ForecastMetrics};
pub use pdf::{write_pdf, PdfRenderer, ReportRenderer};
