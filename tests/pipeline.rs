//! End-to-end tests: load, detect, build, forecast, export.

use std::fs::File;
use std::io::{BufReader, Write};

use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate};
use revcast::config::{AppConfig, ReportSettings};
use revcast::core::{Cell, Column, ModelVariant, RawTable};
use revcast::detection::ColumnClassifier;
use revcast::io::{demo_table, load_table, read_csv, write_demo_csv};
use revcast::report::{
    build_report, export_rows, read_csv_export, write_csv, PdfRenderer, PlottersRasterizer,
    ReportInput, ReportRenderer, RowKind,
};
use revcast::session::{Pipeline, Session};
use revcast::transform::SeriesBuilder;
use revcast::{Error, ErrorKind};

fn text(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::from_text(v)).collect()
}

#[test]
fn demo_series_forecasts_six_month_starts() {
    let table = demo_table();
    let snapshot = Pipeline::default()
        .run(&table, "Date", "Revenue", 6)
        .unwrap();

    assert_eq!(snapshot.series.len(), 24);
    assert_eq!(snapshot.forecast.variant(), ModelVariant::SeasonalDampedTrend);
    assert_eq!(snapshot.forecast.horizon(), 6);
    assert_eq!(snapshot.metrics.forecast_periods, 6);

    let (last, _) = snapshot.series.last().unwrap();
    let mut expected = NaiveDate::from_ymd_opt(last.year(), last.month(), 1).unwrap();
    for date in snapshot.forecast.timestamps() {
        expected = expected
            .checked_add_months(chrono::Months::new(1))
            .unwrap();
        assert_eq!(date.date(), expected);
    }

    let total: f64 = snapshot.forecast.values().iter().sum();
    assert_relative_eq!(snapshot.metrics.projected_total, total, max_relative = 1e-12);
}

#[test]
fn five_rows_are_rejected_as_data_error() {
    let table = RawTable::new(vec![
        Column::new(
            "Date",
            text(&["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01", "2024-05-01"]),
        ),
        Column::new("Sales", text(&["10", "11", "12", "13", "14"])),
    ])
    .unwrap();

    let err = SeriesBuilder::default()
        .build(&table, "Date", "Sales")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
    assert_eq!(err, Error::InsufficientData { needed: 6, got: 5 });
}

#[test]
fn same_column_is_rejected_before_parsing() {
    let table = demo_table();
    let err = Pipeline::default()
        .run(&table, "Revenue", "Revenue", 6)
        .unwrap_err();
    assert_eq!(err, Error::SameColumn("Revenue".into()));
}

#[test]
fn keyword_date_column_wins() {
    let dates = ["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01", "2024-05-01", "2024-06-01"];
    let table = RawTable::new(vec![
        Column::new("Created", text(&dates)),
        Column::new("Period", text(&dates)),
        Column::new("Amount", text(&["1", "2", "3", "4", "5", "6"])),
    ])
    .unwrap();

    let suggestion = ColumnClassifier::default().classify(&table);
    assert_eq!(suggestion.date.as_deref(), Some("Period"));
    assert_eq!(suggestion.date_candidates, vec!["Period", "Created"]);
    assert_eq!(suggestion.value.as_deref(), Some("Amount"));
}

#[test]
fn csv_export_round_trips_through_a_file() {
    let table = demo_table();
    let snapshot = Pipeline::default()
        .run(&table, "Date", "Revenue", 4)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    write_csv(File::create(&path).unwrap(), &snapshot.series, &snapshot.forecast).unwrap();

    let (column, rows) = read_csv_export(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(column, "Revenue");
    assert_eq!(rows, export_rows(&snapshot.series, &snapshot.forecast));
    assert_eq!(rows.iter().filter(|r| r.kind == RowKind::Forecast).count(), 4);
}

#[test]
fn forecasting_is_idempotent() {
    let table = demo_table();
    let pipeline = Pipeline::default();
    let first = pipeline.run(&table, "Date", "Revenue", 12).unwrap();
    let second = pipeline.run(&table, "Date", "Revenue", 12).unwrap();
    assert_eq!(first.forecast, second.forecast);
    assert_eq!(first.metrics, second.metrics);
}

#[test]
fn demo_csv_loads_back_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write_demo_csv(&mut file).unwrap();
    file.flush().unwrap();

    let loaded = load_table(file.path()).unwrap();
    assert_eq!(loaded.row_count(), 24);
    assert_eq!(loaded.column_names(), vec!["Date", "Revenue"]);

    let mut session = Session::new(AppConfig::default());
    session.load_file(file.path()).unwrap();
    let snapshot = session.generate("Date", "Revenue", 6).unwrap();
    assert_eq!(snapshot.forecast.horizon(), 6);
}

#[test]
fn unsupported_extension_is_a_load_error() {
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let err = load_table(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn ragged_csv_with_blanks_still_forecasts() {
    let data = "Month,Notes,Net Sales\n\
                01/2023,a,1000\n\
                02/2023,,1100\n\
                03/2023,b,\n\
                04/2023,,1250\n\
                05/2023,c,1300\n\
                06/2023,,1380\n\
                07/2023,d,1420\n\
                08/2023,,1500\n";
    let table = read_csv(data.as_bytes()).unwrap();
    let pipeline = Pipeline::default();
    let suggestion = pipeline.detect(&table);
    assert_eq!(suggestion.date.as_deref(), Some("Month"));
    assert_eq!(suggestion.value.as_deref(), Some("Net Sales"));

    let snapshot = pipeline.run(&table, "Month", "Net Sales", 3).unwrap();
    assert_eq!(snapshot.series.len(), 7);
    assert_eq!(snapshot.forecast.variant(), ModelVariant::SimpleTrend);
}

#[test]
fn pdf_report_renders() {
    let table = demo_table();
    let snapshot = Pipeline::default()
        .run(&table, "Date", "Revenue", 6)
        .unwrap();
    let doc = build_report(
        ReportInput {
            history: &snapshot.series,
            forecast: &snapshot.forecast,
            metrics: &snapshot.metrics,
            generated_at: NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        },
        &ReportSettings::default(),
    );

    let renderer = PdfRenderer::with_rasterizer(PlottersRasterizer {
        width: 480,
        height: 240,
    });
    let bytes = renderer.render(&doc).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
