//! Backend-independent report content.
//!
//! [`build_report`] decides what goes on each page; the PDF renderer only
//! decides where it goes.

use chrono::NaiveDateTime;

use crate::config::ReportSettings;
use crate::core::{ForecastResult, TimeSeries};
use crate::report::metrics::ForecastMetrics;
use crate::utils::format::{format_currency, format_date, format_growth, EXPORT_DATE};

/// Number of trailing historical rows listed in the report.
pub const HISTORY_TABLE_ROWS: usize = 6;

const METHODOLOGY: &str = "This forecast was generated using Exponential Smoothing \
(Holt-Winters method), which accounts for trends and seasonal patterns in the data. \
The model automatically adapts its parameters based on the amount of historical data \
available. All data processing occurs locally; no data is transmitted to external servers.";

/// A labelled headline number.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: String,
    pub value: String,
}

/// Two-column table with a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Section heading, rendered upper-case.
    Section(String),
    Paragraph(String),
    /// Small print.
    Note(String),
    Tiles(Vec<Tile>),
    /// Placeholder for the rasterised chart.
    Chart,
    Table(Table),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<Block>,
}

/// Series drawn in the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub value_name: String,
    pub history: Vec<(NaiveDateTime, f64)>,
    /// Starts at the last historical point so the two lines join.
    pub forecast: Vec<(NaiveDateTime, f64)>,
}

impl ChartData {
    pub fn new(history: &TimeSeries, forecast: &ForecastResult) -> Self {
        Self {
            value_name: history.name().to_string(),
            history: history.points().collect(),
            forecast: history.last().into_iter().chain(forecast.points()).collect(),
        }
    }

    /// Earliest and latest timestamps across both lines.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dates = self.history.iter().chain(&self.forecast).map(|(d, _)| *d);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Smallest and largest value across both lines.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.history.iter().chain(&self.forecast).map(|(_, v)| *v);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// The complete report: running header and footer, pages, and chart data.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: String,
    pub footer: String,
    pub pages: Vec<Page>,
    pub chart: ChartData,
}

/// Inputs to the report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub history: &'a TimeSeries,
    pub forecast: &'a ForecastResult,
    pub metrics: &'a ForecastMetrics,
    pub generated_at: NaiveDateTime,
}

pub fn build_report(input: ReportInput<'_>, settings: &ReportSettings) -> ReportDocument {
    let ReportInput {
        history,
        forecast,
        metrics,
        generated_at,
    } = input;
    let money = |v: f64| format_currency(&settings.currency, v, 0);
    let money_exact = |v: f64| format_currency(&settings.currency, v, 2);
    let value_name = history.name();

    let summary = Page {
        blocks: vec![
            Block::Section("Executive Summary".into()),
            Block::Paragraph(summary_text(value_name, metrics, &settings.currency)),
            Block::Section("Key Metrics".into()),
            Block::Tiles(vec![
                tile("Historical Avg", money(metrics.historical_avg)),
                tile("Forecast Avg", money(metrics.forecast_avg)),
                tile("Projected Growth", format_growth(metrics.growth_rate)),
                tile(
                    &format!("{}-Mo Total", metrics.forecast_periods),
                    money(metrics.projected_total),
                ),
            ]),
            Block::Section("Forecast Visualization".into()),
            Block::Chart,
        ],
    };

    let rows = |points: &mut dyn Iterator<Item = (NaiveDateTime, f64)>| -> Vec<Vec<String>> {
        points
            .map(|(d, v)| vec![format_date(d, EXPORT_DATE), money_exact(v)])
            .collect()
    };
    let details = Page {
        blocks: vec![
            Block::Section(format!("Historical Data (Last {} Periods)", HISTORY_TABLE_ROWS)),
            Block::Table(Table {
                headers: vec!["Date".into(), value_name.to_string()],
                rows: rows(&mut history.tail(HISTORY_TABLE_ROWS)),
            }),
            Block::Section("Forecast Data".into()),
            Block::Table(Table {
                headers: vec!["Date".into(), format!("{} (Forecast)", value_name)],
                rows: rows(&mut forecast.points()),
            }),
            Block::Section("Methodology".into()),
            Block::Note(METHODOLOGY.into()),
        ],
    };

    ReportDocument {
        title: settings.title.clone(),
        subtitle: settings.subtitle.clone(),
        footer: format!("Generated {}", generated_at.format("%d/%m/%Y %H:%M")),
        pages: vec![summary, details],
        chart: ChartData::new(history, forecast),
    }
}

/// Executive summary paragraph.
pub fn summary_text(value_name: &str, metrics: &ForecastMetrics, currency: &str) -> String {
    let growth = match metrics.growth_rate {
        Some(g) => {
            let direction = if g > 0.0 {
                "increase"
            } else if g < 0.0 {
                "decrease"
            } else {
                "change"
            };
            format!(
                "the model projects a {:.1}% {} from the last recorded value to the end of \
                 the forecast period.",
                g.abs(),
                direction
            )
        }
        None => "the growth from the last recorded value cannot be expressed as a \
                 percentage because that value is zero."
            .to_string(),
    };

    format!(
        "This report presents a {}-month financial forecast for {}. Based on historical \
         data analysis using Exponential Smoothing, {} The total projected value over the \
         forecast period is {}.",
        metrics.forecast_periods,
        value_name,
        growth,
        format_currency(currency, metrics.projected_total, 0)
    )
}

fn tile(label: &str, value: String) -> Tile {
    Tile {
        label: label.to_string(),
        value,
    }
}
