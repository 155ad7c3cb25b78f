//! Bundled demo data set: two years of seasonal monthly revenue.

use std::io::Write;

use chrono::{Datelike, Duration, NaiveDate};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

use crate::core::{Cell, Column, RawTable};
use crate::error::{Error, Result};

pub const DEMO_ROWS: usize = 24;
const DEMO_SEED: u64 = 42;
const BASE_REVENUE: f64 = 100_000.0;
const TREND_GAIN: f64 = 50_000.0;
const NOISE_RATIO: f64 = 0.04;

/// Multiplier applied to each calendar month (January first).
const MONTHLY_FACTORS: [f64; 12] = [
    0.95, 0.92, 1.00, 1.02, 1.05, 0.98, 0.95, 0.97, 1.05, 1.10, 1.15, 1.25,
];

/// `(date, revenue)` rows of the demo set.
///
/// Dates step 30 days from 2023-01-01; revenue is a linear trend times the
/// month's factor plus seeded Gaussian noise, rounded to cents.
pub fn demo_rows() -> Vec<(NaiveDate, f64)> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);

    (0..DEMO_ROWS)
        .map(|i| {
            let date = start + Duration::days(30 * i as i64);
            let trend = TREND_GAIN * i as f64 / (DEMO_ROWS - 1) as f64;
            let factor = MONTHLY_FACTORS[date.month0() as usize];
            let revenue = (BASE_REVENUE + trend) * factor;
            let noise = Normal::new(0.0, revenue * NOISE_RATIO)
                .map(|n| n.sample(&mut rng))
                .unwrap_or(0.0);
            (date, ((revenue + noise) * 100.0).round() / 100.0)
        })
        .collect()
}

/// The demo set as a table with text cells, like a freshly read CSV.
pub fn demo_table() -> RawTable {
    let rows = demo_rows();
    let dates = rows
        .iter()
        .map(|(d, _)| Cell::Text(d.format("%Y-%m-%d").to_string()))
        .collect();
    let revenue = rows
        .iter()
        .map(|(_, v)| Cell::Text(format!("{:.2}", v)))
        .collect();

    RawTable::new(vec![Column::new("Date", dates), Column::new("Revenue", revenue)])
        .unwrap_or_default()
}

/// Write the demo set as CSV.
pub fn write_demo_csv<W: Write>(writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Date", "Revenue"]).map_err(Error::export)?;
    for (date, revenue) in demo_rows() {
        csv.write_record([date.format("%Y-%m-%d").to_string(), format!("{:.2}", revenue)])
            .map_err(Error::export)?;
    }
    csv.flush().map_err(Error::export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ColumnClassifier;

    #[test]
    fn demo_is_reproducible() {
        assert_eq!(demo_rows(), demo_rows());
    }

    #[test]
    fn demo_shape_and_dates() {
        let rows = demo_rows();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].0, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(rows[1].0, NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        assert!(rows.iter().all(|(_, v)| *v > 50_000.0 && *v < 250_000.0));
        assert!(rows.iter().all(|(_, v)| (v * 100.0 - (v * 100.0).round()).abs() < 1e-6));
    }

    #[test]
    fn demo_table_is_classified() {
        let suggestion = ColumnClassifier::default().classify(&demo_table());
        assert_eq!(suggestion.date.as_deref(), Some("Date"));
        assert_eq!(suggestion.value.as_deref(), Some("Revenue"));
    }

    #[test]
    fn demo_csv_has_header_and_rows() {
        let mut out = Vec::new();
        write_demo_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Revenue"));
        assert_eq!(lines.count(), 24);
    }
}
