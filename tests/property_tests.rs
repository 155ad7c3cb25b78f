//! Property-based tests for the forecast engine and its calendar.
//!
//! Series are generated with a trend, optional seasonality and bounded
//! noise, then checked for invariants that must hold for any valid input.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use revcast::core::{ForecastConfig, ModelVariant, TimeSeries};
use revcast::models::{forecast, forecast_dates};
use revcast::report::compute_metrics;

fn month(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .checked_add_months(Months::new(i as u32))
        .unwrap()
}

fn make_ts(values: &[f64]) -> TimeSeries {
    TimeSeries::from_points("Revenue", values.iter().enumerate().map(|(i, v)| (month(i), *v)))
        .unwrap()
}

/// Monthly series of `min_len..max_len` points: level, slope, a yearly
/// swing and small deterministic jitter.
fn monthly_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (1_000.0..100_000.0_f64, -50.0..200.0_f64, 0.0..0.2_f64).prop_map(
            move |(base, slope, swing)| {
                (0..len)
                    .map(|i| {
                        let season =
                            1.0 + swing * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                        let jitter = ((i * 7919) % 13) as f64 - 6.0;
                        (base + slope * i as f64) * season + jitter
                    })
                    .collect()
            },
        )
    })
}

fn any_timestamp() -> impl Strategy<Value = NaiveDateTime> {
    (1990i32..2090, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(|(y, m, d, h, min)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    })
}

// =============================================================================
// Property: forecast length matches requested horizon
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn forecast_length_matches_horizon(
        values in monthly_values_strategy(6, 40),
        horizon in 1usize..=12
    ) {
        let ts = make_ts(&values);
        let result = forecast(&ts, horizon).unwrap();
        prop_assert_eq!(result.horizon(), horizon);
        prop_assert_eq!(result.timestamps().len(), horizon);
        prop_assert!(result.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn metrics_cover_the_whole_horizon(
        values in monthly_values_strategy(6, 40),
        horizon in 1usize..=12
    ) {
        let ts = make_ts(&values);
        let result = forecast(&ts, horizon).unwrap();
        let metrics = compute_metrics(&ts, &result).unwrap();
        prop_assert_eq!(metrics.forecast_periods, horizon);
        let total: f64 = result.values().iter().sum();
        prop_assert!((metrics.projected_total - total).abs() <= 1e-9 * total.abs().max(1.0));
    }

    #[test]
    fn forecast_is_deterministic(values in monthly_values_strategy(6, 30)) {
        let ts = make_ts(&values);
        prop_assert_eq!(forecast(&ts, 6).unwrap(), forecast(&ts, 6).unwrap());
    }
}

// =============================================================================
// Property: forecast dates are consecutive month starts
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn dates_are_consecutive_month_starts(last in any_timestamp(), horizon in 1usize..=12) {
        let dates = forecast_dates(last, horizon).unwrap();
        prop_assert_eq!(dates.len(), horizon);

        let index = |d: &NaiveDateTime| d.year() * 12 + d.month0() as i32;
        let start = index(&last);
        for (step, date) in dates.iter().enumerate() {
            prop_assert_eq!(date.day(), 1);
            prop_assert_eq!(date.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
            prop_assert_eq!(index(date), start + 1 + step as i32);
        }
    }

    #[test]
    fn variant_follows_history_length(n in 0usize..100) {
        let expected = if n >= 24 {
            ModelVariant::SeasonalDampedTrend
        } else if n >= 12 {
            ModelVariant::DampedTrend
        } else {
            ModelVariant::SimpleTrend
        };
        prop_assert_eq!(ModelVariant::for_length(n), expected);
    }

    #[test]
    fn horizon_outside_range_is_rejected(n in 6usize..100, horizon in 13usize..1000) {
        prop_assert!(ForecastConfig::for_series(n, horizon).is_err());
        prop_assert!(ForecastConfig::for_series(n, 0).is_err());
        prop_assert!(ForecastConfig::for_series(n, 12).is_ok());
    }
}
