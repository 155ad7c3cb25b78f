//! Forecast engine: picks the smoothing variant for a series, fits it and
//! projects monthly values.

use chrono::{Datelike, Months, NaiveDateTime};
use tracing::{debug, info};

use crate::config::ForecastSettings;
use crate::core::{
    ForecastConfig, ForecastResult, ModelVariant, TimeSeries, MAX_HORIZON, MIN_OBSERVATIONS,
};
use crate::error::{Error, Result};
use crate::models::exponential::{HoltLinearTrend, HoltWinters};
use crate::models::BoxedForecaster;

/// Fits the length-appropriate smoothing model and produces forecasts.
///
/// Forecasting is deterministic: the same series and horizon always give
/// identical output.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    max_horizon: usize,
    min_observations: usize,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(&ForecastSettings::default())
    }
}

impl ForecastEngine {
    /// Engine with the configured limits. Settings can only tighten the
    /// built-in horizon cap and observation floor.
    pub fn new(settings: &ForecastSettings) -> Self {
        Self {
            max_horizon: settings.max_horizon.min(MAX_HORIZON),
            min_observations: settings.min_observations.max(MIN_OBSERVATIONS),
        }
    }

    /// Forecast `horizon` months beyond the end of `series`.
    pub fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ForecastResult> {
        let config = ForecastConfig::with_limits(
            series.len(),
            horizon,
            self.max_horizon,
            self.min_observations,
        )?;
        let (last_date, _) = series.last().ok_or(Error::InsufficientData {
            needed: self.min_observations,
            got: 0,
        })?;

        let variant = config.variant();
        info!(
            series = series.name(),
            observations = series.len(),
            horizon,
            variant = %variant,
            "fitting exponential smoothing model"
        );

        let mut model = model_for(variant);
        model.fit(series).map_err(into_forecasting)?;
        let values = model.predict(config.horizon()).map_err(into_forecasting)?;
        let params = model.fitted_params().ok_or(Error::FitRequired)?;
        debug!(
            alpha = params.alpha,
            beta = params.beta,
            gamma = ?params.gamma,
            phi = ?params.phi,
            sse = params.sse,
            "model fitted"
        );

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::Forecasting(format!(
                "{} produced a non-finite value at step {}",
                model.name(),
                pos + 1
            )));
        }

        let timestamps = forecast_dates(last_date, config.horizon())?;
        ForecastResult::new(variant, timestamps, values, params)
    }
}

/// Forecast with default limits.
pub fn forecast(series: &TimeSeries, horizon: usize) -> Result<ForecastResult> {
    ForecastEngine::default().forecast(series, horizon)
}

/// Unfitted model for a variant.
pub fn model_for(variant: ModelVariant) -> BoxedForecaster {
    match variant {
        ModelVariant::SimpleTrend => Box::new(HoltLinearTrend::auto()),
        ModelVariant::DampedTrend => Box::new(HoltLinearTrend::auto_damped()),
        ModelVariant::SeasonalDampedTrend => Box::new(HoltWinters::auto(
            variant.seasonal_period().unwrap_or(crate::core::SEASONAL_PERIOD),
        )),
    }
}

/// The `horizon` month starts following the month of `last`.
pub fn forecast_dates(last: NaiveDateTime, horizon: usize) -> Result<Vec<NaiveDateTime>> {
    let month_start = last
        .date()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::Forecasting(format!("invalid last date {}", last)))?;

    (1..=horizon)
        .map(|h| {
            month_start
                .checked_add_months(Months::new(h as u32))
                .ok_or_else(|| Error::Forecasting(format!("date overflow {} months after {}", h, last)))
        })
        .collect()
}

fn into_forecasting(err: Error) -> Error {
    match err {
        Error::Forecasting(_) | Error::FitRequired => err,
        other => Error::Forecasting(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn monthly_series(values: Vec<f64>) -> TimeSeries {
        let points = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (date(2022, 1, 1).checked_add_months(Months::new(i as u32)).unwrap(), v));
        TimeSeries::from_points("Revenue", points).unwrap()
    }

    #[test]
    fn dates_start_the_month_after_the_last_observation() {
        let dates = forecast_dates(date(2024, 12, 15), 3).unwrap();
        assert_eq!(dates, vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1)]);

        let dates = forecast_dates(date(2024, 1, 31), 2).unwrap();
        assert_eq!(dates, vec![date(2024, 2, 1), date(2024, 3, 1)]);
    }

    #[test]
    fn variant_follows_history_length() {
        let engine = ForecastEngine::default();
        for (n, expected) in [
            (8, ModelVariant::SimpleTrend),
            (12, ModelVariant::DampedTrend),
            (24, ModelVariant::SeasonalDampedTrend),
        ] {
            let series = monthly_series((0..n).map(|i| 100.0 + i as f64).collect());
            let result = engine.forecast(&series, 4).unwrap();
            assert_eq!(result.variant(), expected);
            assert_eq!(result.horizon(), 4);
        }
    }

    #[test]
    fn forecast_is_deterministic() {
        let values: Vec<f64> = (0..30)
            .map(|i| 5000.0 + 40.0 * i as f64 + ((i * 7) % 5) as f64 * 90.0)
            .collect();
        let series = monthly_series(values);

        let first = forecast(&series, 6).unwrap();
        let second = forecast(&series, 6).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn linear_history_extrapolates_upwards() {
        let series = monthly_series((0..8).map(|i| 10.0 + 5.0 * i as f64).collect());
        let result = forecast(&series, 2).unwrap();
        assert_relative_eq!(result.values()[0], 50.0, epsilon = 1e-6);
        assert_relative_eq!(result.values()[1], 55.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_bad_horizons_and_short_series() {
        let series = monthly_series(vec![1.0; 10]);
        assert!(matches!(forecast(&series, 0), Err(Error::InvalidParameter(_))));
        assert!(matches!(forecast(&series, 13), Err(Error::InvalidParameter(_))));

        let short = monthly_series(vec![1.0; 5]);
        assert_eq!(
            forecast(&short, 3).unwrap_err(),
            Error::InsufficientData { needed: 6, got: 5 }
        );
    }

    #[test]
    fn tighter_limits_are_honoured() {
        let settings = ForecastSettings {
            default_horizon: 3,
            max_horizon: 6,
            min_observations: 8,
        };
        let engine = ForecastEngine::new(&settings);

        let series = monthly_series((0..8).map(|i| 3.0 + i as f64).collect());
        assert_eq!(engine.forecast(&series, 6).unwrap().horizon(), 6);
        assert!(matches!(engine.forecast(&series, 7), Err(Error::InvalidParameter(_))));

        let short = monthly_series((0..7).map(|i| 3.0 + i as f64).collect());
        assert_eq!(
            engine.forecast(&short, 3).unwrap_err(),
            Error::InsufficientData { needed: 8, got: 7 }
        );
    }

    #[test]
    fn looser_limits_fall_back_to_the_defaults() {
        let engine = ForecastEngine::new(&ForecastSettings {
            default_horizon: 6,
            max_horizon: 48,
            min_observations: 3,
        });
        let short = monthly_series(vec![3.0, 4.0, 5.0]);
        assert_eq!(
            engine.forecast(&short, 3).unwrap_err(),
            Error::InsufficientData { needed: 6, got: 3 }
        );
        let series = monthly_series((0..12).map(|i| 3.0 + i as f64).collect());
        assert!(matches!(engine.forecast(&series, 18), Err(Error::InvalidParameter(_))));
    }
}
