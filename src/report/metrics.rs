//! Summary statistics over history and forecast.

use statrs::statistics::Statistics;

use crate::core::{ForecastResult, TimeSeries};
use crate::error::{Error, Result};

/// Headline numbers shown in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastMetrics {
    /// Mean of the historical values.
    pub historical_avg: f64,
    /// Mean of the projected values.
    pub forecast_avg: f64,
    /// Percent change from the last historical value to the last projected
    /// value. `None` when the last historical value is zero.
    pub growth_rate: Option<f64>,
    /// Sum of the projected values.
    pub projected_total: f64,
    /// Sum of the historical values.
    pub historical_total: f64,
    /// Number of projected periods.
    pub forecast_periods: usize,
}

/// Compute the report metrics.
pub fn compute_metrics(history: &TimeSeries, forecast: &ForecastResult) -> Result<ForecastMetrics> {
    let (_, last_actual) = history.last().ok_or(Error::InsufficientData {
        needed: 1,
        got: 0,
    })?;
    let (_, last_forecast) = forecast.last().ok_or(Error::InsufficientData {
        needed: 1,
        got: 0,
    })?;

    Ok(ForecastMetrics {
        historical_avg: history.values().mean(),
        forecast_avg: forecast.values().mean(),
        growth_rate: growth_rate(last_actual, last_forecast),
        projected_total: forecast.values().iter().sum(),
        historical_total: history.values().iter().sum(),
        forecast_periods: forecast.horizon(),
    })
}

/// `(to - from) / from × 100`, or `None` when undefined.
pub fn growth_rate(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let rate = (to - from) / from * 100.0;
    rate.is_finite().then_some(rate)
}
