//! Forecast configuration and result structures.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// Minimum number of clean observations before a forecast is attempted.
pub const MIN_OBSERVATIONS: usize = 6;

/// Largest supported horizon, in months.
pub const MAX_HORIZON: usize = 12;

/// Seasonal cycle length for monthly data with yearly seasonality.
pub const SEASONAL_PERIOD: usize = 12;

/// Exponential smoothing configuration, chosen from the history length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    /// Additive trend, no damping, no seasonal component (`n < 12`).
    SimpleTrend,
    /// Additive damped trend, no seasonal component (`12 <= n < 24`).
    DampedTrend,
    /// Additive damped trend with additive seasonality of period 12 (`n >= 24`).
    SeasonalDampedTrend,
}

impl ModelVariant {
    /// Select the variant for a history of `n` observations.
    pub fn for_length(n: usize) -> Self {
        if n >= 2 * SEASONAL_PERIOD {
            ModelVariant::SeasonalDampedTrend
        } else if n >= SEASONAL_PERIOD {
            ModelVariant::DampedTrend
        } else {
            ModelVariant::SimpleTrend
        }
    }

    pub fn is_damped(&self) -> bool {
        !matches!(self, ModelVariant::SimpleTrend)
    }

    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            ModelVariant::SeasonalDampedTrend => Some(SEASONAL_PERIOD),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::SimpleTrend => "Simple-Trend",
            ModelVariant::DampedTrend => "Damped-Trend",
            ModelVariant::SeasonalDampedTrend => "Seasonal-Damped-Trend",
        }
    }

    /// One-line explanation of the choice for the interface.
    pub fn description(&self) -> &'static str {
        match self {
            ModelVariant::SimpleTrend => "basic trend model, more data recommended",
            ModelVariant::DampedTrend => {
                "trend model with damping (24+ months needed for seasonal)"
            }
            ModelVariant::SeasonalDampedTrend => "full seasonal + damped trend model",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Horizon and model variant for one forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastConfig {
    horizon: usize,
    variant: ModelVariant,
}

impl ForecastConfig {
    /// Build the configuration for a history of `history_len` observations.
    pub fn for_series(history_len: usize, horizon: usize) -> Result<Self> {
        Self::with_limits(history_len, horizon, MAX_HORIZON, MIN_OBSERVATIONS)
    }

    /// Same as [`ForecastConfig::for_series`] with custom limits.
    pub fn with_limits(
        history_len: usize,
        horizon: usize,
        max_horizon: usize,
        min_observations: usize,
    ) -> Result<Self> {
        if horizon == 0 || horizon > max_horizon {
            return Err(Error::InvalidParameter(format!(
                "horizon must be between 1 and {} months, got {}",
                max_horizon, horizon
            )));
        }
        if history_len < min_observations {
            return Err(Error::InsufficientData {
                needed: min_observations,
                got: history_len,
            });
        }
        Ok(Self {
            horizon,
            variant: ModelVariant::for_length(history_len),
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }
}

/// Smoothing parameters chosen by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedParams {
    /// Level smoothing.
    pub alpha: f64,
    /// Trend smoothing.
    pub beta: f64,
    /// Seasonal smoothing, for seasonal models.
    pub gamma: Option<f64>,
    /// Trend damping, for damped models.
    pub phi: Option<f64>,
    /// In-sample sum of squared one-step errors.
    pub sse: f64,
}

/// Projected values at future month-starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    variant: ModelVariant,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
    params: FittedParams,
}

impl ForecastResult {
    pub fn new(
        variant: ModelVariant,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<f64>,
        params: FittedParams,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::Forecasting(format!(
                "{} forecast dates but {} values",
                timestamps.len(),
                values.len()
            )));
        }
        Ok(Self {
            variant,
            timestamps,
            values,
            params,
        })
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// Number of projected periods.
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn params(&self) -> &FittedParams {
        &self.params
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    pub fn last(&self) -> Option<(NaiveDateTime, f64)> {
        Some((*self.timestamps.last()?, *self.values.last()?))
    }
}
