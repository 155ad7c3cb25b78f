//! Forecaster trait shared by the smoothing models.

use crate::core::{FittedParams, TimeSeries};
use crate::error::Result;

/// Common interface for the exponential smoothing models.
///
/// Object-safe, so the engine can hold whichever variant it selected as a
/// `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Estimate parameters and states from the series values.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Point forecasts for the next `horizon` periods.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Parameters chosen during [`Forecaster::fit`].
    fn fitted_params(&self) -> Option<FittedParams>;

    /// In-sample one-step-ahead predictions.
    fn fitted_values(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

pub type BoxedForecaster = Box<dyn Forecaster>;
