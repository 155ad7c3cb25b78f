//! Forecasting models and the engine that drives them.

mod traits;

pub mod engine;
pub mod exponential;

pub use engine::{forecast, forecast_dates, ForecastEngine};
pub use traits::{BoxedForecaster, Forecaster};
