//! Core data structures: raw tables, time series and forecast results.

mod forecast;
mod table;
mod time_series;

pub use forecast::{
    FittedParams, ForecastConfig, ForecastResult, ModelVariant, MAX_HORIZON, MIN_OBSERVATIONS,
    SEASONAL_PERIOD,
};
pub use table::{Cell, Column, RawTable};
pub use time_series::TimeSeries;
