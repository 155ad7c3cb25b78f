//! Transformations from raw tables to forecastable series.

mod series;

pub use series::{preview, PreviewRow, SeriesBuilder};
