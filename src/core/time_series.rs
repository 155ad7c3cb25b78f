//! Ordered (timestamp, value) series produced by the series builder.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// A univariate time series with a display name.
///
/// Timestamps are non-decreasing and every value is finite. Repeated
/// timestamps are allowed: the builder passes duplicates through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, validating ordering and values.
    pub fn new(
        name: impl Into<String>,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::InvalidParameter(format!(
                "{} timestamps but {} values",
                timestamps.len(),
                values.len()
            )));
        }

        if timestamps.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidParameter(
                "timestamps must be in ascending order".to_string(),
            ));
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter(
                "series values must be finite".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            timestamps,
            values,
        })
    }

    /// Create a series from (timestamp, value) pairs.
    pub fn from_points(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDateTime, f64)>,
    ) -> Result<Self> {
        let (timestamps, values) = points.into_iter().unzip();
        Self::new(name, timestamps, values)
    }

    /// Name of the value column this series came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over (timestamp, value) pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// The most recent observation.
    pub fn last(&self) -> Option<(NaiveDateTime, f64)> {
        Some((*self.timestamps.last()?, *self.values.last()?))
    }

    /// The last `n` observations (all of them if shorter).
    pub fn tail(&self, n: usize) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.points().skip(self.len().saturating_sub(n))
    }

    /// The first `n` observations.
    pub fn head(&self, n: usize) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.points().take(n)
    }
}
