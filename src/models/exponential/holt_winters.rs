//! Additive Holt-Winters with a damped trend.
//!
//! Used once two full seasonal cycles are available.

use crate::core::{FittedParams, TimeSeries};
use crate::error::{Error, Result};
use crate::models::exponential::holt::{damped_sum, PHI_BOUNDS, SMOOTHING_BOUNDS};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

/// Holt-Winters forecaster with additive seasonality and damped trend.
///
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + φ b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β) φ b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ) s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + (φ + ... + φ^h) b_t + s_{t+h-m}`
#[derive(Debug, Clone)]
pub struct HoltWinters {
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    phi: Option<f64>,
    seasonal_period: usize,
    optimize: bool,
    level: Option<f64>,
    trend: Option<f64>,
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    sse: f64,
    n: usize,
}

/// State after running the recursions over a series.
struct Filtered {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    fitted: Vec<f64>,
    sse: f64,
}

impl HoltWinters {
    /// Model with fixed weights.
    pub fn new(alpha: f64, beta: f64, gamma: f64, phi: f64, seasonal_period: usize) -> Self {
        let clamp = |x: f64| x.clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1);
        Self {
            alpha: Some(clamp(alpha)),
            beta: Some(clamp(beta)),
            gamma: Some(clamp(gamma)),
            phi: Some(phi.clamp(PHI_BOUNDS.0, PHI_BOUNDS.1)),
            seasonal_period,
            optimize: false,
            level: None,
            trend: None,
            seasonals: None,
            fitted: None,
            sse: f64::NAN,
            n: 0,
        }
    }

    /// Model with all weights estimated by least squares.
    pub fn auto(seasonal_period: usize) -> Self {
        Self {
            alpha: None,
            beta: None,
            gamma: None,
            phi: None,
            optimize: true,
            ..Self::new(0.3, 0.1, 0.1, 0.95, seasonal_period)
        }
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    pub fn seasonals(&self) -> Option<&[f64]> {
        self.seasonals.as_deref()
    }

    /// Level from the first season's mean, trend from the average
    /// season-over-season change, seasonals as centred first-season deviations.
    fn initial_state(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let first = &values[..period];
        let level = first.iter().sum::<f64>() / period as f64;

        let trend = (0..period)
            .map(|i| (values[period + i] - values[i]) / period as f64)
            .sum::<f64>()
            / period as f64;

        let mut seasonals: Vec<f64> = first.iter().map(|y| y - level).collect();
        let offset = seasonals.iter().sum::<f64>() / period as f64;
        seasonals.iter_mut().for_each(|s| *s -= offset);

        (level, trend, seasonals)
    }

    fn filter(values: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64, phi: f64) -> Filtered {
        let (mut level, mut trend, mut seasonals) = Self::initial_state(values, period);
        let mut fitted: Vec<f64> = values[..period].to_vec();
        let mut sse = 0.0;

        for (t, &y) in values.iter().enumerate().skip(period) {
            let idx = t % period;
            let s = seasonals[idx];

            let forecast = level + phi * trend + s;
            fitted.push(forecast);
            sse += (y - forecast).powi(2);

            let level_prev = level;
            level = alpha * (y - s) + (1.0 - alpha) * (level_prev + phi * trend);
            trend = beta * (level - level_prev) + (1.0 - beta) * phi * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }

        Filtered {
            level,
            trend,
            seasonals,
            fitted,
            sse,
        }
    }

    fn optimize_params(values: &[f64], period: usize) -> [f64; 4] {
        let config = NelderMeadConfig {
            max_iter: 2000,
            tolerance: 1e-8,
            ..Default::default()
        };

        let result = nelder_mead(
            |p| Self::filter(values, period, p[0], p[1], p[2], p[3]).sse,
            &[0.3, 0.1, 0.1, 0.95],
            Some(&[SMOOTHING_BOUNDS, SMOOTHING_BOUNDS, SMOOTHING_BOUNDS, PHI_BOUNDS]),
            config,
        );
        let p = &result.optimal_point;
        [p[0], p[1], p[2], p[3]]
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let period = self.seasonal_period;
        if period < 2 {
            return Err(Error::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        if values.len() < 2 * period {
            return Err(Error::InsufficientData {
                needed: 2 * period,
                got: values.len(),
            });
        }

        if self.optimize {
            let [alpha, beta, gamma, phi] = Self::optimize_params(values, period);
            self.alpha = Some(alpha);
            self.beta = Some(beta);
            self.gamma = Some(gamma);
            self.phi = Some(phi);
        }

        let alpha = self.alpha.ok_or(Error::FitRequired)?;
        let beta = self.beta.ok_or(Error::FitRequired)?;
        let gamma = self.gamma.ok_or(Error::FitRequired)?;
        let phi = self.phi.ok_or(Error::FitRequired)?;

        let state = Self::filter(values, period, alpha, beta, gamma, phi);
        if !state.level.is_finite() || !state.trend.is_finite() {
            return Err(Error::Forecasting(format!(
                "{} produced a non-finite state",
                self.name()
            )));
        }

        self.n = values.len();
        self.level = Some(state.level);
        self.trend = Some(state.trend);
        self.seasonals = Some(state.seasonals);
        self.fitted = Some(state.fitted);
        self.sse = state.sse;
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let level = self.level.ok_or(Error::FitRequired)?;
        let trend = self.trend.ok_or(Error::FitRequired)?;
        let seasonals = self.seasonals.as_ref().ok_or(Error::FitRequired)?;
        let phi = self.phi.ok_or(Error::FitRequired)?;
        let period = self.seasonal_period;

        Ok((1..=horizon)
            .map(|h| {
                let s = seasonals[(self.n + h - 1) % period];
                level + damped_sum(phi, h) * trend + s
            })
            .collect())
    }

    fn fitted_params(&self) -> Option<FittedParams> {
        self.fitted.as_ref()?;
        Some(FittedParams {
            alpha: self.alpha?,
            beta: self.beta?,
            gamma: self.gamma,
            phi: self.phi,
            sse: self.sse,
        })
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn name(&self) -> &str {
        "HoltWinters(additive, damped)"
    }
}
