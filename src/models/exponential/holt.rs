//! Holt's linear trend model, optionally damped.
//!
//! Used for histories too short to estimate a yearly seasonal pattern.

use crate::core::{FittedParams, TimeSeries};
use crate::error::{Error, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};

pub(crate) const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);
pub(crate) const PHI_BOUNDS: (f64, f64) = (0.8, 0.98);

/// Holt's linear trend forecaster.
///
/// - Level: `l_t = α y_t + (1-α)(l_{t-1} + φ b_{t-1})`
/// - Trend: `b_t = β (l_t - l_{t-1}) + (1-β) φ b_{t-1}`
/// - Forecast: `ŷ_{t+h} = l_t + (φ + φ² + ... + φ^h) b_t`
///
/// Without damping `φ = 1` and the forecast is a straight line.
#[derive(Debug, Clone)]
pub struct HoltLinearTrend {
    alpha: Option<f64>,
    beta: Option<f64>,
    /// `None` means no damping.
    phi: Option<f64>,
    damped: bool,
    optimize: bool,
    level: Option<f64>,
    trend: Option<f64>,
    fitted: Option<Vec<f64>>,
    sse: f64,
}

impl HoltLinearTrend {
    /// Model with fixed smoothing weights and no damping.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(alpha.clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1)),
            beta: Some(beta.clamp(SMOOTHING_BOUNDS.0, SMOOTHING_BOUNDS.1)),
            phi: None,
            damped: false,
            optimize: false,
            level: None,
            trend: None,
            fitted: None,
            sse: f64::NAN,
        }
    }

    /// Model with fixed smoothing weights and damping.
    pub fn damped(alpha: f64, beta: f64, phi: f64) -> Self {
        Self {
            phi: Some(phi.clamp(PHI_BOUNDS.0, PHI_BOUNDS.1)),
            damped: true,
            ..Self::new(alpha, beta)
        }
    }

    /// Undamped model with weights estimated by least squares.
    pub fn auto() -> Self {
        Self {
            alpha: None,
            beta: None,
            phi: None,
            damped: false,
            optimize: true,
            level: None,
            trend: None,
            fitted: None,
            sse: f64::NAN,
        }
    }

    /// Damped model with weights and damping estimated by least squares.
    pub fn auto_damped() -> Self {
        Self {
            damped: true,
            ..Self::auto()
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn phi(&self) -> Option<f64> {
        self.phi
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    fn initial_state(values: &[f64]) -> (f64, f64) {
        match values {
            [first, second, ..] => (*first, second - first),
            [only] => (*only, 0.0),
            [] => (0.0, 0.0),
        }
    }

    /// Run the recursions, returning final level, trend, one-step fits and SSE.
    fn filter(values: &[f64], alpha: f64, beta: f64, phi: f64) -> (f64, f64, Vec<f64>, f64) {
        let (mut l, mut b) = Self::initial_state(values);
        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        fitted.push(l);
        for &y in values.iter().skip(1) {
            let forecast = l + phi * b;
            fitted.push(forecast);
            sse += (y - forecast).powi(2);

            let l_prev = l;
            l = alpha * y + (1.0 - alpha) * (l_prev + phi * b);
            b = beta * (l - l_prev) + (1.0 - beta) * phi * b;
        }

        (l, b, fitted, sse)
    }

    fn optimize_params(values: &[f64], damped: bool) -> (f64, f64, Option<f64>) {
        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };

        if damped {
            let result = nelder_mead(
                |p| Self::filter(values, p[0], p[1], p[2]).3,
                &[0.3, 0.1, 0.95],
                Some(&[SMOOTHING_BOUNDS, SMOOTHING_BOUNDS, PHI_BOUNDS]),
                config,
            );
            let p = &result.optimal_point;
            (p[0], p[1], Some(p[2]))
        } else {
            let result = nelder_mead(
                |p| Self::filter(values, p[0], p[1], 1.0).3,
                &[0.3, 0.1],
                Some(&[SMOOTHING_BOUNDS, SMOOTHING_BOUNDS]),
                config,
            );
            let p = &result.optimal_point;
            (p[0], p[1], None)
        }
    }
}

/// `φ + φ² + ... + φ^h`, or `h` when undamped.
pub(crate) fn damped_sum(phi: f64, h: usize) -> f64 {
    if (phi - 1.0).abs() < 1e-10 {
        h as f64
    } else {
        phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
    }
}

impl Default for HoltLinearTrend {
    fn default() -> Self {
        Self::auto()
    }
}

impl Forecaster for HoltLinearTrend {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if values.len() < 3 {
            return Err(Error::InsufficientData {
                needed: 3,
                got: values.len(),
            });
        }

        if self.optimize {
            let (alpha, beta, phi) = Self::optimize_params(values, self.damped);
            self.alpha = Some(alpha);
            self.beta = Some(beta);
            self.phi = phi;
        }

        let alpha = self.alpha.ok_or(Error::FitRequired)?;
        let beta = self.beta.ok_or(Error::FitRequired)?;
        let phi = self.phi.unwrap_or(1.0);

        let (level, trend, fitted, sse) = Self::filter(values, alpha, beta, phi);
        if !level.is_finite() || !trend.is_finite() {
            return Err(Error::Forecasting(format!(
                "{} produced a non-finite state",
                self.name()
            )));
        }

        self.level = Some(level);
        self.trend = Some(trend);
        self.fitted = Some(fitted);
        self.sse = sse;
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let l = self.level.ok_or(Error::FitRequired)?;
        let b = self.trend.ok_or(Error::FitRequired)?;
        let phi = self.phi.unwrap_or(1.0);

        Ok((1..=horizon).map(|h| l + damped_sum(phi, h) * b).collect())
    }

    fn fitted_params(&self) -> Option<FittedParams> {
        self.fitted.as_ref()?;
        Some(FittedParams {
            alpha: self.alpha?,
            beta: self.beta?,
            gamma: None,
            phi: self.phi,
            sse: self.sse,
        })
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn name(&self) -> &str {
        if self.damped {
            "HoltLinearTrend(damped)"
        } else {
            "HoltLinearTrend"
        }
    }
}
