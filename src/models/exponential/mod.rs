//! Exponential smoothing models.
//!
//! - Holt's linear trend, plain or damped
//! - Additive Holt-Winters with damped trend

mod holt;
mod holt_winters;

pub use holt::HoltLinearTrend;
pub use holt_winters::HoltWinters;
