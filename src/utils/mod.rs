//! Number formatting and numerical optimisation helpers.

pub mod format;
pub mod optimization;

pub use format::{format_amount, format_currency, format_date, format_growth};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
