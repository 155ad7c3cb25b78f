//! Column detection for uploaded tables.
//!
//! This module provides tools for detecting:
//! - Date formats of text columns
//! - Which columns hold the dates and the forecast target

mod columns;
pub mod dates;

pub use columns::{
    has_keyword, ColumnClassifier, ColumnRole, ColumnSuggestion, DATE_KEYWORDS, VALUE_KEYWORDS,
};
pub use dates::{
    auto_parse, infer_date_format, parse_date_column, parse_with_format, DateParser, ParsedDates,
    DATE_FORMATS,
};
