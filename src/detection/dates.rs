//! Date format inference and parsing for spreadsheet cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::core::Cell;

/// Formats tried, in order, against the leading sample of a column.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m",
    "%m/%Y",
    "%b %Y",
    "%B %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Extra patterns for per-cell parsing when no single format fits.
const AUTO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m-%d-%Y",
    "%Y.%m.%d",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d/%m/%y",
    "%m/%d/%y",
    "%Y%m%d",
    "%b-%Y",
    "%Y-%b",
];

/// Year range accepted for year-only values.
pub const YEAR_RANGE: (i64, i64) = (1900, 2100);

/// How the cells of a date column are turned into timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParser {
    /// A single format inferred from the column sample; cells that do not
    /// match it are unparseable.
    Format(&'static str),
    /// Per-cell automatic parsing.
    Auto,
}

impl DateParser {
    pub fn format(&self) -> Option<&'static str> {
        match self {
            DateParser::Format(f) => Some(f),
            DateParser::Auto => None,
        }
    }

    /// Parse a cell. Native dates pass through and year-only values map to 1 January.
    pub fn parse_cell(&self, cell: &Cell) -> Option<NaiveDateTime> {
        match cell {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => self.parse_text(s),
            Cell::Number(v) => year_start(*v),
            Cell::Empty | Cell::Bool(_) => None,
        }
    }

    pub fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match self {
            DateParser::Format(fmt) => parse_with_format(text, fmt),
            DateParser::Auto => auto_parse(text),
        }
    }
}

/// Parse `text` with one strftime-style pattern.
///
/// Patterns without a day field (`%Y-%m`, `%b %Y`, ...) resolve to the first
/// of the month.
pub fn parse_with_format(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if fmt.contains("%H") {
        return NaiveDateTime::parse_from_str(text, fmt).ok();
    }
    if fmt.contains("%d") {
        return NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    NaiveDate::parse_from_str(&format!("01 {}", text), &format!("%d {}", fmt))
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Try RFC 3339, every known pattern, then a bare year.
pub fn auto_parse(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATE_FORMATS
        .iter()
        .chain(AUTO_FORMATS)
        .find_map(|fmt| parse_with_format(text, fmt))
        .or_else(|| text.parse::<f64>().ok().and_then(year_start))
}

/// True when `value` is a whole number inside [`YEAR_RANGE`].
pub fn is_year_like(value: f64) -> bool {
    value.fract() == 0.0 && value >= YEAR_RANGE.0 as f64 && value <= YEAR_RANGE.1 as f64
}

fn year_start(value: f64) -> Option<NaiveDateTime> {
    if !is_year_like(value) {
        return None;
    }
    NaiveDate::from_ymd_opt(value as i32, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Pick the first format under which at least `threshold` of the leading
/// `sample_size` non-empty cells parse; `Auto` when none qualifies.
pub fn infer_date_format(cells: &[Cell], sample_size: usize, threshold: f64) -> DateParser {
    let sample: Vec<&Cell> = cells
        .iter()
        .filter(|c| !c.is_empty())
        .take(sample_size)
        .collect();
    if sample.is_empty() {
        return DateParser::Auto;
    }

    DATE_FORMATS
        .iter()
        .copied()
        .find(|fmt| {
            let parsed = sample
                .iter()
                .filter(|cell| match cell {
                    Cell::Date(_) => true,
                    Cell::Text(s) => parse_with_format(s, fmt).is_some(),
                    _ => false,
                })
                .count();
            parsed as f64 / sample.len() as f64 >= threshold
        })
        .map(DateParser::Format)
        .unwrap_or(DateParser::Auto)
}

/// A column's cells converted to timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDates {
    pub parser: DateParser,
    /// One entry per row; `None` where the cell is missing or unparseable.
    pub dates: Vec<Option<NaiveDateTime>>,
}

impl ParsedDates {
    pub fn parsed_count(&self) -> usize {
        self.dates.iter().filter(|d| d.is_some()).count()
    }

    /// Fraction of all rows, missing cells included, that parsed.
    pub fn ratio(&self) -> f64 {
        if self.dates.is_empty() {
            0.0
        } else {
            self.parsed_count() as f64 / self.dates.len() as f64
        }
    }
}

/// Infer a format from the sample and parse every cell with it.
pub fn parse_date_column(cells: &[Cell], sample_size: usize, threshold: f64) -> ParsedDates {
    let parser = infer_date_format(cells, sample_size, threshold);
    ParsedDates {
        parser,
        dates: cells.iter().map(|c| parser.parse_cell(c)).collect(),
    }
}
