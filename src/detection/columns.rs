//! Heuristic classification of table columns into date and value roles.

use tracing::debug;

use crate::config::DetectionConfig;
use crate::core::{Column, RawTable};
use crate::detection::dates::{is_year_like, parse_date_column};

/// Name fragments that mark a likely date column.
pub const DATE_KEYWORDS: &[&str] = &[
    "date", "month", "period", "time", "quarter", "year", "day", "week",
];

/// Name fragments that mark a likely forecast target.
pub const VALUE_KEYWORDS: &[&str] = &[
    "revenue", "sales", "amount", "value", "total", "price", "income", "profit", "cost",
    "expense", "payment", "balance", "sum", "money", "fee", "charge", "earning",
];

/// Role a column plays in a forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Value,
    Ignored,
}

/// Suggested columns plus every candidate, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSuggestion {
    pub date: Option<String>,
    pub value: Option<String>,
    pub date_candidates: Vec<String>,
    pub value_candidates: Vec<String>,
}

impl ColumnSuggestion {
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if self.date.as_deref() == Some(column) {
            ColumnRole::Date
        } else if self.value.as_deref() == Some(column) {
            ColumnRole::Value
        } else {
            ColumnRole::Ignored
        }
    }

    /// Both roles were filled.
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.value.is_some()
    }
}

/// Guesses the date and value columns of a table.
///
/// Classification never fails: a role with no plausible column is `None`.
#[derive(Debug, Clone, Default)]
pub struct ColumnClassifier {
    config: DetectionConfig,
}

impl ColumnClassifier {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, table: &RawTable) -> ColumnSuggestion {
        let date_candidates = rank_by_keywords(
            table
                .columns()
                .iter()
                .filter(|c| self.is_date_column(c))
                .map(Column::name),
            DATE_KEYWORDS,
        );
        let date = date_candidates.first().cloned();

        let value_candidates = rank_by_keywords(
            table
                .columns()
                .iter()
                .filter(|c| Some(c.name()) != date.as_deref() && c.is_numeric())
                .map(Column::name),
            VALUE_KEYWORDS,
        );
        let value = value_candidates.first().cloned();

        debug!(
            date = ?date,
            value = ?value,
            date_candidates = date_candidates.len(),
            value_candidates = value_candidates.len(),
            "classified columns"
        );

        ColumnSuggestion {
            date,
            value,
            date_candidates,
            value_candidates,
        }
    }

    fn is_date_column(&self, column: &Column) -> bool {
        if column.is_date_typed() {
            debug!(column = column.name(), "native date column");
            return true;
        }

        if column.is_numeric() {
            let year_like = column
                .present()
                .take(self.config.sample_size)
                .filter_map(|c| c.as_number())
                .all(is_year_like);
            if year_like {
                debug!(column = column.name(), "numeric column looks like years, skipped");
            }
            return false;
        }

        let parsed = parse_date_column(
            column.cells(),
            self.config.sample_size,
            self.config.parse_threshold,
        );
        let ratio = parsed.ratio();
        debug!(
            column = column.name(),
            format = parsed.parser.format().unwrap_or("auto"),
            ratio,
            "date parse ratio"
        );
        ratio >= self.config.parse_threshold
    }
}

/// Keyword matches first, each group in table order.
fn rank_by_keywords<'a>(names: impl Iterator<Item = &'a str>, keywords: &[&str]) -> Vec<String> {
    let (mut preferred, rest): (Vec<String>, Vec<String>) = names
        .map(str::to_string)
        .partition(|name| has_keyword(name, keywords));
    preferred.extend(rest);
    preferred
}

pub fn has_keyword(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;
    use chrono::NaiveDate;

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column::new(name, values.iter().map(|v| Cell::from_text(v)).collect())
    }

    fn classify(columns: Vec<Column>) -> ColumnSuggestion {
        ColumnClassifier::default().classify(&RawTable::new(columns).unwrap())
    }

    const DATES: [&str; 6] = [
        "2024-01-01",
        "2024-02-01",
        "2024-03-01",
        "2024-04-01",
        "2024-05-01",
        "2024-06-01",
    ];

    #[test]
    fn keyword_date_column_wins_over_earlier_match() {
        let suggestion = classify(vec![
            text_column("Created", &DATES),
            text_column("Billing Month", &DATES),
            text_column("Revenue", &["1", "2", "3", "4", "5", "6"]),
        ]);
        assert_eq!(suggestion.date.as_deref(), Some("Billing Month"));
        assert_eq!(suggestion.date_candidates, vec!["Billing Month", "Created"]);
    }

    #[test]
    fn falls_back_to_first_parseable_column() {
        let suggestion = classify(vec![
            text_column("Label", &["a", "b", "c", "d", "e", "f"]),
            text_column("When", &DATES),
        ]);
        assert_eq!(suggestion.date.as_deref(), Some("When"));
    }

    #[test]
    fn numeric_columns_are_never_dates() {
        let suggestion = classify(vec![
            text_column("Year", &["2019", "2020", "2021", "2022", "2023", "2024"]),
            text_column("Sales", &["10", "20", "30", "40", "50", "60"]),
        ]);
        assert_eq!(suggestion.date, None);
        assert_eq!(suggestion.value.as_deref(), Some("Sales"));
        assert_eq!(suggestion.value_candidates, vec!["Sales", "Year"]);
    }

    #[test]
    fn low_parse_ratio_is_rejected() {
        let suggestion = classify(vec![text_column(
            "Date",
            &["2024-01-01", "2024-02-01", "x", "y", "z", "2024-06-01"],
        )]);
        assert_eq!(suggestion.date, None);
    }

    #[test]
    fn value_prefers_financial_keywords() {
        let suggestion = classify(vec![
            text_column("Date", &DATES),
            text_column("Units", &["1", "2", "3", "4", "5", "6"]),
            text_column("Net Income", &["1.5", "2", "", "4", "5", "6"]),
            text_column("Notes", &["a", "b", "c", "d", "e", "f"]),
        ]);
        assert_eq!(suggestion.value.as_deref(), Some("Net Income"));
        assert_eq!(suggestion.value_candidates, vec!["Net Income", "Units"]);
        assert_eq!(suggestion.role_of("Date"), ColumnRole::Date);
        assert_eq!(suggestion.role_of("Net Income"), ColumnRole::Value);
        assert_eq!(suggestion.role_of("Notes"), ColumnRole::Ignored);
        assert!(suggestion.is_complete());
    }

    #[test]
    fn native_dates_are_detected() {
        let dates = (1..=6)
            .map(|m| {
                Cell::Date(
                    NaiveDate::from_ymd_opt(2024, m, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                )
            })
            .collect();
        let suggestion = classify(vec![
            Column::new("Posted", dates),
            Column::new("Amount", (1..=6).map(|v| Cell::Number(v as f64)).collect()),
        ]);
        assert_eq!(suggestion.date.as_deref(), Some("Posted"));
        assert_eq!(suggestion.value.as_deref(), Some("Amount"));
    }

    #[test]
    fn empty_table_gives_no_suggestion() {
        let suggestion = ColumnClassifier::default().classify(&RawTable::default());
        assert_eq!(suggestion, ColumnSuggestion::default());
        assert!(!suggestion.is_complete());
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(has_keyword("TOTAL_AMOUNT", VALUE_KEYWORDS));
        assert!(has_keyword("Fiscal Quarter", DATE_KEYWORDS));
        assert!(!has_keyword("Region", VALUE_KEYWORDS));
    }
}
