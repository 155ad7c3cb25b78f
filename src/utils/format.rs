//! Display formatting for amounts, growth rates and dates.

use chrono::NaiveDateTime;

/// `15 Mar 2024`, used in previews.
pub const PREVIEW_DATE: &str = "%d %b %Y";
/// `15/03/2024`, used in the CSV export and report tables.
pub const EXPORT_DATE: &str = "%d/%m/%Y";
/// `Mar 2024`, used in the command-line forecast listing.
pub const MONTH_DATE: &str = "%b %Y";

/// Group the integer digits of `value` in thousands.
///
/// ```
/// use revcast::utils::format::format_amount;
///
/// assert_eq!(format_amount(1234567.891, 2), "1,234,567.89");
/// assert_eq!(format_amount(-950.0, 0), "-950");
/// ```
pub fn format_amount(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = rendered.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `EUR 12,500`
pub fn format_currency(currency: &str, value: f64, decimals: usize) -> String {
    format!("{} {}", currency, format_amount(value, decimals))
}

/// Signed percentage with one decimal, or `N/A`.
pub fn format_growth(growth: Option<f64>) -> String {
    match growth {
        Some(g) => format!("{:+.1}%", g),
        None => "N/A".to_string(),
    }
}

pub fn format_date(date: NaiveDateTime, pattern: &str) -> String {
    date.format(pattern).to_string()
}
