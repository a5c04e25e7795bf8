//! Conversion of scraped text tokens into typed values.
//!
//! Financial pages render numbers as `1,234.5`, `1.5B`, `12.3%` or dates such as
//! `12/31/2023`. [`normalize`] turns a token into a [`Value`] and never fails: a
//! token that matches no rule comes back as trimmed text.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Date layouts accepted when date parsing is requested.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Finite number, already scaled by any suffix
    Number(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Raw text that did not parse, including placeholders such as `N/A` or `--`
    Text(String),
}

impl Value {
    /// Numeric value, if this is a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Date value, if this is a date.
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Empty text, used for grid positions with no cell.
    pub const fn empty() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Normalize a scraped token.
///
/// Rules, first match wins:
/// 1. a trailing `%`, `T`, `B`, `M` or `k` scales the remaining number
///    (÷100, ×10^12, ×10^9, ×10^6, ×10^3); if the remainder is not a number the
///    token falls through to the next rule
/// 2. a plain number
/// 3. if `parse_dates`, a date in `MM/DD/YYYY` or `MM-DD-YYYY`
/// 4. the trimmed token as text
///
/// Thousands separators are removed before any numeric rule. Non-finite parses
/// such as `NaN` or `inf` are treated as text.
///
/// # Example
/// ```
/// use dcfgen_data::{Value, normalize};
///
/// assert_eq!(normalize("1.5B", false), Value::Number(1.5e9));
/// assert_eq!(normalize("N/A", false), Value::Text("N/A".to_string()));
/// ```
pub fn normalize(text: &str, parse_dates: bool) -> Value {
    let trimmed = text.trim();
    let cleaned = trimmed.replace(',', "");

    if let Some(n) = parse_scaled(&cleaned).or_else(|| parse_finite(&cleaned)) {
        return Value::Number(n);
    }
    if parse_dates && let Some(date) = parse_date(&cleaned) {
        return Value::Date(date);
    }
    Value::Text(trimmed.to_string())
}

/// Normalize a token and keep it only if it is a number.
pub fn normalize_number(text: &str) -> Option<f64> {
    normalize(text, false).as_number()
}

fn parse_scaled(token: &str) -> Option<f64> {
    let (idx, suffix) = token.char_indices().last()?;
    let body = &token[..idx];
    let number = match suffix {
        '%' => parse_finite(body)? / 100.0,
        'T' => parse_finite(body)? * 1e12,
        'B' => parse_finite(body)? * 1e9,
        'M' => parse_finite(body)? * 1e6,
        'k' => parse_finite(body)? * 1e3,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_finite(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_date(token: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
}
