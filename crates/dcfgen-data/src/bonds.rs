//! Corporate bond page extraction.
//!
//! The bond page lists a company's issues with their issue date, maturity,
//! coupon and a reference (Treasury) coupon. Issues are bucketed by their
//! term at issue into 10-year and 30-year groups and the average coupon
//! spread of each group is reported as a fraction.

use crate::locate::{element_text, find_label, label_value, selector};
use crate::normalize::{Value, normalize};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tracing::debug;

/// Issue lengths, in days, counted as 10-year bonds (8 to 12 years).
pub const TEN_YEAR_DAYS: RangeInclusive<i64> = 2920..=4380;
/// Issue lengths, in days, counted as 30-year bonds (28 to 32 years).
pub const THIRTY_YEAR_DAYS: RangeInclusive<i64> = 10220..=11680;

const ISSUE_DATE: &str = "Issue Date";
const MATURITY: &str = "Maturity";
const COUPON: &str = "Coupon";
const REF_COUPON: &str = "Ref Coupon";
const RATING_LABEL: &str = "Average S&P Rating";

/// One bond issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondIssue {
    /// Issue date
    pub issue_date: NaiveDate,
    /// Maturity date
    pub maturity: NaiveDate,
    /// Coupon, in percentage points
    pub coupon: f64,
    /// Reference coupon, in percentage points
    pub ref_coupon: f64,
}

impl BondIssue {
    /// Days from issue to maturity.
    pub fn length_days(&self) -> i64 {
        (self.maturity - self.issue_date).num_days()
    }

    /// Coupon spread over the reference, in percentage points.
    pub fn spread(&self) -> f64 {
        self.coupon - self.ref_coupon
    }
}

/// Bond data for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BondSummary {
    /// Average spread of 10-year issues, as a fraction
    pub spread_10y: Option<f64>,
    /// Average spread of 30-year issues, as a fraction
    pub spread_30y: Option<f64>,
    /// Average S&P rating
    pub rating: Option<String>,
}

impl BondSummary {
    /// Summarize a list of issues, keeping `rating` as given.
    pub fn from_issues(issues: &[BondIssue], rating: Option<String>) -> Self {
        Self {
            spread_10y: average_spread(issues, &TEN_YEAR_DAYS),
            spread_30y: average_spread(issues, &THIRTY_YEAR_DAYS),
            rating,
        }
    }
}

fn average_spread(issues: &[BondIssue], days: &RangeInclusive<i64>) -> Option<f64> {
    let spreads: Vec<f64> = issues
        .iter()
        .filter(|issue| days.contains(&issue.length_days()))
        .map(BondIssue::spread)
        .collect();
    if spreads.is_empty() {
        return None;
    }
    Some(spreads.iter().sum::<f64>() / spreads.len() as f64 / 100.0)
}

/// Extract the bond issues table. Rows missing any required column are skipped.
pub fn extract_bond_issues(markup: &str) -> Vec<BondIssue> {
    let document = Html::parse_document(markup);
    let Some(header_row) = find_label(&document, ISSUE_DATE).and_then(enclosing_row) else {
        debug!("bond table not found");
        return Vec::new();
    };

    let headings: Vec<String> = cells(header_row).into_iter().map(element_text).collect();
    data_rows(header_row)
        .into_iter()
        .filter_map(|row| {
            let fields: HashMap<&str, Value> = headings
                .iter()
                .map(String::as_str)
                .zip(cells(row).into_iter().map(|c| normalize(&element_text(c), true)))
                .collect();
            let issue = BondIssue {
                issue_date: fields.get(ISSUE_DATE)?.as_date()?,
                maturity: fields.get(MATURITY)?.as_date()?,
                coupon: fields.get(COUPON)?.as_number()?,
                ref_coupon: fields.get(REF_COUPON)?.as_number()?,
            };
            Some(issue)
        })
        .collect()
}

/// Extract the bond summary for one company. Absent data gives an empty summary.
pub fn extract_bond_summary(markup: &str) -> BondSummary {
    let issues = extract_bond_issues(markup);
    let rating = label_value(&Html::parse_document(markup), RATING_LABEL);
    debug!(issues = issues.len(), ?rating, "bond page parsed");
    BondSummary::from_issues(&issues, rating)
}

fn enclosing_row(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "tr")
}

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

/// Rows after the header row: its following siblings, or the body rows of the
/// table when the header sits in a `thead`.
fn data_rows(header_row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let siblings: Vec<_> = header_row
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .collect();
    if !siblings.is_empty() {
        return siblings;
    }
    let Ok(body_rows) = selector("tbody > tr") else {
        return Vec::new();
    };
    header_row
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .map(|table| table.select(&body_rows).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(years: i32, coupon: f64, ref_coupon: f64) -> BondIssue {
        BondIssue {
            issue_date: date(2010, 1, 15),
            maturity: date(2010 + years, 1, 15),
            coupon,
            ref_coupon,
        }
    }

    #[test]
    fn test_bucketing() {
        let issues = vec![
            issue(10, 4.0, 2.5),
            issue(9, 3.5, 2.5),
            issue(30, 5.0, 3.0),
            issue(5, 9.0, 1.0),
            issue(20, 9.0, 1.0),
        ];
        let summary = BondSummary::from_issues(&issues, Some("A-".into()));
        assert_relative_eq!(summary.spread_10y.unwrap(), 0.0125, epsilon = 1e-12);
        assert_relative_eq!(summary.spread_30y.unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(summary.rating.as_deref(), Some("A-"));
    }

    #[test]
    fn test_no_matching_bucket() {
        let summary = BondSummary::from_issues(&[issue(5, 4.0, 2.0)], None);
        assert_eq!(summary, BondSummary::default());
    }

    #[test]
    fn test_extract_with_thead() {
        let markup = r#"
            <div><span>Average S&amp;P Rating</span><span>BBB+</span></div>
            <table>
              <thead><tr><th>Symbol</th><th>Issue Date</th><th>Maturity</th><th>Coupon</th><th>Ref Coupon</th></tr></thead>
              <tbody>
                <tr><td>X1</td><td>01/15/2014</td><td>01/15/2024</td><td>4.25</td><td>2.75</td></tr>
                <tr><td>X2</td><td>03/01/2015</td><td>03/01/2045</td><td>5.10</td><td>3.10</td></tr>
                <tr><td>X3</td><td>N/A</td><td>03/01/2045</td><td>5.10</td><td>3.10</td></tr>
              </tbody>
            </table>
        "#;
        let issues = extract_bond_issues(markup);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_date, date(2014, 1, 15));

        let summary = extract_bond_summary(markup);
        assert_relative_eq!(summary.spread_10y.unwrap(), 0.015, epsilon = 1e-12);
        assert_relative_eq!(summary.spread_30y.unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(summary.rating.as_deref(), Some("BBB+"));
    }

    #[test]
    fn test_extract_sibling_rows() {
        let markup = r#"
            <table>
              <tr><td>Issue Date</td><td>Maturity</td><td>Coupon</td><td>Ref Coupon</td></tr>
              <tr><td>06-01-2016</td><td>06-01-2026</td><td>3.00</td><td>2.00</td></tr>
            </table>
        "#;
        let summary = extract_bond_summary(markup);
        assert_relative_eq!(summary.spread_10y.unwrap(), 0.01, epsilon = 1e-12);
        assert_eq!(summary.spread_30y, None);
        assert_eq!(summary.rating, None);
    }

    #[test]
    fn test_missing_page_content() {
        assert_eq!(extract_bond_summary("<html></html>"), BondSummary::default());
    }
}
