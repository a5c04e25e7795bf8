//! Analyst estimates page extraction.

use crate::locate::{element_text, find_label, following_elements};
use crate::normalize::normalize_number;
use scraper::Html;
use serde::Serialize;
use tracing::debug;

const SALES_GROWTH_LABEL: &str = "Sales Growth (year/est)";

/// Consensus revenue growth for the current and next fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalystGrowth {
    /// Current fiscal year
    pub current_year: f64,
    /// Next fiscal year
    pub next_year: f64,
}

/// Extract analyst revenue growth. The row lists current quarter, next quarter,
/// current year and next year after the label; both yearly cells must be numeric.
pub fn extract_analyst_growth(markup: &str) -> Option<AnalystGrowth> {
    let document = Html::parse_document(markup);
    let label = find_label(&document, SALES_GROWTH_LABEL)?;
    let cells: Vec<String> = following_elements(label)
        .into_iter()
        .map(element_text)
        .collect();
    let growth = AnalystGrowth {
        current_year: cells.get(2).and_then(|c| normalize_number(c))?,
        next_year: cells.get(3).and_then(|c| normalize_number(c))?,
    };
    debug!(?growth, "analyst growth estimates");
    Some(growth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn page(current: &str, next: &str) -> String {
        format!(
            r#"<table><tbody>
                 <tr><td><span>Sales Growth (year/est)</span></td>
                   <td>4.10%</td><td>3.80%</td><td>{current}</td><td>{next}</td></tr>
               </tbody></table>"#
        )
    }

    #[test]
    fn test_extract() {
        let growth = extract_analyst_growth(&page("6.20%", "5.00%")).unwrap();
        assert_relative_eq!(growth.current_year, 0.062, epsilon = 1e-12);
        assert_relative_eq!(growth.next_year, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_non_numeric_estimate() {
        assert_eq!(extract_analyst_growth(&page("N/A", "5.00%")), None);
        assert_eq!(extract_analyst_growth("<html></html>"), None);
    }
}
