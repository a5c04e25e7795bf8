//! Company profile page extraction.

use crate::locate::Locator;
use crate::normalize::normalize_number;
use scraper::Html;
use serde::Serialize;

/// Base URL of the quote pages linked from the profile sheet.
pub const QUOTE_BASE_URL: &str = "https://finance.yahoo.com/quote";

/// Descriptive data for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub ticker: String,
    /// Company name
    pub name: Option<String>,
    /// Sector
    pub sector: Option<String>,
    /// Industry
    pub industry: Option<String>,
    /// Full-time employees
    pub employees: Option<u64>,
    /// Business description
    pub description: Option<String>,
    /// Quote page link, always present
    pub link: String,
}

impl CompanyProfile {
    /// Profile with only the ticker and link filled in.
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: None,
            sector: None,
            industry: None,
            employees: None,
            description: None,
            link: format!("{QUOTE_BASE_URL}/{ticker}"),
        }
    }
}

/// Extract a profile. `None` markup gives a profile with only the link.
pub fn extract_profile(ticker: &str, markup: Option<&str>) -> CompanyProfile {
    let mut profile = CompanyProfile::new(ticker);
    let Some(markup) = markup else {
        return profile;
    };
    let document = Html::parse_document(markup);
    profile.name = Locator::Selector("h1").text(&document);
    profile.sector = Locator::Label("Sector(s)").text(&document);
    profile.industry = Locator::Label("Industry").text(&document);
    profile.description = Locator::Label("Description").text(&document);
    profile.employees = Locator::Label("Full Time Employees")
        .text(&document)
        .as_deref()
        .and_then(normalize_number)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_profile() {
        let markup = r#"
            <h1>Acme Corp (ACME)</h1>
            <div>
              <p><span>Sector(s)</span>: <span>Industrials</span><br/>
                 <span>Industry</span>: <span>Specialty Machinery</span><br/>
                 <span>Full Time Employees</span>: <span><span>12,400</span></span></p>
            </div>
            <section><h2><span>Description</span></h2>
              <p>Acme Corp makes   anvils.</p></section>
        "#;
        let profile = extract_profile("ACME", Some(markup));
        assert_eq!(profile.name.as_deref(), Some("Acme Corp (ACME)"));
        assert_eq!(profile.sector.as_deref(), Some("Industrials"));
        assert_eq!(profile.industry.as_deref(), Some("Specialty Machinery"));
        assert_eq!(profile.employees, Some(12_400));
        assert_eq!(profile.description.as_deref(), Some("Acme Corp makes anvils."));
        assert_eq!(profile.link, "https://finance.yahoo.com/quote/ACME");
    }

    #[test]
    fn test_missing_page_keeps_link() {
        let profile = extract_profile("BRK-B", None);
        assert_eq!(profile.link, "https://finance.yahoo.com/quote/BRK-B");
        assert_eq!(profile.sector, None);
    }
}
