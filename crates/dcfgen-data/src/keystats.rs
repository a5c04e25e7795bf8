//! Key-statistics page extraction.

use crate::locate::Locator;
use crate::normalize::normalize_number;
use scraper::Html;
use serde::Serialize;
use tracing::debug;

/// Numeric fields read from the key-statistics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatField {
    /// Last traded price
    SharePrice,
    /// Equity beta
    EquityBeta,
    /// Shares outstanding
    SharesOutstanding,
    /// Revenue over the last twelve months
    LtmSales,
    /// EBITDA over the last twelve months
    LtmEbitda,
    /// Net income available to common over the last twelve months
    LtmEarnings,
    /// Total cash
    TotalCash,
    /// Total debt
    TotalDebt,
    /// Profit margin
    ProfitMargin,
    /// Operating margin
    OperatingMargin,
    /// Return on assets
    ReturnOnAssets,
    /// Return on equity
    ReturnOnEquity,
    /// Quarterly revenue growth, year over year
    RevenueGrowth,
    /// Quarterly earnings growth, year over year
    EarningsGrowth,
}

impl KeyStatField {
    /// All fields.
    pub const ALL: [Self; 14] = [
        Self::SharePrice,
        Self::EquityBeta,
        Self::SharesOutstanding,
        Self::LtmSales,
        Self::LtmEbitda,
        Self::LtmEarnings,
        Self::TotalCash,
        Self::TotalDebt,
        Self::ProfitMargin,
        Self::OperatingMargin,
        Self::ReturnOnAssets,
        Self::ReturnOnEquity,
        Self::RevenueGrowth,
        Self::EarningsGrowth,
    ];

    /// Where the field lives on the page.
    pub const fn locator(self) -> Locator {
        match self {
            Self::SharePrice => Locator::Selector(r#"fin-streamer[data-test="qsp-price"]"#),
            Self::EquityBeta => Locator::Label("Beta (5Y Monthly)"),
            Self::SharesOutstanding => Locator::Label("Shares Outstanding"),
            Self::LtmSales => Locator::Label("Revenue"),
            Self::LtmEbitda => Locator::Label("EBITDA"),
            Self::LtmEarnings => Locator::Label("Net Income Avi to Common"),
            Self::TotalCash => Locator::Label("Total Cash"),
            Self::TotalDebt => Locator::Label("Total Debt"),
            Self::ProfitMargin => Locator::Label("Profit Margin"),
            Self::OperatingMargin => Locator::Label("Operating Margin"),
            Self::ReturnOnAssets => Locator::Label("Return on Assets"),
            Self::ReturnOnEquity => Locator::Label("Return on Equity"),
            Self::RevenueGrowth => Locator::Label("Quarterly Revenue Growth"),
            Self::EarningsGrowth => Locator::Label("Quarterly Earnings Growth"),
        }
    }

    /// Whether the page value is rescaled to thousands to match the statements.
    pub const fn in_thousands(self) -> bool {
        matches!(
            self,
            Self::SharesOutstanding
                | Self::LtmSales
                | Self::LtmEbitda
                | Self::LtmEarnings
                | Self::TotalCash
                | Self::TotalDebt
        )
    }
}

/// Raw key statistics for one company. Monetary amounts and share counts are
/// in thousands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyStatistics {
    /// Ticker symbol
    pub ticker: String,
    /// Company name as shown in the page heading
    pub name: Option<String>,
    /// Share price
    pub share_price: Option<f64>,
    /// Equity beta
    pub equity_beta: Option<f64>,
    /// Shares outstanding (thousands)
    pub shares_outstanding: Option<f64>,
    /// LTM revenue (thousands)
    pub ltm_sales: Option<f64>,
    /// LTM EBITDA (thousands)
    pub ltm_ebitda: Option<f64>,
    /// LTM earnings (thousands)
    pub ltm_earnings: Option<f64>,
    /// Total cash (thousands)
    pub total_cash: Option<f64>,
    /// Total debt (thousands)
    pub total_debt: Option<f64>,
    /// Profit margin
    pub profit_margin: Option<f64>,
    /// Operating margin
    pub operating_margin: Option<f64>,
    /// Return on assets
    pub return_on_assets: Option<f64>,
    /// Return on equity
    pub return_on_equity: Option<f64>,
    /// Revenue growth
    pub revenue_growth: Option<f64>,
    /// Earnings growth
    pub earnings_growth: Option<f64>,
}

impl KeyStatistics {
    /// Empty record for `ticker`.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }

    /// Value of a field.
    pub const fn get(&self, field: KeyStatField) -> Option<f64> {
        match field {
            KeyStatField::SharePrice => self.share_price,
            KeyStatField::EquityBeta => self.equity_beta,
            KeyStatField::SharesOutstanding => self.shares_outstanding,
            KeyStatField::LtmSales => self.ltm_sales,
            KeyStatField::LtmEbitda => self.ltm_ebitda,
            KeyStatField::LtmEarnings => self.ltm_earnings,
            KeyStatField::TotalCash => self.total_cash,
            KeyStatField::TotalDebt => self.total_debt,
            KeyStatField::ProfitMargin => self.profit_margin,
            KeyStatField::OperatingMargin => self.operating_margin,
            KeyStatField::ReturnOnAssets => self.return_on_assets,
            KeyStatField::ReturnOnEquity => self.return_on_equity,
            KeyStatField::RevenueGrowth => self.revenue_growth,
            KeyStatField::EarningsGrowth => self.earnings_growth,
        }
    }

    fn slot(&mut self, field: KeyStatField) -> &mut Option<f64> {
        match field {
            KeyStatField::SharePrice => &mut self.share_price,
            KeyStatField::EquityBeta => &mut self.equity_beta,
            KeyStatField::SharesOutstanding => &mut self.shares_outstanding,
            KeyStatField::LtmSales => &mut self.ltm_sales,
            KeyStatField::LtmEbitda => &mut self.ltm_ebitda,
            KeyStatField::LtmEarnings => &mut self.ltm_earnings,
            KeyStatField::TotalCash => &mut self.total_cash,
            KeyStatField::TotalDebt => &mut self.total_debt,
            KeyStatField::ProfitMargin => &mut self.profit_margin,
            KeyStatField::OperatingMargin => &mut self.operating_margin,
            KeyStatField::ReturnOnAssets => &mut self.return_on_assets,
            KeyStatField::ReturnOnEquity => &mut self.return_on_equity,
            KeyStatField::RevenueGrowth => &mut self.revenue_growth,
            KeyStatField::EarningsGrowth => &mut self.earnings_growth,
        }
    }

    /// True when no numeric field was found.
    pub fn is_empty(&self) -> bool {
        KeyStatField::ALL.iter().all(|&f| self.get(f).is_none())
    }
}

/// Extract key statistics. Each field is located on its own; a missing or
/// non-numeric field stays `None` without affecting the others.
pub fn extract_key_statistics(ticker: &str, markup: &str) -> KeyStatistics {
    let document = Html::parse_document(markup);
    let mut stats = KeyStatistics::new(ticker);
    stats.name = Locator::Selector("h1").text(&document);

    for field in KeyStatField::ALL {
        let Some(text) = field.locator().text(&document) else {
            debug!(ticker, ?field, "key statistic not found");
            continue;
        };
        let Some(value) = normalize_number(&text) else {
            debug!(ticker, ?field, text = %text, "key statistic not numeric");
            continue;
        };
        *stats.slot(field) = Some(if field.in_thousands() {
            value / 1000.0
        } else {
            value
        });
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PAGE: &str = r#"
        <html><body>
          <h1>Acme Corp (ACME)</h1>
          <fin-streamer data-test="qsp-price" data-field="regularMarketPrice">50.00</fin-streamer>
          <table><tbody>
            <tr><td><span>Beta (5Y Monthly)</span></td><td>1.20</td></tr>
            <tr><td><span>Shares Outstanding</span><sup>5</sup></td><td>100M</td></tr>
            <tr><td><span>Revenue</span></td><td>2.5B</td></tr>
            <tr><td><span>EBITDA</span></td><td>N/A</td></tr>
            <tr><td><span>Profit Margin</span></td><td>12.50%</td></tr>
            <tr><td><span>Total Debt</span></td><td>750M</td></tr>
          </tbody></table>
        </body></html>
    "#;

    #[test]
    fn test_extract_fields() {
        let stats = extract_key_statistics("ACME", PAGE);
        assert_eq!(stats.ticker, "ACME");
        assert_eq!(stats.name.as_deref(), Some("Acme Corp (ACME)"));
        assert_relative_eq!(stats.share_price.unwrap(), 50.0);
        assert_relative_eq!(stats.equity_beta.unwrap(), 1.2);
        assert_relative_eq!(stats.shares_outstanding.unwrap(), 100_000.0);
        assert_relative_eq!(stats.ltm_sales.unwrap(), 2_500_000.0);
        assert_relative_eq!(stats.total_debt.unwrap(), 750_000.0);
        assert_relative_eq!(stats.profit_margin.unwrap(), 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_fields_stay_unknown() {
        let stats = extract_key_statistics("ACME", PAGE);
        assert_eq!(stats.ltm_ebitda, None);
        assert_eq!(stats.total_cash, None);
        assert_eq!(stats.return_on_equity, None);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_empty_page() {
        let stats = extract_key_statistics("ACME", "<html></html>");
        assert!(stats.is_empty());
        assert_eq!(stats.name, None);
    }
}
