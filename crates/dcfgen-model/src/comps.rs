//! Peer comparison metrics.
//!
//! A [`PeerMetrics`] row combines key statistics and bond data for one company
//! with the multiples derived from them. Every field is optional: a field the
//! page did not provide stays unknown and so does every field derived from it.

use crate::ebit::reconstruct_ebitda;
use dcfgen_data::{
    BondSummary, FinancialStatement, KeyStatistics, Value, extract_bond_summary,
    extract_key_statistics,
};
use serde::Serialize;
use tracing::debug;

/// Columns of the peer table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Ticker
    Peer,
    /// Price / earnings
    PeRatio,
    /// Enterprise value / sales
    EvSales,
    /// Enterprise value / EBITDA
    EvEbitda,
    /// Market capitalization
    MarketCap,
    /// Total debt
    TotalDebt,
    /// Cash and equivalents
    Cash,
    /// Enterprise value
    EnterpriseValue,
    /// Debt / equity
    DebtToEquity,
    /// Average S&P bond rating
    BondRating,
    /// 10-year bond spread
    BondSpread10y,
    /// 30-year bond spread
    BondSpread30y,
    /// LTM sales
    LtmSales,
    /// LTM EBITDA
    LtmEbitda,
    /// LTM earnings
    LtmEarnings,
    /// Share price
    SharePrice,
    /// Shares outstanding
    SharesOutstanding,
    /// Equity beta
    EquityBeta,
    /// Unlevered beta
    UnleveredBeta,
    /// Profit margin
    ProfitMargin,
    /// Operating margin
    OperatingMargin,
    /// Return on assets
    ReturnOnAssets,
    /// Return on equity
    ReturnOnEquity,
    /// Revenue growth
    RevenueGrowth,
    /// Earnings growth
    EarningsGrowth,
    /// Free-form notes
    KeyNotes,
}

impl Metric {
    /// All columns, in output order.
    pub const ALL: [Self; 26] = [
        Self::Peer,
        Self::PeRatio,
        Self::EvSales,
        Self::EvEbitda,
        Self::MarketCap,
        Self::TotalDebt,
        Self::Cash,
        Self::EnterpriseValue,
        Self::DebtToEquity,
        Self::BondRating,
        Self::BondSpread10y,
        Self::BondSpread30y,
        Self::LtmSales,
        Self::LtmEbitda,
        Self::LtmEarnings,
        Self::SharePrice,
        Self::SharesOutstanding,
        Self::EquityBeta,
        Self::UnleveredBeta,
        Self::ProfitMargin,
        Self::OperatingMargin,
        Self::ReturnOnAssets,
        Self::ReturnOnEquity,
        Self::RevenueGrowth,
        Self::EarningsGrowth,
        Self::KeyNotes,
    ];

    /// Column heading.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Peer => "Peer",
            Self::PeRatio => "P/E Ratio",
            Self::EvSales => "EV/Sales",
            Self::EvEbitda => "EV/EBITDA",
            Self::MarketCap => "Market Cap",
            Self::TotalDebt => "Total Debt",
            Self::Cash => "Cash and Equivalents",
            Self::EnterpriseValue => "Enterprise Value",
            Self::DebtToEquity => "Debt/Equity",
            Self::BondRating => "Bond Rating (S&P)",
            Self::BondSpread10y => "Bond Spread (10Y)",
            Self::BondSpread30y => "Bond Spread (30Y)",
            Self::LtmSales => "LTM Sales",
            Self::LtmEbitda => "LTM EBITDA",
            Self::LtmEarnings => "LTM Earnings",
            Self::SharePrice => "Share Price",
            Self::SharesOutstanding => "Shares Outstanding",
            Self::EquityBeta => "Equity Beta",
            Self::UnleveredBeta => "Unlevered Beta",
            Self::ProfitMargin => "Profit Margin",
            Self::OperatingMargin => "Operating Margin",
            Self::ReturnOnAssets => "Return on Assets",
            Self::ReturnOnEquity => "Return on Equity",
            Self::RevenueGrowth => "Revenue Growth (1Y)",
            Self::EarningsGrowth => "Earnings Growth (1Y)",
            Self::KeyNotes => "Key Notes",
        }
    }
}

/// Comparison metrics for one company. Amounts are in thousands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeerMetrics {
    /// Ticker symbol
    pub ticker: String,
    /// Company name
    pub name: Option<String>,
    /// Market cap / LTM earnings, floored at zero
    pub pe_ratio: Option<f64>,
    /// Enterprise value / LTM sales, floored at zero
    pub ev_sales: Option<f64>,
    /// Enterprise value / LTM EBITDA, floored at zero
    pub ev_ebitda: Option<f64>,
    /// Share price x shares outstanding
    pub market_cap: Option<f64>,
    /// Total debt
    pub total_debt: Option<f64>,
    /// Cash and equivalents
    pub cash: Option<f64>,
    /// Market cap + total debt - cash
    pub enterprise_value: Option<f64>,
    /// Total debt / market cap
    pub debt_to_equity: Option<f64>,
    /// Average S&P rating
    pub bond_rating: Option<String>,
    /// Average 10-year bond spread, as a fraction
    pub bond_spread_10y: Option<f64>,
    /// Average 30-year bond spread, as a fraction
    pub bond_spread_30y: Option<f64>,
    /// LTM sales
    pub ltm_sales: Option<f64>,
    /// LTM EBITDA
    pub ltm_ebitda: Option<f64>,
    /// LTM earnings
    pub ltm_earnings: Option<f64>,
    /// Share price
    pub share_price: Option<f64>,
    /// Shares outstanding
    pub shares_outstanding: Option<f64>,
    /// Equity beta
    pub equity_beta: Option<f64>,
    /// Equity beta / (1 + (1 - tax rate) x debt/equity)
    pub unlevered_beta: Option<f64>,
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
    /// Free-form notes
    pub key_notes: Option<String>,
}

impl PeerMetrics {
    /// Combine key statistics and bond data, then derive the multiples.
    ///
    /// `fallback_income` rebuilds LTM EBITDA when the key-statistics page does
    /// not report it.
    pub fn from_sources(
        stats: KeyStatistics,
        bonds: BondSummary,
        tax_rate: f64,
        fallback_income: Option<&FinancialStatement>,
    ) -> Self {
        let ltm_ebitda = stats.ltm_ebitda.or_else(|| {
            let income = fallback_income?;
            let ebitda = reconstruct_ebitda(income, income.current_period());
            debug!(ticker = %stats.ticker, ?ebitda, "LTM EBITDA rebuilt from income statement");
            ebitda
        });

        let mut metrics = Self {
            ticker: stats.ticker,
            name: stats.name,
            total_debt: stats.total_debt,
            cash: stats.total_cash,
            bond_rating: bonds.rating,
            bond_spread_10y: bonds.spread_10y,
            bond_spread_30y: bonds.spread_30y,
            ltm_sales: stats.ltm_sales,
            ltm_ebitda,
            ltm_earnings: stats.ltm_earnings,
            share_price: stats.share_price,
            shares_outstanding: stats.shares_outstanding,
            equity_beta: stats.equity_beta,
            profit_margin: stats.profit_margin,
            operating_margin: stats.operating_margin,
            return_on_assets: stats.return_on_assets,
            return_on_equity: stats.return_on_equity,
            revenue_growth: stats.revenue_growth,
            earnings_growth: stats.earnings_growth,
            ..Self::default()
        };
        metrics.derive(tax_rate);
        metrics
    }

    /// Recompute the derived fields from the base fields.
    pub fn derive(&mut self, tax_rate: f64) {
        self.market_cap = product(self.share_price, self.shares_outstanding);
        self.enterprise_value = match (self.market_cap, self.total_debt, self.cash) {
            (Some(cap), Some(debt), Some(cash)) => Some(cap + debt - cash),
            _ => None,
        };
        self.debt_to_equity = ratio(self.total_debt, self.market_cap);
        self.unlevered_beta = ratio(
            self.equity_beta,
            self.debt_to_equity.map(|de| 1.0 + (1.0 - tax_rate) * de),
        );
        self.pe_ratio = floored(ratio(self.market_cap, self.ltm_earnings));
        self.ev_sales = floored(ratio(self.enterprise_value, self.ltm_sales));
        self.ev_ebitda = floored(ratio(self.enterprise_value, self.ltm_ebitda));
    }

    /// Company name from the page heading, else the ticker.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ticker)
    }

    /// Value of one column.
    pub fn value(&self, metric: Metric) -> Option<Value> {
        let number = match metric {
            Metric::Peer => return Some(Value::Text(self.display_name().to_string())),
            Metric::BondRating => return self.bond_rating.clone().map(Value::Text),
            Metric::KeyNotes => return self.key_notes.clone().map(Value::Text),
            Metric::PeRatio => self.pe_ratio,
            Metric::EvSales => self.ev_sales,
            Metric::EvEbitda => self.ev_ebitda,
            Metric::MarketCap => self.market_cap,
            Metric::TotalDebt => self.total_debt,
            Metric::Cash => self.cash,
            Metric::EnterpriseValue => self.enterprise_value,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::BondSpread10y => self.bond_spread_10y,
            Metric::BondSpread30y => self.bond_spread_30y,
            Metric::LtmSales => self.ltm_sales,
            Metric::LtmEbitda => self.ltm_ebitda,
            Metric::LtmEarnings => self.ltm_earnings,
            Metric::SharePrice => self.share_price,
            Metric::SharesOutstanding => self.shares_outstanding,
            Metric::EquityBeta => self.equity_beta,
            Metric::UnleveredBeta => self.unlevered_beta,
            Metric::ProfitMargin => self.profit_margin,
            Metric::OperatingMargin => self.operating_margin,
            Metric::ReturnOnAssets => self.return_on_assets,
            Metric::ReturnOnEquity => self.return_on_equity,
            Metric::RevenueGrowth => self.revenue_growth,
            Metric::EarningsGrowth => self.earnings_growth,
        };
        number.map(Value::Number)
    }
}

/// Extract one peer row from its key-statistics page and optional bond page.
pub fn extract_peer_metrics(
    ticker: &str,
    key_statistics: &str,
    bonds: Option<&str>,
    tax_rate: f64,
    fallback_income: Option<&FinancialStatement>,
) -> PeerMetrics {
    let stats = extract_key_statistics(ticker, key_statistics);
    let bonds = bonds.map(extract_bond_summary).unwrap_or_default();
    PeerMetrics::from_sources(stats, bonds, tax_rate, fallback_income)
}

/// `numerator / denominator`, unknown when either side is unknown, the
/// denominator is zero or the result is not finite.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d).filter(|r| r.is_finite())
}

fn product(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

fn floored(value: Option<f64>) -> Option<f64> {
    value.map(|v| v.max(0.0))
}
