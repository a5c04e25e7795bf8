//! Page fetching.
//!
//! A [`PageFetcher`] returns the raw markup of one page for one ticker.
//! `Ok(None)` means the page has no data (not found or empty), which is
//! different from a transport failure (`Err`).
//!
//! # Example
//!
//! ```no_run
//! use dcfgen_data::{HttpFetcher, PageFetcher, PageKind, StatementKind, extract_statement};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new()?;
//!     let kind = StatementKind::IncomeStatement;
//!     if let Some(markup) = fetcher.fetch(PageKind::Statement(kind), "AAPL").await? {
//!         let statement = extract_statement(kind, &markup)?;
//!         println!("{} line items", statement.items().len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use crate::error::Result;
use crate::statement::StatementKind;
use std::fmt;
use std::future::Future;

/// Yahoo Finance quote pages.
const YAHOO_QUOTE_URL: &str = "https://finance.yahoo.com/quote";
/// Macroaxis bond pages.
const MACROAXIS_BOND_URL: &str = "https://www.macroaxis.com/invest/bond";

/// Kind of page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A financial statement page
    Statement(StatementKind),
    /// Key statistics
    KeyStatistics,
    /// Company profile
    Profile,
    /// Analyst estimates
    Analysis,
    /// Quote summary, also listing related tickers
    Quote,
    /// Corporate bonds
    Bonds,
}

impl PageKind {
    /// URL of this page for `ticker`.
    pub fn url(&self, ticker: &str) -> String {
        let symbol = ticker.replace('^', "%5E");
        match self {
            Self::Statement(kind) => {
                format!("{YAHOO_QUOTE_URL}/{symbol}/{}?p={symbol}", kind.slug())
            }
            Self::KeyStatistics => format!("{YAHOO_QUOTE_URL}/{symbol}/key-statistics?p={symbol}"),
            Self::Profile => format!("{YAHOO_QUOTE_URL}/{symbol}/profile?p={symbol}"),
            Self::Analysis => format!("{YAHOO_QUOTE_URL}/{symbol}/analysis?p={symbol}"),
            Self::Quote => format!("{YAHOO_QUOTE_URL}/{symbol}?p={symbol}"),
            Self::Bonds => format!("{MACROAXIS_BOND_URL}/{symbol}"),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement(kind) => write!(f, "{kind}"),
            Self::KeyStatistics => f.write_str("Key Statistics"),
            Self::Profile => f.write_str("Profile"),
            Self::Analysis => f.write_str("Analysis"),
            Self::Quote => f.write_str("Quote"),
            Self::Bonds => f.write_str("Bonds"),
        }
    }
}

/// Source of raw page markup.
pub trait PageFetcher {
    /// Fetch one page. `Ok(None)` means the page has no data.
    fn fetch(
        &self,
        kind: PageKind,
        ticker: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}
