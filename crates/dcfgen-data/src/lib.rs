#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcfgen/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod bonds;
pub mod error;
pub mod fetch;
pub mod keystats;
pub mod locate;
pub mod normalize;
pub mod profile;
pub mod quote;
pub mod related;
pub mod statement;

pub use analysis::{AnalystGrowth, extract_analyst_growth};
pub use bonds::{BondIssue, BondSummary, extract_bond_summary};
pub use error::{DataError, Result};
pub use fetch::{HttpFetcher, MemoryFetcher, PageFetcher, PageKind};
pub use keystats::{KeyStatField, KeyStatistics, extract_key_statistics};
pub use normalize::{Value, normalize};
pub use profile::{CompanyProfile, extract_profile};
pub use quote::extract_quote_price;
pub use related::extract_related;
pub use statement::{FinancialStatement, StatementKind, extract_statement};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
