#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dcfgen/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod comps;
pub mod ebit;
pub mod error;
pub mod growth;
pub mod implied;
pub mod inputs;
pub mod projection;
pub mod wacc;

// Re-export main types
pub use comps::{Metric, PeerMetrics, extract_peer_metrics};
pub use ebit::{
    DEFAULT_MIN_TAX_RATE, effective_tax_rate, reconstruct_ebit, reconstruct_ebitda,
};
pub use error::{ModelError, Result};
pub use growth::{GrowthEstimate, ebit_margin, estimate_growth};
pub use implied::{ImpliedRange, Multiple, MultipleStats, implied_ranges};
pub use inputs::{DcfInputs, RevenuePercentages, revenue_percentages};
pub use projection::{
    DcfOutcome, Forecast, ForecastRow, ProjectionBasis, Valuation, project,
};
pub use wacc::{CostOfCapital, SpreadSource, cost_of_capital};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
