//! Cost of capital.
//!
//! Beta is taken from the peers: their unlevered betas are averaged and
//! relevered at the subject's debt/equity. Cost of debt is the risk-free rate
//! plus the subject's bond spread.

use crate::comps::PeerMetrics;
use crate::error::{ModelError, Result};
use crate::growth::mean;
use crate::inputs::DcfInputs;
use serde::Serialize;
use tracing::{debug, warn};

/// Which bond spread fed the cost of debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpreadSource {
    /// Average spread of 30-year issues
    ThirtyYear,
    /// Average spread of 10-year issues
    TenYear,
    /// No bond data; the spread is zero and must be filled in by hand
    Unavailable,
}

impl SpreadSource {
    /// Short description for the DCF sheet.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ThirtyYear => "30Y bond spread",
            Self::TenYear => "10Y bond spread",
            Self::Unavailable => "NEEDS TO BE UPDATED",
        }
    }
}

/// Components of the weighted average cost of capital.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostOfCapital {
    /// Mean unlevered beta of the peers
    pub unlevered_beta: f64,
    /// Unlevered beta relevered at the subject's debt/equity
    pub beta: f64,
    /// Risk-free rate + beta x market risk premium
    pub cost_of_equity: f64,
    /// Bond spread over the risk-free rate
    pub spread: f64,
    /// Source of the spread
    pub spread_source: SpreadSource,
    /// Pre-tax cost of debt
    pub cost_of_debt: f64,
    /// Market cap / (market cap + debt)
    pub equity_weight: f64,
    /// Debt / (market cap + debt)
    pub debt_weight: f64,
    /// Weighted average cost of capital, with after-tax cost of debt
    pub wacc: f64,
}

/// The subject's 30-year spread, else its 10-year spread, else zero.
pub fn select_spread(subject: &PeerMetrics) -> (f64, SpreadSource) {
    match (subject.bond_spread_30y, subject.bond_spread_10y) {
        (Some(spread), _) => (spread, SpreadSource::ThirtyYear),
        (None, Some(spread)) => (spread, SpreadSource::TenYear),
        (None, None) => (0.0, SpreadSource::Unavailable),
    }
}

/// Compute the cost of capital of `subject` from its peers.
///
/// When no peer has an unlevered beta the subject's own is used. Unknown total
/// debt counts as no debt.
pub fn cost_of_capital(
    subject: &PeerMetrics,
    peers: &[PeerMetrics],
    inputs: &DcfInputs,
) -> Result<CostOfCapital> {
    let peer_betas: Vec<f64> = peers.iter().filter_map(|p| p.unlevered_beta).collect();
    let unlevered_beta = if peer_betas.is_empty() {
        debug!(ticker = %subject.ticker, "no peer betas; using the subject's unlevered beta");
        subject.unlevered_beta.ok_or_else(|| {
            ModelError::ComputationBlocked("no unlevered beta for subject or peers".to_string())
        })?
    } else {
        mean(&peer_betas)
    };

    let market_cap = subject
        .market_cap
        .ok_or_else(|| ModelError::MissingField("Market Cap".to_string()))?;
    let debt = subject.total_debt.unwrap_or(0.0);
    if market_cap + debt == 0.0 {
        return Err(ModelError::ComputationBlocked(
            "capital weights with zero market cap and debt".to_string(),
        ));
    }
    let debt_to_equity = subject.debt_to_equity.unwrap_or(0.0);

    let beta = unlevered_beta * (1.0 + (1.0 - inputs.tax_rate) * debt_to_equity);
    let cost_of_equity = inputs.risk_free_rate + beta * inputs.market_risk_premium;

    let (spread, spread_source) = select_spread(subject);
    if spread_source == SpreadSource::Unavailable {
        warn!(ticker = %subject.ticker, "no bond spread available; cost of debt needs review");
    }
    let cost_of_debt = inputs.risk_free_rate + spread;

    let equity_weight = market_cap / (market_cap + debt);
    let debt_weight = debt / (market_cap + debt);
    let wacc =
        cost_of_equity * equity_weight + cost_of_debt * (1.0 - inputs.tax_rate) * debt_weight;

    Ok(CostOfCapital {
        unlevered_beta,
        beta,
        cost_of_equity,
        spread,
        spread_source,
        cost_of_debt,
        equity_weight,
        debt_weight,
        wacc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::RevenuePercentages;
    use approx::assert_relative_eq;

    fn inputs() -> DcfInputs {
        DcfInputs {
            tax_rate: 0.25,
            risk_free_rate: 0.04,
            market_risk_premium: 0.05,
            terminal_growth: 0.02,
            forecast_years: 5,
            percentages: RevenuePercentages::default(),
        }
    }

    fn peer(ticker: &str, unlevered_beta: Option<f64>) -> PeerMetrics {
        PeerMetrics {
            ticker: ticker.to_string(),
            unlevered_beta,
            ..PeerMetrics::default()
        }
    }

    fn subject() -> PeerMetrics {
        PeerMetrics {
            ticker: "ACME".to_string(),
            market_cap: Some(750.0),
            total_debt: Some(250.0),
            debt_to_equity: Some(250.0 / 750.0),
            bond_spread_10y: Some(0.015),
            bond_spread_30y: Some(0.02),
            unlevered_beta: Some(0.7),
            ..PeerMetrics::default()
        }
    }

    #[test]
    fn test_cost_of_capital() {
        let peers = [peer("B", Some(0.8)), peer("C", Some(1.0)), peer("D", None)];
        let coc = cost_of_capital(&subject(), &peers, &inputs()).unwrap();

        assert_relative_eq!(coc.unlevered_beta, 0.9, epsilon = 1e-12);
        assert_relative_eq!(coc.beta, 0.9 * 1.25, epsilon = 1e-12);
        assert_relative_eq!(coc.cost_of_equity, 0.04 + 1.125 * 0.05, epsilon = 1e-12);
        assert_eq!(coc.spread_source, SpreadSource::ThirtyYear);
        assert_relative_eq!(coc.cost_of_debt, 0.06, epsilon = 1e-12);
        assert_relative_eq!(coc.equity_weight, 0.75);
        assert_relative_eq!(coc.debt_weight, 0.25);
        let expected = 0.09625 * 0.75 + 0.06 * 0.75 * 0.25;
        assert_relative_eq!(coc.wacc, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_spread_selection() {
        let ten_only = PeerMetrics {
            bond_spread_30y: None,
            ..subject()
        };
        assert_eq!(select_spread(&ten_only), (0.015, SpreadSource::TenYear));

        let none = PeerMetrics {
            bond_spread_10y: None,
            bond_spread_30y: None,
            ..subject()
        };
        assert_eq!(select_spread(&none), (0.0, SpreadSource::Unavailable));
        assert_eq!(SpreadSource::Unavailable.label(), "NEEDS TO BE UPDATED");
    }

    #[test]
    fn test_falls_back_to_subject_beta() {
        let coc = cost_of_capital(&subject(), &[peer("B", None)], &inputs()).unwrap();
        assert_relative_eq!(coc.unlevered_beta, 0.7);
    }

    #[test]
    fn test_missing_market_cap() {
        let s = PeerMetrics {
            market_cap: None,
            ..subject()
        };
        assert!(matches!(
            cost_of_capital(&s, &[peer("B", Some(1.0))], &inputs()),
            Err(ModelError::MissingField(_))
        ));
    }
}
