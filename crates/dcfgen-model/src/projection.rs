//! Free-cash-flow forecast and discounted valuation.
//!
//! Revenue grows from the TTM base at the estimated rates; EBIT follows the
//! TTM margin and depreciation, capex and working capital scale with revenue.
//! The terminal value is taken on the last forecast year's free cash flow.

use crate::comps::PeerMetrics;
use crate::ebit::reconstruct_ebit;
use crate::error::{ModelError, Result};
use crate::growth::{GrowthEstimate, ebit_margin, estimate_growth};
use crate::implied::{ImpliedRange, implied_ranges};
use crate::inputs::DcfInputs;
use crate::wacc::{CostOfCapital, cost_of_capital};
use dcfgen_data::statement::items;
use dcfgen_data::{AnalystGrowth, FinancialStatement};
use serde::Serialize;
use tracing::{info, warn};

/// Base-year figures the forecast starts from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionBasis {
    /// TTM revenue
    pub revenue: f64,
    /// TTM EBIT
    pub ebit: f64,
    /// EBIT / revenue
    pub ebit_margin: f64,
    /// Growth rates
    pub growth: GrowthEstimate,
}

impl ProjectionBasis {
    /// Build the basis from the most recent income-statement column.
    pub fn from_statement(
        income: &FinancialStatement,
        analyst: Option<&AnalystGrowth>,
    ) -> Result<Self> {
        let period = income.current_period();
        let revenue = income
            .number(items::TOTAL_REVENUE, period)
            .ok_or_else(|| ModelError::MissingField(items::TOTAL_REVENUE.to_string()))?;
        let ebit = reconstruct_ebit(income, period)
            .ok_or_else(|| ModelError::MissingField(items::EBIT.to_string()))?;
        Ok(Self {
            revenue,
            ebit,
            ebit_margin: ebit_margin(income)?,
            growth: estimate_growth(income, analyst)?,
        })
    }
}

/// One forecast year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    /// Years after the base year, starting at 1
    pub year: usize,
    /// Revenue growth applied this year
    pub growth: f64,
    /// Revenue
    pub revenue: f64,
    /// Revenue x EBIT margin
    pub ebit: f64,
    /// EBIT x tax rate
    pub tax: f64,
    /// EBIT - tax
    pub nopat: f64,
    /// Depreciation and amortization added back
    pub depreciation: f64,
    /// Capital expenditure
    pub capex: f64,
    /// Increase in net working capital
    pub working_capital_change: f64,
    /// NOPAT + depreciation - capex - working capital change
    pub free_cash_flow: f64,
    /// Free cash flow / (1 + WACC)^year
    pub discounted_fcf: f64,
}

/// The forecast and its terminal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// One row per forecast year
    pub rows: Vec<ForecastRow>,
    /// Terminal value attached to the final year
    pub terminal_value: f64,
}

impl Forecast {
    /// Sum of discounted free cash flows plus the terminal value.
    pub fn enterprise_value(&self) -> f64 {
        self.rows.iter().map(|r| r.discounted_fcf).sum::<f64>() + self.terminal_value
    }
}

/// Terminal value: `fcf / (1 + wacc) / (wacc - terminal_growth)`.
pub fn terminal_value(final_fcf: f64, wacc: f64, terminal_growth: f64) -> Result<f64> {
    if wacc <= terminal_growth {
        return Err(ModelError::ValuationDegenerate {
            wacc,
            terminal_growth,
        });
    }
    Ok(final_fcf / (1.0 + wacc) / (wacc - terminal_growth))
}

/// Project free cash flows over the forecast horizon and discount at `wacc`.
pub fn project(basis: &ProjectionBasis, inputs: &DcfInputs, wacc: f64) -> Result<Forecast> {
    inputs.validate()?;
    let pct = &inputs.percentages;

    let mut rows = Vec::with_capacity(inputs.forecast_years);
    let mut revenue = basis.revenue;
    let mut discount = 1.0;
    for i in 0..inputs.forecast_years {
        let growth = basis.growth.rate_for_year(i);
        revenue *= 1.0 + growth;
        discount *= 1.0 + wacc;

        let ebit = revenue * basis.ebit_margin;
        let tax = ebit * inputs.tax_rate;
        let nopat = ebit - tax;
        let depreciation = revenue * pct.depreciation;
        let capex = revenue * pct.capex;
        let working_capital_change = revenue * pct.working_capital;
        let free_cash_flow = nopat + depreciation - capex - working_capital_change;

        rows.push(ForecastRow {
            year: i + 1,
            growth,
            revenue,
            ebit,
            tax,
            nopat,
            depreciation,
            capex,
            working_capital_change,
            free_cash_flow,
            discounted_fcf: free_cash_flow / discount,
        });
    }

    let final_fcf = rows.last().map_or(0.0, |r| r.free_cash_flow);
    let terminal_value = terminal_value(final_fcf, wacc, inputs.terminal_growth)?;
    Ok(Forecast {
        rows,
        terminal_value,
    })
}

/// Enterprise value bridged to equity and per-share value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    /// Base-year figures
    pub basis: ProjectionBasis,
    /// Forecast rows and terminal value
    pub forecast: Forecast,
    /// Discount rate used
    pub wacc: f64,
    /// Enterprise value
    pub enterprise_value: f64,
    /// Enterprise value - debt + cash
    pub equity_value: f64,
    /// Equity value / shares outstanding
    pub per_share_value: Option<f64>,
}

impl Valuation {
    /// Run the forecast and bridge to equity using the subject's balance sheet
    /// figures. Unknown debt or cash count as zero.
    pub fn compute(
        basis: ProjectionBasis,
        inputs: &DcfInputs,
        wacc: f64,
        subject: &PeerMetrics,
    ) -> Result<Self> {
        let forecast = project(&basis, inputs, wacc)?;
        let enterprise_value = forecast.enterprise_value();
        let equity_value =
            enterprise_value - subject.total_debt.unwrap_or(0.0) + subject.cash.unwrap_or(0.0);
        let per_share_value = subject
            .shares_outstanding
            .filter(|s| *s != 0.0)
            .map(|shares| equity_value / shares);
        Ok(Self {
            basis,
            forecast,
            wacc,
            enterprise_value,
            equity_value,
            per_share_value,
        })
    }
}

/// Everything the DCF sheet shows. Each part fails independently so that the
/// sheet can show the inputs even when the valuation cannot be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DcfOutcome {
    /// Model inputs
    pub inputs: DcfInputs,
    /// Cost of capital
    pub cost_of_capital: Result<CostOfCapital>,
    /// Forecast and valuation
    pub valuation: Result<Valuation>,
    /// Peer-implied values
    pub implied: Vec<ImpliedRange>,
}

impl DcfOutcome {
    /// Compute the cost of capital, valuation and implied ranges for `subject`.
    pub fn compute(
        income: Option<&FinancialStatement>,
        analyst: Option<&AnalystGrowth>,
        subject: &PeerMetrics,
        peers: &[PeerMetrics],
        inputs: DcfInputs,
    ) -> Self {
        let implied = implied_ranges(subject, peers);
        let cost_of_capital = inputs
            .validate()
            .and_then(|()| cost_of_capital(subject, peers, &inputs));

        let valuation = match (&cost_of_capital, income) {
            (Err(e), _) => Err(e.clone()),
            (Ok(_), None) => Err(ModelError::MissingField("Income Statement".to_string())),
            (Ok(coc), Some(income)) => ProjectionBasis::from_statement(income, analyst)
                .and_then(|basis| Valuation::compute(basis, &inputs, coc.wacc, subject)),
        };
        match &valuation {
            Ok(v) => info!(
                ticker = %subject.ticker,
                enterprise_value = v.enterprise_value,
                per_share = ?v.per_share_value,
                "valuation complete"
            ),
            Err(e) => warn!(ticker = %subject.ticker, error = %e, "valuation unavailable"),
        }

        Self {
            inputs,
            cost_of_capital,
            valuation,
            implied,
        }
    }

    /// True when the terminal value is undefined.
    pub const fn is_degenerate(&self) -> bool {
        matches!(self.valuation, Err(ModelError::ValuationDegenerate { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::RevenuePercentages;
    use approx::assert_relative_eq;

    fn basis() -> ProjectionBasis {
        ProjectionBasis {
            revenue: 1000.0,
            ebit: 200.0,
            ebit_margin: 0.20,
            growth: GrowthEstimate::flat(0.05),
        }
    }

    fn inputs(years: usize, terminal_growth: f64) -> DcfInputs {
        DcfInputs {
            tax_rate: 0.25,
            risk_free_rate: 0.04,
            market_risk_premium: 0.055,
            terminal_growth,
            forecast_years: years,
            percentages: RevenuePercentages::default(),
        }
    }

    #[test]
    fn test_two_year_projection() {
        let forecast = project(&basis(), &inputs(2, 0.02), 0.10).unwrap();
        let first = &forecast.rows[0];
        assert_relative_eq!(first.revenue, 1050.0, epsilon = 1e-9);
        assert_relative_eq!(first.ebit, 210.0, epsilon = 1e-9);
        assert_relative_eq!(first.tax, 52.5, epsilon = 1e-9);
        assert_relative_eq!(first.nopat, 157.5, epsilon = 1e-9);
        assert_relative_eq!(first.discounted_fcf, 143.181818, epsilon = 1e-6);
        assert_relative_eq!(forecast.rows[1].discounted_fcf, 136.673554, epsilon = 1e-6);
        assert_relative_eq!(forecast.terminal_value, 1879.261364, epsilon = 1e-6);
        assert_relative_eq!(forecast.enterprise_value(), 2159.116736, epsilon = 1e-4);
    }

    #[test]
    fn test_revenue_percentages_reduce_fcf() {
        let mut i = inputs(1, 0.02);
        i.percentages = RevenuePercentages {
            depreciation: 0.04,
            capex: 0.06,
            working_capital: 0.01,
        };
        let row = &project(&basis(), &i, 0.10).unwrap().rows[0];
        assert_relative_eq!(row.depreciation, 42.0, epsilon = 1e-9);
        assert_relative_eq!(row.capex, 63.0, epsilon = 1e-9);
        assert_relative_eq!(row.working_capital_change, 10.5, epsilon = 1e-9);
        assert_relative_eq!(row.free_cash_flow, 157.5 + 42.0 - 63.0 - 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_terminal_value_guard() {
        assert!(matches!(
            terminal_value(100.0, 0.08, 0.10),
            Err(ModelError::ValuationDegenerate { .. })
        ));
        assert!(terminal_value(100.0, 0.08, 0.08).is_err());
        assert!(matches!(
            project(&basis(), &inputs(2, 0.10), 0.08),
            Err(ModelError::ValuationDegenerate { .. })
        ));
    }

    #[test]
    fn test_equity_bridge() {
        let subject = PeerMetrics {
            total_debt: Some(300.0),
            cash: Some(100.0),
            shares_outstanding: Some(10.0),
            ..PeerMetrics::default()
        };
        let valuation = Valuation::compute(basis(), &inputs(2, 0.02), 0.10, &subject).unwrap();
        assert_relative_eq!(
            valuation.equity_value,
            valuation.enterprise_value - 200.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            valuation.per_share_value.unwrap(),
            valuation.equity_value / 10.0,
            epsilon = 1e-9
        );

        let no_shares = PeerMetrics {
            shares_outstanding: None,
            ..subject
        };
        let valuation = Valuation::compute(basis(), &inputs(2, 0.02), 0.10, &no_shares).unwrap();
        assert_eq!(valuation.per_share_value, None);
    }

    #[test]
    fn test_outcome_without_income_statement() {
        let subject = PeerMetrics {
            ticker: "ACME".to_string(),
            market_cap: Some(1000.0),
            total_debt: Some(0.0),
            debt_to_equity: Some(0.0),
            unlevered_beta: Some(1.0),
            ..PeerMetrics::default()
        };
        let outcome = DcfOutcome::compute(None, None, &subject, &[], inputs(5, 0.02));
        assert!(outcome.cost_of_capital.is_ok());
        assert!(matches!(
            outcome.valuation,
            Err(ModelError::MissingField(_))
        ));
        assert!(!outcome.is_degenerate());
        assert_eq!(outcome.implied.len(), 3);
    }
}
