//! DCF assumptions and revenue-driven percentages.

use crate::error::{ModelError, Result};
use crate::growth::mean;
use dcfgen_data::FinancialStatement;
use dcfgen_data::statement::items;
use serde::Serialize;

/// Line items that scale with revenue in the forecast, as fractions of revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RevenuePercentages {
    /// Depreciation and amortization
    pub depreciation: f64,
    /// Capital expenditure, positive when cash is spent
    pub capex: f64,
    /// Increase in net working capital, positive when cash is absorbed
    pub working_capital: f64,
}

/// Averages over the fiscal-year columns of the income statement.
///
/// Depreciation comes from the income statement; capex and the working-capital
/// change come from the cash-flow statement, matched by period label and sign
/// flipped so that cash outflows are positive. A missing line item gives 0.
pub fn revenue_percentages(
    income: &FinancialStatement,
    cash_flow: Option<&FinancialStatement>,
) -> RevenuePercentages {
    let depreciation = mean_ratio(income, income, items::RECONCILED_DEPRECIATION);
    let (capex, working_capital) = cash_flow.map_or((0.0, 0.0), |cf| {
        (
            -mean_ratio(income, cf, items::CAPITAL_EXPENDITURE),
            -mean_ratio(income, cf, items::CHANGE_IN_WORKING_CAPITAL),
        )
    });
    RevenuePercentages {
        depreciation,
        capex,
        working_capital,
    }
}

/// Mean of `item / revenue` over the income statement's fiscal-year columns
/// for which both values are known and revenue is non-zero.
fn mean_ratio(income: &FinancialStatement, source: &FinancialStatement, item: &str) -> f64 {
    let ratios: Vec<f64> = income
        .fiscal_year_indices()
        .into_iter()
        .filter_map(|col| {
            let revenue = income.number(items::TOTAL_REVENUE, col)?;
            let source_col = source.period_index(&income.periods()[col])?;
            let value = source.number(item, source_col)?;
            (revenue != 0.0).then(|| value / revenue)
        })
        .collect();
    if ratios.is_empty() { 0.0 } else { mean(&ratios) }
}

/// Inputs of the DCF model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfInputs {
    /// Effective tax rate
    pub tax_rate: f64,
    /// Risk-free rate
    pub risk_free_rate: f64,
    /// Market risk premium
    pub market_risk_premium: f64,
    /// Perpetual growth after the forecast horizon
    pub terminal_growth: f64,
    /// Number of forecast years
    pub forecast_years: usize,
    /// Revenue percentages
    pub percentages: RevenuePercentages,
}

impl DcfInputs {
    /// Check that the inputs describe a computable model.
    pub fn validate(&self) -> Result<()> {
        if self.forecast_years == 0 {
            return Err(ModelError::InvalidInput(
                "forecast horizon must be at least one year".to_string(),
            ));
        }
        let rates = [
            ("tax rate", self.tax_rate),
            ("risk-free rate", self.risk_free_rate),
            ("market risk premium", self.market_risk_premium),
            ("terminal growth", self.terminal_growth),
        ];
        if let Some((name, _)) = rates.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::InvalidInput(format!("{name} is not finite")));
        }
        Ok(())
    }
}
