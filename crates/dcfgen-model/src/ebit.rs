//! EBIT, EBITDA and effective tax rate.
//!
//! When a statement does not report EBIT directly it is rebuilt from net
//! income by adding back tax and net interest. Each add-back is applied only
//! when its line item is present in the period column.

use dcfgen_data::FinancialStatement;
use dcfgen_data::statement::items;

/// Default floor for the effective tax rate.
pub const DEFAULT_MIN_TAX_RATE: f64 = 0.20;

/// Add-back chain applied on top of net income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBacks {
    /// Tax provision and net interest
    Ebit,
    /// Tax provision, net interest and depreciation
    Ebitda,
}

/// Net income of `period` with the `add_backs` chain applied.
pub fn earnings_with_add_backs(
    statement: &FinancialStatement,
    period: usize,
    add_backs: AddBacks,
) -> Option<f64> {
    let mut total = statement.number(items::NET_INCOME, period)?;
    if let Some(tax) = statement.number(items::TAX_PROVISION, period) {
        total += tax;
    }
    if let Some(expense) = statement.number(items::INTEREST_EXPENSE, period) {
        total += expense;
    }
    if let Some(income) = statement.number(items::INTEREST_INCOME, period) {
        total -= income;
    }
    if add_backs == AddBacks::Ebitda
        && let Some(depreciation) = statement.number(items::RECONCILED_DEPRECIATION, period)
    {
        total += depreciation;
    }
    Some(total)
}

/// EBIT of `period`: the reported line item, else rebuilt from net income.
pub fn reconstruct_ebit(statement: &FinancialStatement, period: usize) -> Option<f64> {
    statement
        .number(items::EBIT, period)
        .or_else(|| earnings_with_add_backs(statement, period, AddBacks::Ebit))
}

/// EBITDA of `period`, rebuilt from net income.
pub fn reconstruct_ebitda(statement: &FinancialStatement, period: usize) -> Option<f64> {
    earnings_with_add_backs(statement, period, AddBacks::Ebitda)
}

/// Effective tax rate of the most recent period, floored at `min_rate`.
///
/// Uses the reported "Tax Rate for Calcs"; when that is zero or absent the
/// rate is recomputed as tax provision over pretax income.
pub fn effective_tax_rate(statement: &FinancialStatement, min_rate: f64) -> f64 {
    let period = statement.current_period();
    let reported = statement
        .number(items::TAX_RATE_FOR_CALCS, period)
        .filter(|rate| *rate != 0.0);
    let rate = reported.or_else(|| {
        let provision = statement.number(items::TAX_PROVISION, period)?;
        let pretax = statement.number(items::PRETAX_INCOME, period)?;
        (pretax != 0.0).then(|| provision / pretax)
    });
    rate.unwrap_or(0.0).max(min_rate)
}
