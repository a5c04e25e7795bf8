//! Revenue growth and EBIT margin.

use crate::ebit::reconstruct_ebit;
use crate::error::{ModelError, Result};
use dcfgen_data::statement::items;
use dcfgen_data::{AnalystGrowth, FinancialStatement};
use serde::Serialize;

/// Growth rates used by the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthEstimate {
    /// First forecast year
    pub year1: f64,
    /// Second forecast year
    pub year2: f64,
    /// Remaining forecast years
    pub blended: f64,
    /// Historical year-over-year revenue growth, oldest first
    pub historical: Vec<f64>,
}

impl GrowthEstimate {
    /// Same rate for every year.
    pub const fn flat(rate: f64) -> Self {
        Self {
            year1: rate,
            year2: rate,
            blended: rate,
            historical: Vec::new(),
        }
    }

    /// Growth rate for forecast year `index` (0-based).
    pub const fn rate_for_year(&self, index: usize) -> f64 {
        match index {
            0 => self.year1,
            1 => self.year2,
            _ => self.blended,
        }
    }
}

/// Year-over-year change of total revenue across the fiscal-year columns,
/// oldest to newest. Pairs with a missing or zero base are skipped.
pub fn historical_growth(statement: &FinancialStatement) -> Vec<f64> {
    let revenue: Vec<Option<f64>> = statement
        .fiscal_year_indices()
        .into_iter()
        .rev()
        .map(|col| statement.number(items::TOTAL_REVENUE, col))
        .collect();
    revenue
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev),
            _ => None,
        })
        .collect()
}

/// Estimate forecast growth.
///
/// With analyst estimates, year 1 and 2 are the estimates and the blended rate
/// averages the historical rates with both estimates. Without, every year uses
/// the historical mean.
pub fn estimate_growth(
    statement: &FinancialStatement,
    analyst: Option<&AnalystGrowth>,
) -> Result<GrowthEstimate> {
    let historical = historical_growth(statement);
    match analyst {
        Some(estimates) => {
            let rates: Vec<f64> = historical
                .iter()
                .copied()
                .chain([estimates.current_year, estimates.next_year])
                .collect();
            Ok(GrowthEstimate {
                year1: estimates.current_year,
                year2: estimates.next_year,
                blended: mean(&rates),
                historical,
            })
        }
        None if historical.is_empty() => Err(ModelError::ComputationBlocked(
            "no historical revenue growth and no analyst estimates".to_string(),
        )),
        None => {
            let rate = mean(&historical);
            Ok(GrowthEstimate {
                historical,
                ..GrowthEstimate::flat(rate)
            })
        }
    }
}

/// EBIT margin of the most recent period: EBIT / total revenue.
pub fn ebit_margin(statement: &FinancialStatement) -> Result<f64> {
    let period = statement.current_period();
    let ebit = reconstruct_ebit(statement, period)
        .ok_or_else(|| ModelError::MissingField(items::EBIT.to_string()))?;
    let revenue = statement
        .number(items::TOTAL_REVENUE, period)
        .ok_or_else(|| ModelError::MissingField(items::TOTAL_REVENUE.to_string()))?;
    if revenue == 0.0 {
        return Err(ModelError::ComputationBlocked(
            "EBIT margin with zero revenue".to_string(),
        ));
    }
    Ok(ebit / revenue)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
