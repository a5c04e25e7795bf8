//! Financial statement extraction.
//!
//! Statement pages list line-item labels and period headers separately from a
//! flat run of data cells. The cells are laid onto the (item, period) grid in
//! row-major order.

use crate::error::{DataError, Result};
use crate::locate::{element_text, selector};
use crate::normalize::{Value, normalize};
use chrono::NaiveDate;
use scraper::Html;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Statement container on the page.
const CONTAINER: &str = r#"section[data-test="qsp-financial"]"#;
/// Line-item labels inside the container.
const ITEM_LABEL: &str = r"span.Va\(m\)";
/// Period headers and data cells inside the container.
const CELL: &str = r"div.Ta\(c\)";

/// Label of the trailing-twelve-months column.
pub const TTM: &str = "TTM";

/// Standard line-item labels.
pub mod items {
    /// Total revenue
    pub const TOTAL_REVENUE: &str = "Total Revenue";
    /// Reported EBIT
    pub const EBIT: &str = "EBIT";
    /// Net income attributable to common stockholders
    pub const NET_INCOME: &str = "Net Income Common Stockholders";
    /// Income tax provision
    pub const TAX_PROVISION: &str = "Tax Provision";
    /// Pretax income
    pub const PRETAX_INCOME: &str = "Pretax Income";
    /// Effective tax rate used by the data provider
    pub const TAX_RATE_FOR_CALCS: &str = "Tax Rate for Calcs";
    /// Interest expense
    pub const INTEREST_EXPENSE: &str = "Interest Expense";
    /// Interest income
    pub const INTEREST_INCOME: &str = "Interest Income";
    /// Depreciation and amortization
    pub const RECONCILED_DEPRECIATION: &str = "Reconciled Depreciation";
    /// Capital expenditure (cash-flow statement, reported negative)
    pub const CAPITAL_EXPENDITURE: &str = "Capital Expenditure";
    /// Change in working capital (cash-flow statement)
    pub const CHANGE_IN_WORKING_CAPITAL: &str = "Change in working capital";
}

/// Kind of financial statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    /// Income statement
    IncomeStatement,
    /// Balance sheet
    BalanceSheet,
    /// Cash-flow statement
    CashFlow,
}

impl StatementKind {
    /// All statement kinds, in output order.
    pub const ALL: [Self; 3] = [Self::IncomeStatement, Self::BalanceSheet, Self::CashFlow];

    /// URL path segment of the statement page.
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "financials",
            Self::BalanceSheet => "balance-sheet",
            Self::CashFlow => "cash-flow",
        }
    }

    /// Human-readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A table of normalized values indexed by (line item, period).
///
/// Periods are ordered most recent first. Line items are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialStatement {
    kind: StatementKind,
    periods: Vec<String>,
    items: Vec<String>,
    rows: Vec<Vec<Value>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FinancialStatement {
    /// Build a statement from labels and a flat row-major run of cells.
    ///
    /// Repeated item labels keep their first row. Missing trailing cells are
    /// left empty; more cells than the grid holds is a shape mismatch.
    pub fn from_grid(
        kind: StatementKind,
        items: Vec<String>,
        periods: Vec<String>,
        cells: Vec<Value>,
    ) -> Result<Self> {
        if periods.is_empty() {
            return Err(DataError::shape(kind.slug(), "no period headers"));
        }
        if items.is_empty() {
            return Err(DataError::shape(kind.slug(), "no line items"));
        }
        let capacity = items.len() * periods.len();
        if cells.len() > capacity {
            return Err(DataError::shape(
                kind.slug(),
                format!(
                    "{} data cells for {} items x {} periods",
                    cells.len(),
                    items.len(),
                    periods.len()
                ),
            ));
        }
        if cells.len() < capacity {
            warn!(
                statement = kind.slug(),
                cells = cells.len(),
                capacity,
                "statement grid is short; trailing positions left empty"
            );
        }

        let mut grid = vec![vec![Value::empty(); periods.len()]; items.len()];
        for (i, cell) in cells.into_iter().enumerate() {
            let (row, col) = grid_position(i, periods.len());
            grid[row][col] = cell;
        }

        let mut statement = Self {
            kind,
            periods,
            items: Vec::with_capacity(items.len()),
            rows: Vec::with_capacity(items.len()),
            index: HashMap::new(),
        };
        for (item, row) in items.into_iter().zip(grid) {
            if statement.index.contains_key(&item) {
                warn!(statement = kind.slug(), item = %item, "duplicate line item dropped");
                continue;
            }
            statement.index.insert(item.clone(), statement.items.len());
            statement.items.push(item);
            statement.rows.push(row);
        }
        Ok(statement)
    }

    /// Statement kind.
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Period labels, most recent first.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Line-item labels in page order.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Iterate over (line item, row) pairs in page order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.items
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Row of a line item.
    pub fn row(&self, item: &str) -> Option<&[Value]> {
        self.index.get(item).map(|&i| self.rows[i].as_slice())
    }

    /// Value of a line item in a period column.
    pub fn get(&self, item: &str, period: usize) -> Option<&Value> {
        self.row(item)?.get(period)
    }

    /// Numeric value of a line item in a period column.
    pub fn number(&self, item: &str, period: usize) -> Option<f64> {
        self.get(item, period)?.as_number()
    }

    /// Column index of a period label.
    pub fn period_index(&self, label: &str) -> Option<usize> {
        self.periods.iter().position(|p| p == label)
    }

    /// Column index of the TTM period, if the statement has one.
    pub fn ttm_index(&self) -> Option<usize> {
        self.period_index(TTM)
    }

    /// Most recent column: TTM when present, otherwise the first column.
    pub fn current_period(&self) -> usize {
        self.ttm_index().unwrap_or(0)
    }

    /// Full fiscal-year columns (everything except TTM), most recent first.
    pub fn fiscal_year_indices(&self) -> Vec<usize> {
        let ttm = self.ttm_index();
        (0..self.periods.len()).filter(|&i| Some(i) != ttm).collect()
    }
}

/// Grid position of flat cell `index` for a statement with `num_periods` columns.
///
/// ```
/// assert_eq!(dcfgen_data::statement::grid_position(4, 3), (1, 1));
/// ```
pub const fn grid_position(index: usize, num_periods: usize) -> (usize, usize) {
    (index / num_periods, index % num_periods)
}

/// Render a period header: `MM/DD/YYYY` becomes `DD Month YYYY`, anything else
/// is upper-cased.
pub fn format_period(label: &str) -> String {
    let trimmed = label.trim();
    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").map_or_else(
        |_| trimmed.to_uppercase(),
        |date| date.format("%d %B %Y").to_string(),
    )
}

/// Extract a statement of `kind` from a statement page.
pub fn extract_statement(kind: StatementKind, markup: &str) -> Result<FinancialStatement> {
    let document = Html::parse_document(markup);
    let container_sel = selector(CONTAINER)?;
    let item_sel = selector(ITEM_LABEL)?;
    let cell_sel = selector(CELL)?;

    let container = document
        .select(&container_sel)
        .next()
        .ok_or_else(|| DataError::shape(kind.slug(), "statement section not found"))?;

    let items: Vec<String> = container.select(&item_sel).map(element_text).collect();

    let mut periods = Vec::new();
    let mut cells = Vec::new();
    for cell in container.select(&cell_sel) {
        let text = element_text(cell);
        if cell.value().attr("data-test").is_some() {
            cells.push(normalize(&text, false));
        } else {
            periods.push(format_period(&text));
        }
    }
    debug!(
        statement = kind.slug(),
        items = items.len(),
        periods = periods.len(),
        cells = cells.len(),
        "statement located"
    );

    FinancialStatement::from_grid(kind, items, periods, cells)
}
