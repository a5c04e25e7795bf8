//! Sheet builders.
//!
//! The DCF sheet keeps calculations within the sheet as formulas, each with the
//! value the model computed for it. Values that come from other sheets (peer
//! beta, balance-sheet figures, peer multiples) are written as plain numbers.

use crate::workbook::{Cell, Sheet, absolute_ref, cell_ref, column_name};
use dcfgen_data::{CompanyProfile, FinancialStatement};
use dcfgen_model::{DcfOutcome, Metric, ModelError, Multiple, PeerMetrics, Valuation};

/// Name of the peer-comparison sheet.
pub const PEERS_SHEET: &str = "Peers";
/// Name of the company-profile sheet.
pub const PROFILES_SHEET: &str = "Peer Summaries";
/// Name of the DCF sheet.
pub const DCF_SHEET: &str = "DCF";

const THOUSANDS_NOTE: &str = "*In thousands, except per-share items";
const PEERS_NOTE: &str = "*Total share count and all monetary values are in thousands of USD where applicable, except per-share items";
const DCF_NOTE: &str = "*In thousands, except per-share items. Next steps after generation: 1. Check that WACC inputs are correct (especially debt spread). 2. Update growth rates as desired. 3. Update all other DCF inputs as desired.";

/// Statement sheet: period headers in row 2, one line item per row below.
pub fn statement_sheet(statement: &FinancialStatement) -> Sheet {
    let mut sheet = Sheet::new(statement.kind().title());
    sheet.set(0, 0, THOUSANDS_NOTE);
    sheet.set(1, 0, statement.kind().title().to_uppercase());
    sheet.set_row(1, 1, statement.periods().iter().map(String::as_str));
    for (i, (item, values)) in statement.rows().enumerate() {
        sheet.set(i + 2, 0, item);
        sheet.set_row(i + 2, 1, values.iter().cloned());
    }
    sheet
}

/// Row of the subject on the peer sheet; peers follow.
pub const PEERS_SUBJECT_ROW: usize = 3;

/// Peer-comparison sheet: tax rate, column headers, the subject, then peers.
pub fn peers_sheet(tax_rate: f64, subject: &PeerMetrics, peers: &[PeerMetrics]) -> Sheet {
    let mut sheet = Sheet::new(PEERS_SHEET);
    sheet.set(0, 0, PEERS_NOTE);
    sheet.set(1, 0, "Assumed tax rate:");
    sheet.set(1, 1, tax_rate);
    sheet.set_row(2, 0, Metric::ALL.iter().map(|m| m.label()));
    for (offset, metrics) in std::iter::once(subject).chain(peers).enumerate() {
        sheet.set_row(
            PEERS_SUBJECT_ROW + offset,
            0,
            Metric::ALL.iter().map(|m| metrics.value(*m)),
        );
    }
    sheet
}

/// Profile sheet: one row per company, the subject first.
pub fn profiles_sheet(profiles: &[CompanyProfile]) -> Sheet {
    let mut sheet = Sheet::new(PROFILES_SHEET);
    sheet.set_row(
        0,
        0,
        ["Peer", "Sector", "Industry", "Employees", "Summary", "Link"],
    );
    for (i, profile) in profiles.iter().enumerate() {
        let row = i + 1;
        let name = profile.name.as_deref().unwrap_or(&profile.ticker);
        sheet.set(row, 0, name);
        sheet.set(row, 1, optional_text(profile.sector.as_deref()));
        sheet.set(row, 2, optional_text(profile.industry.as_deref()));
        sheet.set(row, 3, profile.employees.map(|e| e as f64));
        sheet.set(row, 4, optional_text(profile.description.as_deref()));
        sheet.set(row, 5, profile.link.as_str());
    }
    sheet
}

fn optional_text(text: Option<&str>) -> Cell {
    text.map_or(Cell::Empty, Cell::text)
}

/// Content of the DCF sheet.
#[derive(Debug, Clone, Copy)]
pub struct DcfSheetInput<'a> {
    /// Subject ticker
    pub ticker: &'a str,
    /// Year of the actual (TTM) column; forecast years follow it
    pub base_year: i32,
    /// Subject metrics, for the balance-sheet inputs and implied values
    pub subject: &'a PeerMetrics,
    /// Computed model
    pub outcome: &'a DcfOutcome,
    /// Text for the analyst notes section
    pub notes: Option<&'a str>,
}

/// Zero-based rows and columns of the DCF sheet.
pub mod layout {
    /// Cost of capital section header
    pub const COST_OF_CAPITAL_HEADER: usize = 1;
    /// Cost of equity, cost of debt and WACC sub-headers
    pub const COST_OF_CAPITAL_SUBHEADER: usize = 2;
    /// First row of the cost of capital block
    pub const COST_OF_CAPITAL_FIRST: usize = 3;
    /// Cost of equity column pair
    pub const EQUITY_COL: usize = 0;
    /// Cost of debt column pair
    pub const DEBT_COL: usize = 3;
    /// WACC column pair
    pub const WACC_COL: usize = 6;

    /// Model inputs section header
    pub const INPUTS_HEADER: usize = 10;
    /// Cost of capital input
    pub const INPUT_WACC: usize = 11;
    /// Terminal growth input
    pub const INPUT_TERMINAL_GROWTH: usize = 12;
    /// Tax rate input
    pub const INPUT_TAX_RATE: usize = 13;
    /// Depreciation / revenue input
    pub const INPUT_DEPRECIATION: usize = 14;
    /// Capex / revenue input
    pub const INPUT_CAPEX: usize = 15;
    /// Working capital / revenue input
    pub const INPUT_WORKING_CAPITAL: usize = 16;
    /// Current debt input
    pub const INPUT_DEBT: usize = 17;
    /// Current cash input
    pub const INPUT_CASH: usize = 18;
    /// Shares outstanding input
    pub const INPUT_SHARES: usize = 19;

    /// Model section header
    pub const MODEL_HEADER: usize = 22;
    /// Degenerate or unavailable valuation flag
    pub const MODEL_FLAG: usize = 23;
    /// Revenue growth row
    pub const GROWTH: usize = 24;
    /// EBIT margin row
    pub const MARGIN: usize = 25;
    /// Year headers
    pub const YEARS: usize = 26;
    /// Revenue row
    pub const REVENUE: usize = 27;
    /// EBIT row
    pub const EBIT: usize = 28;
    /// Tax row
    pub const TAX: usize = 29;
    /// NOPAT row
    pub const NOPAT: usize = 30;
    /// Depreciation row
    pub const DEPRECIATION: usize = 31;
    /// Capex row
    pub const CAPEX: usize = 32;
    /// Working capital row
    pub const WORKING_CAPITAL: usize = 33;
    /// Free cash flow row
    pub const FCF: usize = 34;
    /// Discounted free cash flow row
    pub const DISCOUNTED_FCF: usize = 35;
    /// Terminal value row
    pub const TERMINAL_VALUE: usize = 36;
    /// Column of the actual year; forecast years follow
    pub const ACTUAL_COL: usize = 1;

    /// Outputs section header
    pub const OUTPUTS_HEADER: usize = 40;
    /// Enterprise value
    pub const ENTERPRISE_VALUE: usize = 41;
    /// Equity value
    pub const EQUITY_VALUE: usize = 42;
    /// Equity value per share
    pub const PER_SHARE: usize = 43;

    /// Implied valuations section header
    pub const IMPLIED_HEADER: usize = 47;
    /// Implied valuations sub-headers
    pub const IMPLIED_SUBHEADER: usize = 48;
    /// First multiple row
    pub const IMPLIED_FIRST: usize = 49;

    /// Notes section header
    pub const NOTES_HEADER: usize = 55;
    /// Notes text
    pub const NOTES: usize = 56;

    /// Value column of the label/value pairs
    pub const VALUE_COL: usize = 1;
}

use layout::*;

fn input_ref(row: usize) -> String {
    absolute_ref(row, VALUE_COL)
}

/// Build the DCF sheet.
pub fn dcf_sheet(input: &DcfSheetInput<'_>) -> Sheet {
    let mut sheet = Sheet::new(DCF_SHEET);
    sheet.set(0, 0, DCF_NOTE);
    write_cost_of_capital(&mut sheet, input);
    write_inputs(&mut sheet, input);
    let last_col = write_model(&mut sheet, input);
    write_outputs(&mut sheet, input, last_col);
    write_implied(&mut sheet, input);
    sheet.set(NOTES_HEADER, 0, "Analyst Notes");
    if let Some(notes) = input.notes {
        sheet.set(NOTES, 0, notes);
    }
    sheet
}

fn write_cost_of_capital(sheet: &mut Sheet, input: &DcfSheetInput<'_>) {
    let inputs = &input.outcome.inputs;
    let coc = input.outcome.cost_of_capital.as_ref().ok();
    let r = COST_OF_CAPITAL_FIRST;

    sheet.set(COST_OF_CAPITAL_HEADER, 0, "Cost of Capital");
    sheet.set(COST_OF_CAPITAL_SUBHEADER, EQUITY_COL, "Cost of Equity");
    sheet.set(COST_OF_CAPITAL_SUBHEADER, DEBT_COL, "Cost of Debt");
    sheet.set(COST_OF_CAPITAL_SUBHEADER, WACC_COL, "WACC");

    let e = EQUITY_COL + 1;
    sheet.set(r, EQUITY_COL, "Risk Free Rate");
    sheet.set(r, e, inputs.risk_free_rate);
    sheet.set(r + 1, EQUITY_COL, "Market Risk Premium");
    sheet.set(r + 1, e, inputs.market_risk_premium);
    sheet.set(r + 2, EQUITY_COL, "Beta");
    sheet.set(r + 2, e, coc.map(|c| c.beta));
    sheet.set(r + 3, EQUITY_COL, "Cost of Equity");
    sheet.set(
        r + 3,
        e,
        Cell::formula(
            format!(
                "={}+{}*{}",
                cell_ref(r, e),
                cell_ref(r + 1, e),
                cell_ref(r + 2, e)
            ),
            coc.map(|c| c.cost_of_equity),
        ),
    );

    let d = DEBT_COL + 1;
    sheet.set(r, DEBT_COL, "Risk Free Rate");
    sheet.set(r, d, inputs.risk_free_rate);
    sheet.set(r + 1, DEBT_COL, "Spread");
    sheet.set(r + 1, d, coc.map(|c| c.spread));
    if let Some(c) = coc {
        sheet.set(r + 1, d + 1, c.spread_source.label());
    }
    sheet.set(r + 2, DEBT_COL, "Cost of Debt");
    sheet.set(
        r + 2,
        d,
        Cell::formula(
            format!("={}+{}", cell_ref(r, d), cell_ref(r + 1, d)),
            coc.map(|c| c.cost_of_debt),
        ),
    );

    let w = WACC_COL + 1;
    sheet.set(r, WACC_COL, "Weight of Equity");
    sheet.set(r, w, coc.map(|c| c.equity_weight));
    sheet.set(r + 1, WACC_COL, "Weight of Debt");
    sheet.set(r + 1, w, coc.map(|c| c.debt_weight));
    sheet.set(r + 2, WACC_COL, "WACC");
    sheet.set(
        r + 2,
        w,
        Cell::formula(
            format!(
                "={}*{}+{}*(1-{})*{}",
                cell_ref(r + 3, e),
                cell_ref(r, w),
                cell_ref(r + 2, d),
                input_ref(INPUT_TAX_RATE),
                cell_ref(r + 1, w)
            ),
            coc.map(|c| c.wacc),
        ),
    );

    if let Err(err) = &input.outcome.cost_of_capital {
        sheet.set(r + 4, EQUITY_COL, format!("Cost of capital unavailable: {err}"));
    }
}

fn write_inputs(sheet: &mut Sheet, input: &DcfSheetInput<'_>) {
    let inputs = &input.outcome.inputs;
    let pct = &inputs.percentages;
    let wacc = input.outcome.cost_of_capital.as_ref().ok().map(|c| c.wacc);
    let wacc_ref = cell_ref(COST_OF_CAPITAL_FIRST + 2, WACC_COL + 1);

    sheet.set(INPUTS_HEADER, 0, "DCF Model Inputs");
    let rows: [(usize, &str, Cell); 9] = [
        (
            INPUT_WACC,
            "Cost of Capital",
            Cell::formula(format!("={wacc_ref}"), wacc),
        ),
        (
            INPUT_TERMINAL_GROWTH,
            "Terminal Growth Rate",
            inputs.terminal_growth.into(),
        ),
        (INPUT_TAX_RATE, "Tax Rate", inputs.tax_rate.into()),
        (
            INPUT_DEPRECIATION,
            "Dep & Amort / Revenue",
            pct.depreciation.into(),
        ),
        (INPUT_CAPEX, "CAPEX / Revenue", pct.capex.into()),
        (
            INPUT_WORKING_CAPITAL,
            "Change in Net Working Capital / Revenue",
            pct.working_capital.into(),
        ),
        (
            INPUT_DEBT,
            "Current Debt Value",
            input.subject.total_debt.into(),
        ),
        (INPUT_CASH, "Current Cash Value", input.subject.cash.into()),
        (
            INPUT_SHARES,
            "Shares Outstanding",
            input.subject.shares_outstanding.into(),
        ),
    ];
    for (row, label, cell) in rows {
        sheet.set(row, 0, label);
        sheet.set(row, VALUE_COL, cell);
    }
}

/// Writes the forecast and returns the column of the final forecast year.
fn write_model(sheet: &mut Sheet, input: &DcfSheetInput<'_>) -> usize {
    sheet.set(MODEL_HEADER, 0, "DCF Model");
    for (row, label) in [
        (GROWTH, "Revenue Growth"),
        (MARGIN, "EBIT Margin"),
        (REVENUE, "Revenue"),
        (EBIT, "EBIT"),
        (TAX, "Tax"),
        (NOPAT, "NOPAT"),
        (DEPRECIATION, "Depreciation & Amortization"),
        (CAPEX, "Capital Expenditures"),
        (WORKING_CAPITAL, "Increase in Working Capital"),
        (FCF, "Free Cash Flow"),
        (DISCOUNTED_FCF, "Discounted FCF"),
        (TERMINAL_VALUE, "Terminal Value"),
    ] {
        sheet.set(row, 0, label);
    }

    let years = input.outcome.inputs.forecast_years;
    sheet.set(YEARS, ACTUAL_COL, format!("{} Actual", input.base_year));
    for i in 0..years {
        sheet.set(
            YEARS,
            ACTUAL_COL + 1 + i,
            f64::from(input.base_year) + 1.0 + i as f64,
        );
    }
    let last_col = ACTUAL_COL + years;

    let valuation = match &input.outcome.valuation {
        Ok(valuation) => valuation,
        Err(e) => {
            sheet.set(MODEL_FLAG, 0, valuation_flag(e));
            return last_col;
        }
    };

    sheet.set(REVENUE, ACTUAL_COL, valuation.basis.revenue);
    sheet.set(EBIT, ACTUAL_COL, valuation.basis.ebit);

    let tax = input_ref(INPUT_TAX_RATE);
    let wacc = input_ref(INPUT_WACC);
    for (i, row) in valuation.forecast.rows.iter().enumerate() {
        let col = ACTUAL_COL + 1 + i;
        let c = column_name(col);
        let p = column_name(col - 1);
        let n = |r: usize| r + 1;

        sheet.set(GROWTH, col, row.growth);
        sheet.set(MARGIN, col, valuation.basis.ebit_margin);
        let formulas = [
            (
                REVENUE,
                format!("={p}{}*({c}{}+1)", n(REVENUE), n(GROWTH)),
                row.revenue,
            ),
            (
                EBIT,
                format!("={c}{}*{c}{}", n(REVENUE), n(MARGIN)),
                row.ebit,
            ),
            (TAX, format!("={c}{}*{tax}", n(EBIT)), row.tax),
            (
                NOPAT,
                format!("={c}{}-{c}{}", n(EBIT), n(TAX)),
                row.nopat,
            ),
            (
                DEPRECIATION,
                format!("={c}{}*{}", n(REVENUE), input_ref(INPUT_DEPRECIATION)),
                row.depreciation,
            ),
            (
                CAPEX,
                format!("={c}{}*{}", n(REVENUE), input_ref(INPUT_CAPEX)),
                row.capex,
            ),
            (
                WORKING_CAPITAL,
                format!("={c}{}*{}", n(REVENUE), input_ref(INPUT_WORKING_CAPITAL)),
                row.working_capital_change,
            ),
            (
                FCF,
                format!(
                    "={c}{}+{c}{}-{c}{}-{c}{}",
                    n(NOPAT),
                    n(DEPRECIATION),
                    n(CAPEX),
                    n(WORKING_CAPITAL)
                ),
                row.free_cash_flow,
            ),
            (
                DISCOUNTED_FCF,
                format!("={c}{}/((1+{wacc})^{})", n(FCF), row.year),
                row.discounted_fcf,
            ),
        ];
        for (r, formula, value) in formulas {
            sheet.set(r, col, Cell::formula(formula, Some(value)));
        }
    }

    let c = column_name(last_col);
    sheet.set(
        TERMINAL_VALUE,
        last_col,
        Cell::formula(
            format!(
                "={c}{}/(1+{wacc})/({wacc}-{})",
                FCF + 1,
                input_ref(INPUT_TERMINAL_GROWTH)
            ),
            Some(valuation.forecast.terminal_value),
        ),
    );
    last_col
}

fn valuation_flag(error: &ModelError) -> String {
    match error {
        ModelError::ValuationDegenerate { .. } => format!("VALUATION DEGENERATE: {error}"),
        other => format!("Valuation unavailable: {other}"),
    }
}

fn write_outputs(sheet: &mut Sheet, input: &DcfSheetInput<'_>, last_col: usize) {
    sheet.set(OUTPUTS_HEADER, 0, "DCF Model Outputs");
    sheet.set(ENTERPRISE_VALUE, 0, "Enterprise Value");
    sheet.set(EQUITY_VALUE, 0, "Equity Value");
    sheet.set(PER_SHARE, 0, "Equity Value per Share");

    let Ok(valuation) = &input.outcome.valuation else {
        let flag = if input.outcome.is_degenerate() {
            "DEGENERATE"
        } else {
            "N/A"
        };
        for row in [ENTERPRISE_VALUE, EQUITY_VALUE, PER_SHARE] {
            sheet.set(row, VALUE_COL, flag);
        }
        return;
    };
    write_valuation_outputs(sheet, valuation, last_col);
}

fn write_valuation_outputs(sheet: &mut Sheet, valuation: &Valuation, last_col: usize) {
    let first = absolute_ref(DISCOUNTED_FCF, ACTUAL_COL + 1);
    let last = absolute_ref(TERMINAL_VALUE, last_col);
    sheet.set(
        ENTERPRISE_VALUE,
        VALUE_COL,
        Cell::formula(
            format!("=SUM({first}:{last})"),
            Some(valuation.enterprise_value),
        ),
    );
    sheet.set(
        EQUITY_VALUE,
        VALUE_COL,
        Cell::formula(
            format!(
                "={}-{}+{}",
                input_ref(ENTERPRISE_VALUE),
                input_ref(INPUT_DEBT),
                input_ref(INPUT_CASH)
            ),
            Some(valuation.equity_value),
        ),
    );
    sheet.set(
        PER_SHARE,
        VALUE_COL,
        Cell::formula(
            format!(
                "={}/{}",
                input_ref(EQUITY_VALUE),
                input_ref(INPUT_SHARES)
            ),
            valuation.per_share_value,
        ),
    );
}

fn write_implied(sheet: &mut Sheet, input: &DcfSheetInput<'_>) {
    sheet.set(IMPLIED_HEADER, 0, "Peer Implied Valuations");
    sheet.set_row(
        IMPLIED_SUBHEADER,
        1,
        [
            input.ticker,
            "Peer Average",
            "Peer Minimum",
            "Peer Maximum",
            "Subject Metric",
            "Implied Valuation",
            "Implied Range Minimum",
            "Implied Range Maximum",
        ],
    );

    let shares = input_ref(INPUT_SHARES);
    let debt = input_ref(INPUT_DEBT);
    let cash = input_ref(INPUT_CASH);
    for (i, range) in input.outcome.implied.iter().enumerate() {
        let row = IMPLIED_FIRST + i;
        let r = row + 1;
        sheet.set(row, 0, range.multiple.label());
        sheet.set(row, 1, range.subject);
        sheet.set(row, 2, range.peers.average);
        sheet.set(row, 3, range.peers.minimum);
        sheet.set(row, 4, range.peers.maximum);
        sheet.set(row, 5, range.multiple.base_metric(input.subject));

        let implied = [
            range.implied_average,
            range.implied_minimum,
            range.implied_maximum,
        ];
        for (offset, value) in implied.into_iter().enumerate() {
            let m = column_name(2 + offset);
            let formula = match range.multiple {
                Multiple::PriceEarnings => {
                    format!("=IF({m}{r}>0,{m}{r}*$F{r}/{shares},\"\")")
                }
                Multiple::EvSales | Multiple::EvEbitda => {
                    format!("=IF({m}{r}>0,({cash}-{debt}+{m}{r}*$F{r})/{shares},\"\")")
                }
            };
            sheet.set(row, 6 + offset, Cell::formula(formula, value));
        }
    }
}
