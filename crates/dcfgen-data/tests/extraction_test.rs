//! Extraction over recorded pages.

use approx::assert_relative_eq;
use dcfgen_data::statement::items;
use dcfgen_data::{
    MemoryFetcher, PageFetcher, PageKind, StatementKind, extract_analyst_growth,
    extract_bond_summary, extract_key_statistics, extract_profile, extract_quote_price,
    extract_related, extract_statement,
};

const INCOME: &str = include_str!("fixtures/income_statement.html");
const BALANCE: &str = include_str!("fixtures/balance_sheet.html");
const CASH_FLOW: &str = include_str!("fixtures/cash_flow.html");
const KEY_STATS: &str = include_str!("fixtures/key_statistics_acme.html");
const BONDS: &str = include_str!("fixtures/bonds_acme.html");
const PROFILE: &str = include_str!("fixtures/profile_acme.html");
const ANALYSIS: &str = include_str!("fixtures/analysis_acme.html");
const QUOTE: &str = include_str!("fixtures/quote_acme.html");
const TREASURY: &str = include_str!("fixtures/quote_tnx.html");

#[test]
fn test_income_statement_page() {
    let statement = extract_statement(StatementKind::IncomeStatement, INCOME).unwrap();
    assert_eq!(
        statement.periods(),
        ["TTM", "31 December 2023", "31 December 2022", "31 December 2021"]
    );
    assert_eq!(statement.items().len(), 9);
    assert_eq!(statement.number(items::TOTAL_REVENUE, 0), Some(1_100_000.0));
    assert_eq!(statement.number(items::TOTAL_REVENUE, 3), Some(800_000.0));
    assert_eq!(statement.number(items::TAX_RATE_FOR_CALCS, 0), Some(0.21));
    assert_eq!(statement.fiscal_year_indices(), vec![1, 2, 3]);
}

#[test]
fn test_balance_sheet_has_no_ttm() {
    let statement = extract_statement(StatementKind::BalanceSheet, BALANCE).unwrap();
    assert_eq!(statement.ttm_index(), None);
    assert_eq!(statement.current_period(), 0);
    assert_eq!(statement.number("Total Debt", 0), Some(500_000.0));
}

#[test]
fn test_cash_flow_page() {
    let statement = extract_statement(StatementKind::CashFlow, CASH_FLOW).unwrap();
    assert_eq!(
        statement.number(items::CAPITAL_EXPENDITURE, 1),
        Some(-60_000.0)
    );
    assert_eq!(
        statement.number(items::CHANGE_IN_WORKING_CAPITAL, 3),
        Some(-8_000.0)
    );
}

#[test]
fn test_key_statistics_page() {
    let stats = extract_key_statistics("ACME", KEY_STATS);
    assert_eq!(stats.name.as_deref(), Some("Acme Corp (ACME)"));
    assert_relative_eq!(stats.share_price.unwrap(), 50.0);
    assert_relative_eq!(stats.shares_outstanding.unwrap(), 20_000.0);
    assert_relative_eq!(stats.ltm_sales.unwrap(), 1_100_000.0);
    assert_relative_eq!(stats.ltm_earnings.unwrap(), 118_500.0);
    assert_relative_eq!(stats.total_cash.unwrap(), 150_000.0);
    assert_relative_eq!(stats.total_debt.unwrap(), 500_000.0);
    assert_relative_eq!(stats.return_on_equity.unwrap(), 0.115, epsilon = 1e-12);
    assert_eq!(stats.ltm_ebitda, None);
}

#[test]
fn test_bond_page() {
    let bonds = extract_bond_summary(BONDS);
    assert_relative_eq!(bonds.spread_10y.unwrap(), 0.015, epsilon = 1e-12);
    assert_relative_eq!(bonds.spread_30y.unwrap(), 0.02, epsilon = 1e-12);
    assert_eq!(bonds.rating.as_deref(), Some("BBB+"));
}

#[test]
fn test_profile_analysis_and_quote_pages() {
    let profile = extract_profile("ACME", Some(PROFILE));
    assert_eq!(profile.sector.as_deref(), Some("Industrials"));
    assert_eq!(
        profile.industry.as_deref(),
        Some("Specialty Industrial Machinery")
    );
    assert_eq!(profile.employees, Some(12_400));
    assert!(
        profile
            .description
            .as_deref()
            .is_some_and(|d| d.starts_with("Acme Corp designs"))
    );

    let growth = extract_analyst_growth(ANALYSIS).unwrap();
    assert_relative_eq!(growth.current_year, 0.062, epsilon = 1e-12);
    assert_relative_eq!(growth.next_year, 0.05, epsilon = 1e-12);

    assert_eq!(extract_related(QUOTE), vec!["BBB", "CCC"]);
    assert_eq!(extract_quote_price(TREASURY), Some(4.0));
}

#[tokio::test]
async fn test_memory_fetcher_round_trip() {
    let fetcher = MemoryFetcher::new()
        .with_page(PageKind::Statement(StatementKind::IncomeStatement), "ACME", INCOME)
        .with_page(PageKind::KeyStatistics, "ACME", KEY_STATS);

    let markup = fetcher
        .fetch(PageKind::Statement(StatementKind::IncomeStatement), "ACME")
        .await
        .unwrap()
        .unwrap();
    assert!(extract_statement(StatementKind::IncomeStatement, &markup).is_ok());
    assert!(
        fetcher
            .fetch(PageKind::Bonds, "ACME")
            .await
            .unwrap()
            .is_none()
    );
}
