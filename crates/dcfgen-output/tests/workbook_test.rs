//! A workbook assembled from recorded pages and written to disk.

use approx::assert_relative_eq;
use dcfgen_data::{StatementKind, extract_analyst_growth, extract_profile, extract_statement};
use dcfgen_model::{
    DcfInputs, DcfOutcome, effective_tax_rate, extract_peer_metrics, revenue_percentages,
};
use dcfgen_output::{
    Cell, DCF_SHEET, DcfSheetInput, ExportFormat, Exporter, PEERS_SHEET, PROFILES_SHEET,
    Workbook, WorkbookSink,
};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../dcfgen-data/tests/fixtures");

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{FIXTURES}/{name}")).unwrap()
}

fn workbook() -> Workbook {
    let statements: Vec<_> = [
        (StatementKind::IncomeStatement, "income_statement.html"),
        (StatementKind::BalanceSheet, "balance_sheet.html"),
        (StatementKind::CashFlow, "cash_flow.html"),
    ]
    .into_iter()
    .map(|(kind, file)| extract_statement(kind, &fixture(file)).unwrap())
    .collect();
    let income = &statements[0];
    let tax_rate = effective_tax_rate(income, 0.2);

    let subject = extract_peer_metrics(
        "ACME",
        &fixture("key_statistics_acme.html"),
        Some(&fixture("bonds_acme.html")),
        tax_rate,
        Some(income),
    );
    let peers = vec![
        extract_peer_metrics("BBB", &fixture("key_statistics_bbb.html"), None, tax_rate, None),
        extract_peer_metrics("CCC", &fixture("key_statistics_ccc.html"), None, tax_rate, None),
    ];
    let profiles = vec![
        extract_profile("ACME", Some(&fixture("profile_acme.html"))),
        extract_profile("BBB", None),
        extract_profile("CCC", None),
    ];
    let analyst = extract_analyst_growth(&fixture("analysis_acme.html"));
    let inputs = DcfInputs {
        tax_rate,
        risk_free_rate: 0.04,
        market_risk_premium: 0.055,
        terminal_growth: 0.018050372,
        forecast_years: 5,
        percentages: revenue_percentages(income, Some(&statements[2])),
    };
    let outcome = DcfOutcome::compute(Some(income), analyst.as_ref(), &subject, &peers, inputs);

    let mut book = Workbook::new();
    for statement in &statements {
        book.write_statement(statement).unwrap();
    }
    book.write_peers(tax_rate, &subject, &peers).unwrap();
    book.write_profiles(&profiles).unwrap();
    book.write_dcf(&DcfSheetInput {
        ticker: "ACME",
        base_year: 2024,
        subject: &subject,
        outcome: &outcome,
        notes: None,
    })
    .unwrap();
    book
}

#[test]
fn test_sheet_order() {
    let book = workbook();
    let names: Vec<&str> = book.sheets().iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        [
            "Income Statement",
            "Balance Sheet",
            "Cash Flow",
            PEERS_SHEET,
            PROFILES_SHEET,
            DCF_SHEET
        ]
    );
}

#[test]
fn test_dcf_sheet_values() {
    let book = workbook();
    let dcf = book.sheet(DCF_SHEET).unwrap();

    assert_relative_eq!(
        dcf.get_ref("H6").and_then(Cell::number).unwrap(),
        0.090939970891,
        epsilon = 1e-9
    );
    assert_eq!(dcf.get_ref("B28"), Some(&Cell::Number(1_100_000.0)));
    assert_relative_eq!(
        dcf.get_ref("C28").and_then(Cell::number).unwrap(),
        1_168_200.0,
        epsilon = 1e-6
    );
    assert_relative_eq!(
        dcf.get_ref("B42").and_then(Cell::number).unwrap(),
        2_335_394.8988,
        epsilon = 1e-2
    );
    assert_relative_eq!(
        dcf.get_ref("B44").and_then(Cell::number).unwrap(),
        99.269745,
        epsilon = 1e-5
    );
    assert_eq!(dcf.get_ref("F5"), Some(&Cell::text("30Y bond spread")));
}

#[test]
fn test_peer_and_profile_sheets() {
    let book = workbook();
    let peers = book.sheet(PEERS_SHEET).unwrap();
    assert_eq!(peers.get_ref("A4"), Some(&Cell::text("Acme Corp (ACME)")));
    assert_eq!(peers.get_ref("A6"), Some(&Cell::text("Charlie Holdings (CCC)")));
    // CCC has negative EBITDA, so EV/EBITDA floors at zero
    assert_eq!(peers.get_ref("D6"), Some(&Cell::Number(0.0)));

    let profiles = book.sheet(PROFILES_SHEET).unwrap();
    assert!(matches!(profiles.get_ref("B2"), Some(Cell::Text(s)) if s == "Industrials"));
    assert!(matches!(profiles.get_ref("F3"), Some(Cell::Text(s)) if s.ends_with("/BBB")));
}

#[test]
fn test_export_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ACME");
    workbook().export_to_file(&out, ExportFormat::Csv).unwrap();

    for stem in [
        "income-statement",
        "balance-sheet",
        "cash-flow",
        "peers",
        "peer-summaries",
        "dcf",
    ] {
        assert!(out.join(format!("{stem}.csv")).is_file(), "{stem}.csv missing");
    }
    let dcf = std::fs::read_to_string(out.join("dcf.csv")).unwrap();
    assert!(dcf.contains("=SUM($C$36:$G$37)"));
    let income = std::fs::read_to_string(out.join("income-statement.csv")).unwrap();
    assert!(income.contains("Total Revenue,1100000,1000000,900000,800000"));
}

#[test]
fn test_export_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ACME.json");
    workbook()
        .export_to_file(&out, ExportFormat::PrettyJson)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let sheets = json["sheets"].as_array().unwrap();
    assert_eq!(sheets.len(), 6);
    assert_eq!(sheets[5]["name"], "DCF");
    let ev = &sheets[5]["rows"][41][1];
    assert_eq!(ev["type"], "formula");
    assert_relative_eq!(
        ev["value"]["value"].as_f64().unwrap(),
        2_335_394.8988,
        epsilon = 1e-2
    );
}
