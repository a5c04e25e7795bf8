//! End-to-end run: fetch pages, extract, value, and render.
//!
//! Only two failures stop a run: an invalid request or configuration, and a
//! risk-free rate that can neither be taken from the configuration nor read
//! from the Treasury quote. Every other page that is missing or malformed
//! degrades the record it feeds and is listed in [`Report::degraded`].

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::peers::{QuotePageRelations, generate_peers};
use dcfgen_data::quote::TREASURY_10Y;
use dcfgen_data::{
    AnalystGrowth, CompanyProfile, DataError, FinancialStatement, PageFetcher, PageKind,
    StatementKind, extract_analyst_growth, extract_profile, extract_quote_price,
    extract_statement,
};
use dcfgen_model::{
    DcfInputs, DcfOutcome, PeerMetrics, Valuation, effective_tax_rate, extract_peer_metrics,
    revenue_percentages,
};
use dcfgen_output::{DcfSheetInput, WorkbookSink};
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{debug, info, warn};

/// What to value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Subject ticker
    pub ticker: String,
    /// Peers supplied by the user
    pub peers: Vec<String>,
    /// Whether to add peers from the related-tickers relation
    pub generate_peers: bool,
}

impl RunRequest {
    /// Create a request. Tickers are trimmed and upper-cased.
    pub fn new(ticker: &str, peers: Vec<String>, generate_peers: bool) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            peers: peers.iter().map(|p| normalize_ticker(p)).collect(),
            generate_peers,
        }
    }

    /// A subject is required, and so is either a peer list or peer generation.
    pub fn validate(&self) -> Result<()> {
        if self.ticker.is_empty() {
            return Err(Error::InvalidRequest("ticker is empty".to_string()));
        }
        if self.peers.is_empty() && !self.generate_peers {
            return Err(Error::InvalidRequest(
                "either pass a list of peers or enable peer generation".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// A page that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedPage {
    /// Ticker of the page
    pub ticker: String,
    /// Page kind
    pub kind: PageKind,
    /// Why the page was skipped
    pub reason: String,
}

impl fmt::Display for DegradedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.ticker, self.kind, self.reason)
    }
}

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// The subject's pages are being fetched
    Subject(&'a str),
    /// The peer list is final
    PeersResolved(usize),
    /// One peer has been fetched
    PeerDone(&'a str),
}

/// Everything a run produced, ready to be written to a sink.
#[derive(Debug, Clone)]
pub struct Report {
    /// Subject ticker
    pub ticker: String,
    /// Statements that could be extracted, in income, balance, cash-flow order
    pub statements: Vec<FinancialStatement>,
    /// Effective tax rate used throughout
    pub tax_rate: f64,
    /// Subject metrics
    pub subject: PeerMetrics,
    /// Peer metrics, in peer-list order
    pub peers: Vec<PeerMetrics>,
    /// Profiles, subject first
    pub profiles: Vec<CompanyProfile>,
    /// Analyst growth estimates for the subject
    pub analyst: Option<AnalystGrowth>,
    /// Cost of capital, valuation and implied ranges
    pub outcome: DcfOutcome,
    /// Pages that failed
    pub degraded: Vec<DegradedPage>,
}

impl Report {
    /// Statement of one kind, if it was extracted.
    pub fn statement(&self, kind: StatementKind) -> Option<&FinancialStatement> {
        self.statements.iter().find(|s| s.kind() == kind)
    }

    /// The DCF valuation, or the reason it could not be computed, such as a
    /// WACC at or below the terminal growth rate.
    pub fn valuation(&self) -> Result<&Valuation> {
        self.outcome
            .valuation
            .as_ref()
            .map_err(|e| Error::Model(e.clone()))
    }

    /// Write every sheet to `sink`. `base_year` labels the actual column of
    /// the forecast.
    pub fn render<S: WorkbookSink>(
        &self,
        sink: &mut S,
        base_year: i32,
        notes: Option<&str>,
    ) -> Result<()> {
        for statement in &self.statements {
            sink.write_statement(statement)?;
        }
        sink.write_peers(self.tax_rate, &self.subject, &self.peers)?;
        sink.write_profiles(&self.profiles)?;
        sink.write_dcf(&DcfSheetInput {
            ticker: &self.ticker,
            base_year,
            subject: &self.subject,
            outcome: &self.outcome,
            notes,
        })?;
        Ok(())
    }
}

/// Pages and metrics of one peer.
struct PeerRecord {
    metrics: PeerMetrics,
    profile: CompanyProfile,
    degraded: Vec<DegradedPage>,
}

/// Runs a valuation against a page source.
#[derive(Debug)]
pub struct Pipeline<F> {
    fetcher: F,
    config: RunConfig,
}

impl<F: PageFetcher + Sync> Pipeline<F> {
    /// Create a pipeline.
    pub const fn new(fetcher: F, config: RunConfig) -> Self {
        Self { fetcher, config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run without progress notifications.
    pub async fn run(&self, request: &RunRequest) -> Result<Report> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Run, reporting progress to `progress`.
    pub async fn run_with_progress<P>(&self, request: &RunRequest, progress: P) -> Result<Report>
    where
        P: Fn(Progress<'_>),
    {
        request.validate()?;
        self.config.validate()?;
        let ticker = request.ticker.as_str();
        let mut degraded = Vec::new();

        let risk_free_rate = self.risk_free_rate().await?;
        info!(ticker, risk_free_rate, "starting valuation");
        progress(Progress::Subject(ticker));

        let statements = self.statements(ticker, &mut degraded).await;
        let income = statements
            .iter()
            .find(|s| s.kind() == StatementKind::IncomeStatement);
        let cash_flow = statements
            .iter()
            .find(|s| s.kind() == StatementKind::CashFlow);
        let tax_rate = income.map_or(self.config.min_tax_rate, |i| {
            effective_tax_rate(i, self.config.min_tax_rate)
        });
        debug!(ticker, tax_rate, "effective tax rate");

        let subject = self.peer_record(ticker, tax_rate, income).await;
        degraded.extend(subject.degraded);
        let analyst = self
            .page(PageKind::Analysis, ticker, &mut degraded)
            .await
            .and_then(|markup| extract_analyst_growth(&markup));

        let depth = if request.generate_peers {
            self.config.peer_depth
        } else {
            0
        };
        let relations = QuotePageRelations(&self.fetcher);
        let peer_list = generate_peers(&relations, ticker, &request.peers, depth).await;
        info!(ticker, peers = peer_list.len(), "peer list resolved");
        progress(Progress::PeersResolved(peer_list.len()));

        let records: Vec<PeerRecord> = stream::iter(&peer_list)
            .map(|peer| self.peer_record(peer, tax_rate, None))
            .buffered(self.config.peer_concurrency)
            .inspect(|record| progress(Progress::PeerDone(&record.metrics.ticker)))
            .collect()
            .await;

        let mut peers = Vec::with_capacity(records.len());
        let mut profiles = Vec::with_capacity(records.len() + 1);
        profiles.push(subject.profile);
        for record in records {
            peers.push(record.metrics);
            profiles.push(record.profile);
            degraded.extend(record.degraded);
        }

        let inputs = DcfInputs {
            tax_rate,
            risk_free_rate,
            market_risk_premium: self.config.market_risk_premium,
            terminal_growth: self.config.terminal_growth,
            forecast_years: self.config.forecast_years,
            percentages: income
                .map(|i| revenue_percentages(i, cash_flow))
                .unwrap_or_default(),
        };
        let outcome = DcfOutcome::compute(
            income,
            analyst.as_ref(),
            &subject.metrics,
            &peers,
            inputs,
        );

        for page in &degraded {
            warn!(page = %page, "page degraded");
        }
        Ok(Report {
            ticker: ticker.to_string(),
            statements,
            tax_rate,
            subject: subject.metrics,
            peers,
            profiles,
            analyst,
            outcome,
            degraded,
        })
    }

    /// Configured rate, else the 10-year Treasury yield.
    async fn risk_free_rate(&self) -> Result<f64> {
        if let Some(rate) = self.config.risk_free_rate {
            return Ok(rate);
        }
        let markup = self.fetcher.fetch(PageKind::Quote, TREASURY_10Y).await?;
        let yield_percent = markup
            .as_deref()
            .and_then(extract_quote_price)
            .ok_or_else(|| {
                DataError::MissingField(format!("{TREASURY_10Y} quote price for risk-free rate"))
            })?;
        debug!(yield_percent, "risk-free rate from Treasury yield");
        Ok(yield_percent / 100.0)
    }

    /// Fetch one page, recording failures instead of returning them.
    async fn page(
        &self,
        kind: PageKind,
        ticker: &str,
        degraded: &mut Vec<DegradedPage>,
    ) -> Option<String> {
        match self.fetcher.fetch(kind, ticker).await {
            Ok(Some(markup)) => Some(markup),
            Ok(None) => {
                debug!(ticker, page = %kind, "no data");
                None
            }
            Err(e) => {
                degraded.push(DegradedPage {
                    ticker: ticker.to_string(),
                    kind,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    async fn statements(
        &self,
        ticker: &str,
        degraded: &mut Vec<DegradedPage>,
    ) -> Vec<FinancialStatement> {
        let mut statements = Vec::with_capacity(StatementKind::ALL.len());
        for kind in StatementKind::ALL {
            let page = PageKind::Statement(kind);
            let Some(markup) = self.page(page, ticker, degraded).await else {
                continue;
            };
            match extract_statement(kind, &markup) {
                Ok(statement) => statements.push(statement),
                Err(e) => degraded.push(DegradedPage {
                    ticker: ticker.to_string(),
                    kind: page,
                    reason: e.to_string(),
                }),
            }
        }
        statements
    }

    /// Metrics and profile of one company. `fallback_income` is only passed
    /// for the subject.
    async fn peer_record(
        &self,
        ticker: &str,
        tax_rate: f64,
        fallback_income: Option<&FinancialStatement>,
    ) -> PeerRecord {
        let mut degraded = Vec::new();
        let key_statistics = self
            .page(PageKind::KeyStatistics, ticker, &mut degraded)
            .await
            .unwrap_or_default();
        let bonds = self.page(PageKind::Bonds, ticker, &mut degraded).await;
        let profile = self.page(PageKind::Profile, ticker, &mut degraded).await;

        let metrics = extract_peer_metrics(
            ticker,
            &key_statistics,
            bonds.as_deref(),
            tax_rate,
            fallback_income,
        );
        PeerRecord {
            metrics,
            profile: extract_profile(ticker, profile.as_deref()),
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dcfgen_data::MemoryFetcher;

    #[test]
    fn test_request_validation() {
        let request = RunRequest::new(" acme ", vec!["bbb".to_string()], false);
        assert_eq!(request.ticker, "ACME");
        assert_eq!(request.peers, ["BBB"]);
        assert!(request.validate().is_ok());

        assert!(matches!(
            RunRequest::new("ACME", Vec::new(), false).validate(),
            Err(Error::InvalidRequest(_))
        ));
        assert!(RunRequest::new("ACME", Vec::new(), true).validate().is_ok());
        assert!(RunRequest::new("", Vec::new(), true).validate().is_err());
    }

    #[tokio::test]
    async fn test_missing_treasury_quote_is_fatal() {
        let pipeline = Pipeline::new(MemoryFetcher::new(), RunConfig::default());
        let request = RunRequest::new("ACME", vec!["BBB".to_string()], false);
        assert!(matches!(
            pipeline.run(&request).await,
            Err(Error::Data(DataError::MissingField(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_without_pages_completes() {
        let config = RunConfig {
            risk_free_rate: Some(0.04),
            ..RunConfig::default()
        };
        let pipeline = Pipeline::new(MemoryFetcher::new(), config);
        let request = RunRequest::new("ACME", vec!["BBB".to_string()], false);
        let report = pipeline.run(&request).await.unwrap();

        assert!(report.statements.is_empty());
        assert_relative_eq!(report.tax_rate, 0.2);
        assert_eq!(report.peers.len(), 1);
        assert_eq!(report.profiles.len(), 2);
        assert!(report.outcome.valuation.is_err());
        assert!(report.degraded.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_statement_is_degraded() {
        let fetcher = MemoryFetcher::new().with_page(
            PageKind::Statement(StatementKind::BalanceSheet),
            "ACME",
            "<html><body><p>Please enable JavaScript</p></body></html>",
        );
        let config = RunConfig {
            risk_free_rate: Some(0.04),
            ..RunConfig::default()
        };
        let report = Pipeline::new(fetcher, config)
            .run(&RunRequest::new("ACME", vec!["BBB".to_string()], false))
            .await
            .unwrap();
        assert_eq!(report.degraded.len(), 1);
        assert_eq!(
            report.degraded[0].kind,
            PageKind::Statement(StatementKind::BalanceSheet)
        );
        assert!(report.statement(StatementKind::BalanceSheet).is_none());
    }
}
