//! dcfgen CLI binary.
//!
//! Values a stock against its peers and writes the DCF workbook.

use chrono::{Datelike, Local};
use clap::Parser;
use dcfgen::data::HttpFetcher;
use dcfgen::output::{ExportFormat, Exporter, Workbook};
use dcfgen::{Pipeline, Progress, Report, RunConfig, RunRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dcfgen")]
#[command(about = "dcfgen: DCF valuation workbooks from public financial statements")]
#[command(version)]
struct Cli {
    /// Stock ticker to value
    ticker: String,

    /// Peer tickers to compare against
    #[arg(long, num_args = 1..)]
    peers: Vec<String>,

    /// Add peers from related tickers
    #[arg(long)]
    generate_peers: bool,

    /// Risk-free rate (defaults to the 10-year Treasury yield)
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Market risk premium
    #[arg(long)]
    market_risk_premium: Option<f64>,

    /// Perpetual growth after the forecast horizon
    #[arg(long)]
    terminal_growth: Option<f64>,

    /// Number of forecast years
    #[arg(long)]
    forecast_years: Option<usize>,

    /// Floor applied to the effective tax rate
    #[arg(long)]
    min_tax_rate: Option<f64>,

    /// Levels of related tickers followed when generating peers
    #[arg(long)]
    peer_depth: Option<usize>,

    /// Peers fetched at the same time
    #[arg(long)]
    peer_concurrency: Option<usize>,

    /// JSON file with run parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text file whose contents are added to the DCF sheet
    #[arg(long)]
    notes: Option<PathBuf>,

    /// Output format (csv, json, pretty-json)
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// Output path (a directory for csv)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    /// Configuration file, if any, with command-line overrides applied.
    fn run_config(&self) -> dcfgen::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };
        if self.risk_free_rate.is_some() {
            config.risk_free_rate = self.risk_free_rate;
        }
        if let Some(premium) = self.market_risk_premium {
            config.market_risk_premium = premium;
        }
        if let Some(growth) = self.terminal_growth {
            config.terminal_growth = growth;
        }
        if let Some(years) = self.forecast_years {
            config.forecast_years = years;
        }
        if let Some(rate) = self.min_tax_rate {
            config.min_tax_rate = rate;
        }
        if let Some(depth) = self.peer_depth {
            config.peer_depth = depth;
        }
        if let Some(concurrency) = self.peer_concurrency {
            config.peer_concurrency = concurrency;
        }
        config.validate()?;
        Ok(config)
    }

    fn output_path(&self, ticker: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(ticker, self.format))
    }
}

/// Ticker with `.` replaced by `-`; JSON gets its extension.
fn default_output_path(ticker: &str, format: ExportFormat) -> PathBuf {
    let stem = ticker.replace('.', "-");
    match format {
        ExportFormat::Csv => PathBuf::from(stem),
        ExportFormat::Json | ExportFormat::PrettyJson => {
            PathBuf::from(format!("{stem}.{}", format.extension()))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dcfgen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.run_config()?;
    let request = RunRequest::new(&cli.ticker, cli.peers.clone(), cli.generate_peers);
    request.validate()?;
    let notes = cli.notes.as_deref().map(std::fs::read_to_string).transpose()?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("DCF VALUATION: {}", request.ticker));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let fetcher = HttpFetcher::with_delay(config.request_delay())?;
    let pipeline = Pipeline::new(fetcher, config);
    let result = pipeline
        .run_with_progress(&request, |event| match event {
            Progress::Subject(ticker) => pb.set_message(format!("Fetching {ticker}...")),
            Progress::PeersResolved(count) => {
                pb.set_length(count as u64);
                pb.set_message("Fetching peers...");
            }
            Progress::PeerDone(ticker) => {
                pb.inc(1);
                pb.set_message(format!("Fetched {ticker}"));
            }
        })
        .await;
    let report = match result {
        Ok(report) => {
            pb.finish_with_message(format!("Fetched {} peer(s)", report.peers.len()));
            report
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    let base_year = Local::now().year() - 1;
    let mut book = Workbook::new();
    report.render(&mut book, base_year, notes.as_deref())?;
    let output = cli.output_path(&request.ticker);
    book.export_to_file(&output, cli.format)?;

    print_summary(&report, &output);
    Ok(())
}

fn print_summary(report: &Report, output: &Path) {
    println!();
    println!("Tax rate:        {:.2}%", report.tax_rate * 100.0);
    let peers: Vec<&str> = report.peers.iter().map(|p| p.ticker.as_str()).collect();
    println!("Peers:           {}", peers.join(", "));

    match &report.outcome.cost_of_capital {
        Ok(coc) => {
            println!("Beta:            {:.3}", coc.beta);
            println!("Cost of equity:  {:.2}%", coc.cost_of_equity * 100.0);
            println!("WACC:            {:.2}%", coc.wacc * 100.0);
        }
        Err(e) => println!("WACC:            unavailable ({e})"),
    }

    match report.valuation() {
        Ok(valuation) => {
            println!("Enterprise value: {:.0}", valuation.enterprise_value);
            println!("Equity value:     {:.0}", valuation.equity_value);
            match valuation.per_share_value {
                Some(value) => println!("Per share:        {value:.2}"),
                None => println!("Per share:        N/A"),
            }
        }
        Err(e) => println!("Valuation:       {e}"),
    }

    if !report.degraded.is_empty() {
        println!("\nSkipped pages:");
        for page in &report.degraded {
            println!("  {page}");
        }
    }
    println!("\nWorkbook written to {}", output.display());
}
