//! Run configuration.
//!
//! Every field has a default, so a configuration file only needs the values it
//! changes:
//!
//! ```
//! use dcfgen::RunConfig;
//!
//! let config = RunConfig::from_json_str(r#"{ "forecast_years": 7 }"#).unwrap();
//! assert_eq!(config.forecast_years, 7);
//! assert_eq!(config.market_risk_premium, 0.055);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Average US market risk premium.
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.055;
/// Long-run US GDP growth, used as the perpetual growth rate.
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.018050372;
/// Forecast horizon in years.
pub const DEFAULT_FORECAST_YEARS: usize = 5;
/// Peer generation depth used when generation is requested.
pub const DEFAULT_PEER_DEPTH: usize = 2;
/// Pause between page requests, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Numeric parameters of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Risk-free rate; scraped from the 10-year Treasury yield when unset
    pub risk_free_rate: Option<f64>,
    /// Market risk premium
    pub market_risk_premium: f64,
    /// Perpetual growth after the forecast horizon
    pub terminal_growth: f64,
    /// Number of forecast years
    pub forecast_years: usize,
    /// Floor applied to the effective tax rate
    pub min_tax_rate: f64,
    /// Levels of related tickers followed when generating peers
    pub peer_depth: usize,
    /// Peers fetched at the same time
    pub peer_concurrency: usize,
    /// Minimum pause between page requests, in milliseconds
    pub request_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: None,
            market_risk_premium: DEFAULT_MARKET_RISK_PREMIUM,
            terminal_growth: DEFAULT_TERMINAL_GROWTH,
            forecast_years: DEFAULT_FORECAST_YEARS,
            min_tax_rate: dcfgen_model::DEFAULT_MIN_TAX_RATE,
            peer_depth: DEFAULT_PEER_DEPTH,
            peer_concurrency: 1,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Pause between page requests.
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.forecast_years == 0 {
            return Err(Error::Config(
                "forecast_years must be a positive integer".to_string(),
            ));
        }
        if self.peer_concurrency == 0 {
            return Err(Error::Config("peer_concurrency must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_tax_rate) {
            return Err(Error::Config(format!(
                "min_tax_rate must be between 0 and 1, got {}",
                self.min_tax_rate
            )));
        }
        let rates = [
            ("market_risk_premium", Some(self.market_risk_premium)),
            ("terminal_growth", Some(self.terminal_growth)),
            ("risk_free_rate", self.risk_free_rate),
        ];
        for (name, rate) in rates {
            if let Some(rate) = rate
                && !rate.is_finite()
            {
                return Err(Error::Config(format!("{name} must be a finite number")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.risk_free_rate, None);
        assert_eq!(config.market_risk_premium, 0.055);
        assert_eq!(config.terminal_growth, 0.018050372);
        assert_eq!(config.forecast_years, 5);
        assert_eq!(config.min_tax_rate, 0.2);
        assert_eq!(config.peer_depth, 2);
        assert_eq!(config.peer_concurrency, 1);
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            RunConfig::from_json_str(r#"{ "risk_free_rate": 0.043, "peer_concurrency": 4 }"#)
                .unwrap();
        assert_eq!(config.risk_free_rate, Some(0.043));
        assert_eq!(config.peer_concurrency, 4);
        assert_eq!(config.forecast_years, DEFAULT_FORECAST_YEARS);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            RunConfig::from_json_str(r#"{ "rfr": 0.04 }"#),
            Err(Error::Json(_))
        ));
    }

    #[rstest]
    #[case(r#"{ "forecast_years": 0 }"#)]
    #[case(r#"{ "peer_concurrency": 0 }"#)]
    #[case(r#"{ "min_tax_rate": 1.5 }"#)]
    fn test_invalid_values(#[case] json: &str) {
        assert!(matches!(
            RunConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "terminal_growth": 0.025 }}"#).unwrap();
        let config = RunConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.terminal_growth, 0.025);
    }
}
