//! HTTP page fetcher with a minimum interval between requests.

use super::{PageFetcher, PageKind};
use crate::error::{DataError, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Default pause between requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Browser user agent; the quote pages refuse obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Keeps requests at least `min_interval` apart.
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Fetches pages over HTTP. No retries: a failed request is reported once.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl HttpFetcher {
    /// Create a fetcher with the default request delay.
    pub fn new() -> Result<Self> {
        Self::with_delay(DEFAULT_REQUEST_DELAY)
    }

    /// Create a fetcher that waits at least `min_interval` between requests.
    pub fn with_delay(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, kind: PageKind, ticker: &str) -> Result<Option<String>> {
        if ticker.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }
        let url = kind.url(ticker);

        self.rate_limiter.lock().await.wait().await;
        debug!(%url, page = %kind, "fetching page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "page not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DataError::Http(format!("{url}: HTTP {status}")));
        }

        let body = response.text().await?;
        Ok((!body.trim().is_empty()).then_some(body))
    }
}
