//! Peer-list generation.
//!
//! Peers are discovered by following the related-tickers relation out from the
//! subject, breadth first, up to a fixed depth. Tickers supplied by the user
//! are kept but never expanded, and the subject never appears in the result.

use dcfgen_data::{PageFetcher, PageKind, Result, extract_related};
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use tracing::{debug, warn};

/// Source of the related-tickers relation.
pub trait RelatedTickers {
    /// Tickers related to `ticker`, in page order.
    fn related(&self, ticker: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Reads related tickers from quote pages.
#[derive(Debug, Clone, Copy)]
pub struct QuotePageRelations<'a, F>(pub &'a F);

impl<F: PageFetcher + Sync> RelatedTickers for QuotePageRelations<'_, F> {
    async fn related(&self, ticker: &str) -> Result<Vec<String>> {
        let page = self.0.fetch(PageKind::Quote, ticker).await?;
        Ok(page.as_deref().map(extract_related).unwrap_or_default())
    }
}

/// Build the peer list for `subject`.
///
/// Starts from `seeds` (deduplicated, subject removed) and appends tickers
/// found by following `source` from the subject for `depth` levels. A depth of
/// 0 returns the seeds only. A failed lookup is logged and skipped.
pub async fn generate_peers<S: RelatedTickers>(
    source: &S,
    subject: &str,
    seeds: &[String],
    depth: usize,
) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::from([subject.to_string()]);
    let mut peers: Vec<String> = Vec::new();
    for seed in seeds {
        if seen.insert(seed.clone()) {
            peers.push(seed.clone());
        }
    }

    let mut worklist = VecDeque::from([(subject.to_string(), depth)]);
    while let Some((ticker, remaining)) = worklist.pop_front() {
        if remaining == 0 {
            continue;
        }
        let related = match source.related(&ticker).await {
            Ok(related) => related,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "could not read related tickers");
                continue;
            }
        };
        debug!(ticker = %ticker, count = related.len(), "related tickers");
        for candidate in related {
            if seen.insert(candidate.clone()) {
                peers.push(candidate.clone());
                worklist.push_back((candidate, remaining - 1));
            }
        }
    }
    peers
}
