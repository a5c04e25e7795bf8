//! In-memory page fetcher serving recorded pages.

use super::{PageFetcher, PageKind};
use crate::error::Result;
use std::collections::HashMap;

/// Serves pages from memory. Unknown pages are `Ok(None)`.
///
/// Used for offline runs over saved pages and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    pages: HashMap<(PageKind, String), String>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page, builder style.
    pub fn with_page(mut self, kind: PageKind, ticker: &str, markup: impl Into<String>) -> Self {
        self.insert(kind, ticker, markup);
        self
    }

    /// Add a page.
    pub fn insert(&mut self, kind: PageKind, ticker: &str, markup: impl Into<String>) {
        self.pages.insert((kind, ticker.to_uppercase()), markup.into());
    }

    /// Number of stored pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True when no pages are stored.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, kind: PageKind, ticker: &str) -> Result<Option<String>> {
        Ok(self.pages.get(&(kind, ticker.to_uppercase())).cloned())
    }
}
