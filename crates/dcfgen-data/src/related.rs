//! Related-ticker extraction from the quote page.

use crate::locate::{element_text, find_label, selector};
use scraper::{ElementRef, Html};
use tracing::debug;

const RELATED_HEADING: &str = "People Also Watch";

/// Tickers listed under the related-companies heading, in page order and
/// without duplicates.
pub fn extract_related(markup: &str) -> Vec<String> {
    let document = Html::parse_document(markup);
    let Some(heading) = find_label(&document, RELATED_HEADING) else {
        debug!("related tickers heading not found");
        return Vec::new();
    };
    let Ok(links) = selector("a") else {
        return Vec::new();
    };
    let Some(section) = std::iter::once(heading)
        .chain(heading.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "h2")
        .and_then(|h2| h2.parent().and_then(ElementRef::wrap))
    else {
        return Vec::new();
    };

    let mut tickers: Vec<String> = Vec::new();
    for ticker in section.select(&links).map(element_text) {
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}
