//! Quote page extraction.

use crate::locate::Locator;
use crate::normalize::normalize_number;
use scraper::Html;

/// Ticker whose quote gives the 10-year Treasury yield, in percent.
pub const TREASURY_10Y: &str = "^TNX";

const PRICE: Locator = Locator::Selector(r#"fin-streamer[data-test="qsp-price"]"#);

/// Last traded price on a quote page.
pub fn extract_quote_price(markup: &str) -> Option<f64> {
    PRICE
        .text(&Html::parse_document(markup))
        .as_deref()
        .and_then(normalize_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price() {
        let markup = r#"<fin-streamer data-test="qsp-price" data-symbol="^TNX">4.312</fin-streamer>"#;
        assert_eq!(extract_quote_price(markup), Some(4.312));
        assert_eq!(extract_quote_price("<p>closed</p>"), None);
    }
}
