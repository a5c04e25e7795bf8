//! Markup locators shared by the page extractors.
//!
//! Fields are found either by CSS selector or by label: the element whose own
//! text equals the label is located, then the value is read from the element
//! adjacent to it. Pages nest labels inside `span`/`td` wrappers, so the search
//! for an adjacent element climbs a few levels before giving up.

use crate::error::{DataError, Result};
use scraper::{ElementRef, Html, Selector};

/// Levels climbed above a label while looking for an adjacent element.
const MAX_ASCENT: usize = 3;

/// How a single field is found on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Text of the first element matching a CSS selector
    Selector(&'static str),
    /// Text of the element adjacent to the element labelled with this text
    Label(&'static str),
}

impl Locator {
    /// Read the located text from `document`, if present and non-empty.
    pub fn text(&self, document: &Html) -> Option<String> {
        match self {
            Self::Selector(css) => select_text(document, css),
            Self::Label(label) => label_value(document, label),
        }
    }
}

/// Parse a CSS selector.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::Selector(format!("{css}: {e}")))
}

/// Whitespace-collapsed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first element matching `css`.
pub fn select_text(document: &Html, css: &str) -> Option<String> {
    let sel = selector(css).ok()?;
    document
        .select(&sel)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// First element whose own text node equals `label` after trimming.
pub fn find_label<'a>(document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| owns_text(*element, label))
}

/// Elements following `element`, climbing up to a few ancestors until one has
/// following siblings. Footnote markers (`sup`) are skipped.
pub fn following_elements(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut current = element;
    for _ in 0..=MAX_ASCENT {
        let siblings: Vec<_> = current
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|sibling| sibling.value().name() != "sup")
            .collect();
        if !siblings.is_empty() {
            return siblings;
        }
        match current.parent().and_then(ElementRef::wrap) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Vec::new()
}

/// Text adjacent to the element labelled `label`.
pub fn label_value(document: &Html, label: &str) -> Option<String> {
    let element = find_label(document, label)?;
    following_elements(element)
        .into_iter()
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn owns_text(element: ElementRef<'_>, label: &str) -> bool {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .any(|text| text.trim() == label)
}
