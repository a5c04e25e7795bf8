//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching or extracting pages.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Page structure does not match the expected layout
    #[error("Unexpected page shape on {page}: {reason}")]
    ShapeMismatch {
        /// Page that was being extracted
        page: String,
        /// What did not match
        reason: String,
    },

    /// A named line item or metric is absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Invalid CSS selector
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Build a shape mismatch for `page`.
    pub fn shape(page: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            page: page.into(),
            reason: reason.into(),
        }
    }
}
