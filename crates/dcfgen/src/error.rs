//! Error types for a dcfgen run.

use dcfgen_data::DataError;
use dcfgen_model::ModelError;
use dcfgen_output::ExportError;
use thiserror::Error;

/// Result type for a dcfgen run.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Fetching or extraction failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A valuation quantity could not be computed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Writing the workbook failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid run request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
