//! Error types for valuation computations.

use thiserror::Error;

/// Result type for valuation computations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while deriving valuation quantities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A required metric or line item is absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Inputs of a derived quantity are missing or zero
    #[error("Computation blocked: {0}")]
    ComputationBlocked(String),

    /// Terminal value undefined because WACC does not exceed terminal growth
    #[error(
        "Valuation degenerate: WACC {wacc:.4} does not exceed terminal growth {terminal_growth:.4}"
    )]
    ValuationDegenerate {
        /// Weighted average cost of capital
        wacc: f64,
        /// Terminal growth rate
        terminal_growth: f64,
    },

    /// Invalid input parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
