//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while turning formula text into tokens
///
/// Evaluation itself never fails with this type: its problems are reported
/// as a [`CellError`](cellcalc_core::CellError) inside the outcome.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula text contains a character no token can start with
    #[error("Unexpected character '{found}' at position {position}")]
    Lex { position: usize, found: char },
}
