//! Error types for ledger access.

use chroma_core::CoreError;
use thiserror::Error;

/// Errors a ledger source can report.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The transaction, output, or block is unknown to the ledger.
    #[error("not found: {0}")]
    NotFound(String),

    /// The ledger could not be reached or is in a bad state.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused a published transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The ledger returned bytes that do not decode as a transaction.
    #[error("decoding error: {0}")]
    Decoding(#[from] CoreError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
