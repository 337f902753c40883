//! Error types for Chroma core.

use thiserror::Error;

/// Errors from the pure primitives: parsing ids and decoding bytes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid transaction id: {0}")]
    InvalidTxId(String),

    #[error("invalid out point: {0}")]
    InvalidOutPoint(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::InvalidTxId(e.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
