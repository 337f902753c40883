//! Error types for the color kernels.

use chroma_core::{CoreError, OutPoint};
use chroma_ledger::{LedgerError, LedgerOp};
use thiserror::Error;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A ledger call failed.
    #[error("ledger {op} failed: {source}")]
    LedgerAccess {
        op: LedgerOp,
        #[source]
        source: LedgerError,
    },

    /// A reference (txid, index, height) is malformed or out of range.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// More color value than the kernel can represent or propagate.
    #[error("too much color value")]
    TooMuchColorValue,

    /// Color values do not have the shape the kernel requires.
    #[error("invalid color value")]
    InvalidColorValue,

    /// Outputs ask for more color than the inputs carry.
    #[error("insufficient color value")]
    InsufficientColorValue,

    /// Color would be lost without the caller asking for destruction.
    #[error("color value would be destroyed unintentionally")]
    UnintentionalValueDestruction,

    /// The kernel can only answer for a single output at a time.
    #[error("too many outputs requested")]
    TooManyOutputs,

    /// The requested output index does not exist or cannot carry color.
    #[error("bad output index")]
    BadOutputIndex,

    /// Selected inputs do not cover the required amount.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: i64, need: i64 },

    /// A negative amount where only non-negative ones make sense.
    #[error("negative value")]
    NegativeValue,

    /// An input has already been spent on the ledger.
    #[error("output already spent: {0}")]
    OutputAlreadySpent(OutPoint),

    /// No kernel is registered under this code.
    #[error("unknown kernel code: {0}")]
    UnknownKernelCode(String),

    /// A kernel with this code is already registered.
    #[error("kernel already registered: {0}")]
    DuplicateKernelRegistration(String),

    /// A color definition string does not have four fields.
    #[error("malformed color definition: {0}")]
    MalformedColorDefinition(String),

    /// Core primitive error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Tags ledger results with the call that produced them.
pub(crate) trait LedgerResultExt<T> {
    fn op(self, op: LedgerOp) -> Result<T>;
}

impl<T> LedgerResultExt<T> for chroma_ledger::Result<T> {
    fn op(self, op: LedgerOp) -> Result<T> {
        self.map_err(|source| KernelError::LedgerAccess { op, source })
    }
}
