//! # Chroma Core
//!
//! Pure primitives for the Chroma colored-coin kernels: ledger ids,
//! transactions, bit lists, and the color value model.
//!
//! This crate contains no I/O, no ledger access, no networking. It is pure
//! computation over transaction data.
//!
//! ## Key Types
//!
//! - [`TxId`] - Transaction id (SHA-256d of the wire serialization)
//! - [`OutPoint`] - Reference to one transaction output
//! - [`Transaction`] - Inputs, outputs, and the legacy wire codec
//! - [`BitList`] - Fixed-width bit fields packed into sequence numbers
//! - [`ColorIn`] / [`ColorOut`] - Color values attached to inputs and outputs
//!
//! ## Records
//!
//! Out points and color inputs have a compact CBOR record form. See [`codec`].

pub mod bits;
pub mod codec;
pub mod color;
pub mod error;
pub mod tx;
pub mod types;

pub use bits::BitList;
pub use color::{ColorIn, ColorOut, ColorValue};
pub use error::{CoreError, Result};
pub use tx::{Transaction, TxIn, TxOut, SEQUENCE_FINAL};
pub use types::{sha256d, BlockHash, OutPoint, TxId};
