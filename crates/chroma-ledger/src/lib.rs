//! # Chroma Ledger
//!
//! Ledger access for the Chroma color kernels. The kernels never talk to a
//! node directly; everything they need from the ledger goes through the
//! [`Ledger`] trait.
//!
//! ## Key Types
//!
//! - [`Ledger`] - The synchronous ledger source: raw transactions, heights,
//!   spent status, publishing
//! - [`LedgerExt`] - Decoded lookups derived from [`Ledger`]
//! - [`LedgerOp`] - Tags naming which ledger call failed
//! - [`MemoryLedger`] - In-memory ledger for tests and simulations
//!
//! ## Usage
//!
//! ```rust
//! use chroma_core::{OutPoint, Transaction, TxIn, TxOut};
//! use chroma_ledger::{Ledger, LedgerExt, MemoryLedger};
//!
//! let ledger = MemoryLedger::new();
//!
//! let mut funding = Transaction::new();
//! funding.add_input(TxIn::new(OutPoint::NULL));
//! funding.add_output(TxOut::new(50_000, vec![0x51]));
//! let txid = ledger.insert_confirmed(funding).unwrap();
//!
//! assert_eq!(ledger.output_value(&OutPoint::new(txid, 0)).unwrap(), 50_000);
//! assert_eq!(ledger.tx_height(&txid).unwrap(), Some(1));
//! ```
//!
//! ## Design Notes
//!
//! - **Synchronous**: Kernel operations block on the ledger. Implementations
//!   must be `Send + Sync` so independent traces can share one ledger.
//! - **Unconfirmed is `None`**: A transaction in the mempool has no height.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use traits::{Ledger, LedgerExt, LedgerOp};
