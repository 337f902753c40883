//! # Chroma Kernel
//!
//! Colored coins over a UTXO ledger: fungible color attached to specific
//! outputs and propagated deterministically as those outputs are spent.
//!
//! ## Overview
//!
//! The protocol never changes the ledger. It fixes conventions (output
//! amounts, bit markers in input sequence numbers) and algorithms that
//! independent observers run over the same transaction graph to agree on
//! who holds which color. Each kernel can:
//!
//! - **Build**: shape an issuance or transfer into an unsigned transaction
//! - **Simulate**: propagate color values forward through one transaction
//! - **Trace**: walk an output's ancestry back to the genesis output
//!
//! ## Kernels
//!
//! - `IFOC` - flat: one unit, marked by a fixed output amount
//! - `SPOBC` - marker: one unit, moved by input/output position
//! - `EPOBC` - padded: divisible value plus a power-of-two padding
//!
//! ## Usage
//!
//! ```rust
//! use chroma_kernel::{ColorDefinition, KernelConfig, KernelRegistry};
//!
//! let registry = KernelRegistry::with_config(&KernelConfig::default());
//! let cd = ColorDefinition::parse(
//!     "EPOBC:b1586cd10b32f78795b86e9a3febe58dcb59189175fad884a7f4a6623b77486e:0:300000",
//!     &registry,
//! )
//! .unwrap();
//!
//! assert_eq!(cd.code(), "EPOBC");
//! assert!(cd.account_number() < 1 << 31);
//! ```
//!
//! ## Re-exports
//!
//! - `chroma_kernel::core` - Core primitives (TxId, Transaction, BitList, etc.)
//! - `chroma_kernel::ledger` - Ledger trait and the in-memory ledger

pub mod config;
pub mod definition;
pub mod error;
pub mod kernel;
pub mod registry;
pub mod trace;

// Re-export component crates
pub use chroma_core as core;
pub use chroma_ledger as ledger;

// Re-export main types for convenience
pub use config::{EpobcConfig, IfocConfig, KernelConfig, SpobcConfig};
pub use definition::ColorDefinition;
pub use error::{KernelError, Result};
pub use kernel::{ColorKernel, Epobc, Ifoc, Kernel, Spobc};
pub use registry::KernelRegistry;
pub use trace::{AncestryWalk, TraceState};

// Re-export commonly used core types
pub use chroma_core::{ColorIn, ColorOut, ColorValue, OutPoint, Transaction, TxId};
pub use chroma_ledger::{Ledger, LedgerExt, LedgerOp, MemoryLedger};
