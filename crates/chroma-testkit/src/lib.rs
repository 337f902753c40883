//! # Chroma Testkit
//!
//! Testing utilities for the Chroma color kernels.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A funded in-memory ledger for building transaction chains
//! - **Generators**: Proptest strategies for ids, out points, color values
//!   and transactions
//! - **Golden vectors**: Known sequence markers, paddings, affecting-input
//!   cases and color definitions
//!
//! ## Test Fixtures
//!
//! ```rust
//! use chroma_testkit::fixtures::LedgerFixture;
//! use chroma_ledger::LedgerExt;
//!
//! let fixture = LedgerFixture::new();
//! let coin = fixture.fund(50_000).unwrap();
//! assert_eq!(fixture.ledger.output_value(&coin).unwrap(), 50_000);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use chroma_testkit::generators::transaction;
//!
//! proptest! {
//!     #[test]
//!     fn txid_is_stable(tx in transaction()) {
//!         prop_assert_eq!(tx.txid(), tx.clone().txid());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::LedgerFixture;
pub use generators::SplitParams;
pub use vectors::{
    affecting_vectors, definition_vectors, padding_vectors, sequence_vectors, AffectingVector,
    DefinitionVector, PaddingVector, SequenceVector,
};
