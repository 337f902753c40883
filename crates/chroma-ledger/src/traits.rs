//! Ledger trait: the abstract interface to the underlying UTXO ledger.
//!
//! The kernels are ledger-agnostic. A node RPC client, an indexer, or the
//! in-memory [`MemoryLedger`](crate::MemoryLedger) can all sit behind it.

use std::fmt;

use bytes::Bytes;
use chroma_core::{BlockHash, OutPoint, Transaction, TxId, TxOut};

use crate::error::{LedgerError, Result};

/// The ledger source: everything the kernels read from or write to the ledger.
///
/// All methods are synchronous. Blocking happens inside implementations only.
pub trait Ledger: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Chain
    // ─────────────────────────────────────────────────────────────────────────

    /// Height of the current tip.
    fn block_count(&self) -> Result<i64>;

    /// Hash of the block at `height`.
    fn block_hash(&self, height: i64) -> Result<BlockHash>;

    // ─────────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialized bytes of a confirmed or mempool transaction.
    fn raw_tx(&self, txid: &TxId) -> Result<Vec<u8>>;

    /// Height of the block containing `txid`, or `None` while unconfirmed.
    fn tx_height(&self, txid: &TxId) -> Result<Option<i64>>;

    /// Whether some known transaction already spends `out_point`.
    fn is_output_spent(&self, out_point: &OutPoint) -> Result<bool>;

    /// Submit a serialized transaction, returning its id.
    fn publish_raw_tx(&self, raw: &[u8]) -> Result<TxId>;
}

/// Decoded lookups built on the raw [`Ledger`] calls.
pub trait LedgerExt: Ledger {
    /// Fetch and decode a transaction.
    fn tx(&self, txid: &TxId) -> Result<Transaction> {
        let raw = self.raw_tx(txid)?;
        Ok(Transaction::from_bytes(&raw)?)
    }

    /// The output an out point refers to.
    fn output(&self, out_point: &OutPoint) -> Result<TxOut> {
        let tx = self.tx(&out_point.txid)?;
        tx.outputs
            .get(out_point.index as usize)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("output {}", out_point)))
    }

    /// Amount held by an output.
    fn output_value(&self, out_point: &OutPoint) -> Result<i64> {
        Ok(self.output(out_point)?.value)
    }

    /// Locking script of an output.
    fn output_script(&self, out_point: &OutPoint) -> Result<Bytes> {
        Ok(self.output(out_point)?.script_pubkey)
    }

    /// Confirmation height of the transaction holding an output.
    fn output_height(&self, out_point: &OutPoint) -> Result<Option<i64>> {
        self.tx_height(&out_point.txid)
    }

    /// Serialize and publish a transaction.
    fn publish_tx(&self, tx: &Transaction) -> Result<TxId> {
        self.publish_raw_tx(&tx.to_bytes())
    }
}

impl<L: Ledger + ?Sized> LedgerExt for L {}

/// Names the ledger call that failed, for error reporting upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    BlockCount,
    BlockHash,
    RawTx,
    TxHeight,
    OutputSpent,
    Publish,
}

impl LedgerOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOp::BlockCount => "block_count",
            LedgerOp::BlockHash => "block_hash",
            LedgerOp::RawTx => "raw_tx",
            LedgerOp::TxHeight => "tx_height",
            LedgerOp::OutputSpent => "is_output_spent",
            LedgerOp::Publish => "publish_raw_tx",
        }
    }
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
