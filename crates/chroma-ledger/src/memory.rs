//! In-memory implementation of the Ledger trait.
//!
//! This is primarily for testing. It keeps confirmed blocks, a mempool, and
//! the set of spent outputs, and enforces just enough of the ledger's rules
//! (inputs exist, no double spends) for color traces to be meaningful.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chroma_core::{sha256d, BlockHash, OutPoint, Transaction, TxId};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::traits::Ledger;

/// In-memory ledger.
///
/// Starts with an empty block at height 0. All data is lost when the ledger
/// is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
}

struct MemoryLedgerInner {
    /// Every known transaction, confirmed or not.
    txs: HashMap<TxId, Transaction>,

    /// Confirmation heights. Absent while in the mempool.
    heights: HashMap<TxId, i64>,

    /// Unconfirmed transactions in arrival order.
    mempool: Vec<TxId>,

    /// Block hashes indexed by height.
    blocks: Vec<BlockHash>,

    /// Outputs consumed by some known transaction.
    spent: HashSet<OutPoint>,
}

impl MemoryLedgerInner {
    fn push_block(&mut self, txids: &[TxId]) -> (i64, BlockHash) {
        let height = self.blocks.len() as i64;
        let mut preimage = Vec::with_capacity(40 + txids.len() * 32);
        if let Some(prev) = self.blocks.last() {
            preimage.extend_from_slice(&prev.0);
        }
        preimage.extend_from_slice(&height.to_le_bytes());
        for txid in txids {
            preimage.extend_from_slice(txid.as_bytes());
            self.heights.insert(*txid, height);
        }
        let hash = BlockHash::from_bytes(sha256d(&preimage));
        self.blocks.push(hash);
        (height, hash)
    }

    fn check_spendable(&self, tx: &Transaction) -> Result<()> {
        let mut seen = HashSet::new();
        for out_point in tx.previous_outputs() {
            if !seen.insert(*out_point) {
                return Err(LedgerError::Rejected(format!(
                    "duplicate input {}",
                    out_point
                )));
            }
            let prev = self
                .txs
                .get(&out_point.txid)
                .ok_or_else(|| LedgerError::Rejected(format!("unknown input {}", out_point)))?;
            if out_point.index as usize >= prev.outputs.len() {
                return Err(LedgerError::Rejected(format!(
                    "missing output {}",
                    out_point
                )));
            }
            if self.spent.contains(out_point) {
                return Err(LedgerError::Rejected(format!(
                    "input already spent {}",
                    out_point
                )));
            }
        }
        Ok(())
    }
}

impl MemoryLedger {
    /// Create a ledger holding only an empty block at height 0.
    pub fn new() -> Self {
        let mut inner = MemoryLedgerInner {
            txs: HashMap::new(),
            heights: HashMap::new(),
            mempool: Vec::new(),
            blocks: Vec::new(),
            spent: HashSet::new(),
        };
        inner.push_block(&[]);
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryLedgerInner>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryLedgerInner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".into()))
    }

    /// Confirm a transaction in a block of its own, bypassing input checks.
    ///
    /// Used to seed funding outputs. Non-null inputs that reference known
    /// outputs are marked spent.
    pub fn insert_confirmed(&self, tx: Transaction) -> Result<TxId> {
        let txid = tx.txid();
        let mut inner = self.write()?;
        if inner.txs.contains_key(&txid) {
            return Err(LedgerError::Rejected(format!("already known {}", txid)));
        }
        for out_point in tx.previous_outputs().filter(|op| !op.is_null()) {
            inner.spent.insert(*out_point);
        }
        inner.txs.insert(txid, tx);
        let (height, _) = inner.push_block(&[txid]);
        debug!("Confirmed seeded tx {} at height {}", txid, height);
        Ok(txid)
    }

    /// Confirm every mempool transaction in a new block.
    pub fn mine_block(&self) -> Result<BlockHash> {
        let mut inner = self.write()?;
        let txids = std::mem::take(&mut inner.mempool);
        let (height, hash) = inner.push_block(&txids);
        debug!("Mined block {} with {} txs", height, txids.len());
        Ok(hash)
    }

    /// Number of unconfirmed transactions.
    pub fn mempool_len(&self) -> Result<usize> {
        Ok(self.read()?.mempool.len())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for MemoryLedger {
    fn block_count(&self) -> Result<i64> {
        Ok(self.read()?.blocks.len() as i64 - 1)
    }

    fn block_hash(&self, height: i64) -> Result<BlockHash> {
        let inner = self.read()?;
        usize::try_from(height)
            .ok()
            .and_then(|h| inner.blocks.get(h).copied())
            .ok_or_else(|| LedgerError::NotFound(format!("block at height {}", height)))
    }

    fn raw_tx(&self, txid: &TxId) -> Result<Vec<u8>> {
        let inner = self.read()?;
        inner
            .txs
            .get(txid)
            .map(Transaction::to_bytes)
            .ok_or_else(|| LedgerError::NotFound(format!("tx {}", txid)))
    }

    fn tx_height(&self, txid: &TxId) -> Result<Option<i64>> {
        let inner = self.read()?;
        if !inner.txs.contains_key(txid) {
            return Err(LedgerError::NotFound(format!("tx {}", txid)));
        }
        Ok(inner.heights.get(txid).copied())
    }

    fn is_output_spent(&self, out_point: &OutPoint) -> Result<bool> {
        let inner = self.read()?;
        let tx = inner
            .txs
            .get(&out_point.txid)
            .ok_or_else(|| LedgerError::NotFound(format!("tx {}", out_point.txid)))?;
        if out_point.index as usize >= tx.outputs.len() {
            return Err(LedgerError::NotFound(format!("output {}", out_point)));
        }
        Ok(inner.spent.contains(out_point))
    }

    fn publish_raw_tx(&self, raw: &[u8]) -> Result<TxId> {
        let tx = Transaction::from_bytes(raw)?;
        let txid = tx.txid();

        let mut inner = self.write()?;
        if inner.txs.contains_key(&txid) {
            return Err(LedgerError::Rejected(format!("already known {}", txid)));
        }
        if tx.inputs.is_empty() {
            return Err(LedgerError::Rejected("no inputs".into()));
        }
        inner.check_spendable(&tx)?;

        for out_point in tx.previous_outputs() {
            inner.spent.insert(*out_point);
        }
        inner.txs.insert(txid, tx);
        inner.mempool.push(txid);
        debug!("Accepted tx {} into mempool", txid);
        Ok(txid)
    }
}
