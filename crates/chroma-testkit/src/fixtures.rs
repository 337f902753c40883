//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a ledger that hands out funded
//! outputs and confirms transactions one block at a time.

use std::sync::atomic::{AtomicU32, Ordering};

use chroma_core::{OutPoint, Transaction, TxId, TxIn, TxOut};
use chroma_ledger::{LedgerExt, MemoryLedger, Result};
use rand::RngCore;

/// A memory ledger plus helpers for funding and confirming.
pub struct LedgerFixture {
    pub ledger: MemoryLedger,
    nonce: AtomicU32,
}

impl LedgerFixture {
    pub fn new() -> Self {
        Self {
            ledger: MemoryLedger::new(),
            nonce: AtomicU32::new(0),
        }
    }

    /// Confirm a fresh output of `amount` paying a random script.
    pub fn fund(&self, amount: i64) -> Result<OutPoint> {
        self.fund_to(amount, random_script())
    }

    /// Confirm a fresh output of `amount` paying `script`.
    pub fn fund_to(&self, amount: i64, script: Vec<u8>) -> Result<OutPoint> {
        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(OutPoint::NULL));
        tx.add_output(TxOut::new(amount, script));
        // Keeps identical funding requests from colliding on one txid.
        tx.lock_time = self.nonce.fetch_add(1, Ordering::Relaxed);
        let txid = self.ledger.insert_confirmed(tx)?;
        Ok(OutPoint::new(txid, 0))
    }

    /// Publish into the mempool without mining.
    pub fn publish(&self, tx: &Transaction) -> Result<TxId> {
        self.ledger.publish_tx(tx)
    }

    /// Publish and mine a block containing `tx`.
    pub fn confirm(&self, tx: &Transaction) -> Result<TxId> {
        let txid = self.publish(tx)?;
        self.ledger.mine_block()?;
        Ok(txid)
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A pay-to-pubkey-hash shaped script with a random hash.
pub fn random_script() -> Vec<u8> {
    let mut hash = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut hash);

    let mut script = Vec::with_capacity(25);
    script.extend_from_slice(&[0x76, 0xa9, 0x14]);
    script.extend_from_slice(&hash);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

/// A random transaction id, for references to transactions nobody has.
pub fn random_txid() -> TxId {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    TxId::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_ledger::Ledger;

    #[test]
    fn test_fund_creates_distinct_outputs() {
        let fixture = LedgerFixture::new();
        let script = vec![0x51];
        let a = fixture.fund_to(1_000, script.clone()).unwrap();
        let b = fixture.fund_to(1_000, script).unwrap();

        assert_ne!(a, b);
        assert_eq!(fixture.ledger.tx_height(&a.txid).unwrap(), Some(1));
        assert_eq!(fixture.ledger.tx_height(&b.txid).unwrap(), Some(2));
    }

    #[test]
    fn test_confirm() {
        let fixture = LedgerFixture::new();
        let coin = fixture.fund(5_000).unwrap();

        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(coin));
        tx.add_output(TxOut::new(4_000, random_script()));
        let txid = fixture.confirm(&tx).unwrap();

        assert_eq!(fixture.ledger.tx_height(&txid).unwrap(), Some(2));
        assert!(fixture.ledger.is_output_spent(&coin).unwrap());
    }

    #[test]
    fn test_random_script_shape() {
        let script = random_script();
        assert_eq!(script.len(), 25);
        assert_eq!(&script[..3], &[0x76, 0xa9, 0x14]);
        assert_ne!(random_script(), script);
    }
}
