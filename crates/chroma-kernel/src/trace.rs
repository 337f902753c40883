//! Ancestry walk: backward tracing from an output to a genesis output.
//!
//! The walk is an explicit state machine. Each [`AncestryWalk::step`] looks
//! at one out point and either ends the branch or yields the out points that
//! funded it, as reported by the kernel's affecting-inputs rule.
//! [`AncestryWalk::run`] drives every branch to a terminal state, visiting
//! each out point at most once, so merges in the transaction graph are
//! walked once.

use std::collections::HashSet;

use chroma_core::OutPoint;
use chroma_ledger::{Ledger, LedgerOp};
use tracing::{debug, trace};

use crate::error::{KernelError, LedgerResultExt, Result};
use crate::kernel::{fetch_tx, ColorKernel};

/// A state of the ancestry walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceState {
    /// The branch continues through these out points.
    Walking(Vec<OutPoint>),
    /// The branch arrived at the genesis transaction, at this output.
    ReachedGenesis(OutPoint),
    /// The branch went below the genesis height without meeting it.
    BelowGenesisHeight(OutPoint),
    /// No input explains color on this out point.
    Unexplained(OutPoint),
}

impl TraceState {
    /// True for every state except [`TraceState::Walking`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TraceState::Walking(_))
    }

    /// True when the walk ended exactly on the genesis output.
    pub fn is_colored(&self, genesis: &OutPoint) -> bool {
        matches!(self, TraceState::ReachedGenesis(at) if at == genesis)
    }
}

/// Whether `current` lives in the genesis transaction.
pub fn reached_genesis(genesis: &OutPoint, current: &OutPoint) -> bool {
    genesis.txid == current.txid
}

/// Whether a transaction confirmed at `height` predates the genesis.
///
/// Unconfirmed transactions are never below, and neither is anything when
/// the genesis itself is unconfirmed.
pub fn below_genesis_height(height: Option<i64>, genesis_height: Option<i64>) -> bool {
    match (height, genesis_height) {
        (Some(h), Some(g)) => h < g,
        _ => false,
    }
}

/// A backward walk from some out point towards one genesis output.
pub struct AncestryWalk<'a, K: ColorKernel + ?Sized> {
    kernel: &'a K,
    ledger: &'a dyn Ledger,
    genesis: OutPoint,
    genesis_height: Option<i64>,
}

impl<'a, K: ColorKernel + ?Sized> AncestryWalk<'a, K> {
    pub fn new(
        kernel: &'a K,
        ledger: &'a dyn Ledger,
        genesis: OutPoint,
        genesis_height: Option<i64>,
    ) -> Self {
        Self {
            kernel,
            ledger,
            genesis,
            genesis_height,
        }
    }

    /// Build a walk, asking the ledger for the genesis height.
    pub fn for_genesis(kernel: &'a K, ledger: &'a dyn Ledger, genesis: OutPoint) -> Result<Self> {
        let genesis_height = ledger.tx_height(&genesis.txid).op(LedgerOp::TxHeight)?;
        Ok(Self::new(kernel, ledger, genesis, genesis_height))
    }

    pub fn genesis(&self) -> &OutPoint {
        &self.genesis
    }

    /// Perform one transition from `current`.
    pub fn step(&self, current: &OutPoint) -> Result<TraceState> {
        if reached_genesis(&self.genesis, current) {
            return Ok(TraceState::ReachedGenesis(*current));
        }

        let height = self
            .ledger
            .tx_height(&current.txid)
            .op(LedgerOp::TxHeight)?;
        if below_genesis_height(height, self.genesis_height) {
            return Ok(TraceState::BelowGenesisHeight(*current));
        }

        let tx = fetch_tx(self.ledger, &current.txid)?;
        let parents =
            match self
                .kernel
                .find_affecting_inputs(self.ledger, &self.genesis, &tx, &[current.index])
            {
                Ok(parents) => parents,
                // The kernel cannot attribute color to this output at all.
                Err(KernelError::BadOutputIndex) => Vec::new(),
                Err(e) => return Err(e),
            };

        if parents.is_empty() {
            Ok(TraceState::Unexplained(*current))
        } else {
            Ok(TraceState::Walking(parents))
        }
    }

    /// Walk every branch from `start` to a terminal state.
    ///
    /// Returns `ReachedGenesis(genesis)` only if all branches ended on the
    /// genesis output; otherwise the first other terminal encountered.
    pub fn run(&self, start: &OutPoint) -> Result<TraceState> {
        debug!("Tracing {} back to genesis {}", start, self.genesis);

        let mut frontier = vec![*start];
        let mut visited = HashSet::new();
        let mut hops = 0usize;

        while let Some(current) = frontier.pop() {
            if !visited.insert(current) {
                continue;
            }
            hops += 1;

            let state = self.step(&current)?;
            trace!("Hop {} at {}: {:?}", hops, current, state);

            match state {
                TraceState::Walking(parents) => frontier.extend(parents),
                TraceState::ReachedGenesis(at) if at == self.genesis => {}
                terminal => {
                    debug!("Trace of {} ended after {} hops: {:?}", start, hops, terminal);
                    return Ok(terminal);
                }
            }
        }

        debug!("Trace of {} reached genesis after {} hops", start, hops);
        Ok(TraceState::ReachedGenesis(self.genesis))
    }

    /// Whether `start` carries color from the genesis output.
    pub fn is_colored(&self, start: &OutPoint) -> Result<bool> {
        Ok(self.run(start)?.is_colored(&self.genesis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::TxId;

    fn op(tag: u8, index: u32) -> OutPoint {
        OutPoint::new(TxId::from_bytes([tag; 32]), index)
    }

    #[test]
    fn test_reached_genesis_compares_txid_only() {
        let genesis = op(1, 0);
        assert!(reached_genesis(&genesis, &op(1, 0)));
        assert!(reached_genesis(&genesis, &op(1, 3)));
        assert!(!reached_genesis(&genesis, &op(2, 0)));
    }

    #[test]
    fn test_below_genesis_height() {
        assert!(below_genesis_height(Some(4), Some(5)));
        assert!(!below_genesis_height(Some(5), Some(5)));
        assert!(!below_genesis_height(Some(6), Some(5)));
        assert!(!below_genesis_height(None, Some(5)));
        assert!(!below_genesis_height(Some(1), None));
    }

    #[test]
    fn test_terminal_states() {
        let genesis = op(1, 0);
        assert!(!TraceState::Walking(vec![genesis]).is_terminal());
        assert!(TraceState::Unexplained(genesis).is_terminal());
        assert!(TraceState::ReachedGenesis(genesis).is_colored(&genesis));
        assert!(!TraceState::ReachedGenesis(op(1, 1)).is_colored(&genesis));
        assert!(!TraceState::BelowGenesisHeight(genesis).is_colored(&genesis));
    }
}
