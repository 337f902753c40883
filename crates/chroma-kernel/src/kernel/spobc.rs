//! SPOBC: the marker kernel.
//!
//! One indivisible unit of color moves by position: whatever input `i`
//! carries goes to output `i`. Issuances and transfers tag input 0 with a
//! sequence marker.

use chroma_core::{BitList, ColorIn, ColorOut, ColorValue, OutPoint, Transaction, TxIn, TxOut};
use chroma_ledger::{Ledger, LedgerOp};
use tracing::debug;

use super::{
    attach_change, ensure_fee, ensure_unspent, genesis_values, output_value, positional_values,
    sum_color, ColorKernel,
};
use crate::config::SpobcConfig;
use crate::error::{KernelError, LedgerResultExt, Result};
use crate::trace::AncestryWalk;

pub const CODE: &str = "SPOBC";

/// Sequence number of input 0 in SPOBC transactions.
pub fn sequence_marker() -> u32 {
    BitList::encode(1, 32).decode()
}

/// The marker kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spobc {
    minimum_satoshi: i64,
}

impl Spobc {
    pub fn new(config: &SpobcConfig) -> Self {
        Self {
            minimum_satoshi: config.minimum_satoshi,
        }
    }

    pub fn minimum_satoshi(&self) -> i64 {
        self.minimum_satoshi
    }

    fn check_transfer(
        &self,
        inputs: &[ColorIn],
        outputs: &[ColorOut],
        destroy: bool,
    ) -> Result<()> {
        for (i, output) in outputs.iter().enumerate() {
            let carried = inputs.get(i).map_or(0, |input| input.color_value);
            if output.color_value > carried {
                return Err(KernelError::InsufficientColorValue);
            }
        }
        if !destroy {
            for (i, input) in inputs.iter().enumerate() {
                let kept = outputs.get(i).map_or(0, |output| output.color_value);
                if input.color_value > 0 && kept == 0 {
                    return Err(KernelError::UnintentionalValueDestruction);
                }
            }
        }

        let sum = sum_color(inputs.iter().map(|i| i.color_value))?;
        if sum > 1 {
            return Err(KernelError::TooMuchColorValue);
        }
        if sum == 0 {
            return Err(KernelError::InsufficientColorValue);
        }
        Ok(())
    }
}

impl Default for Spobc {
    fn default() -> Self {
        Self::new(&SpobcConfig::default())
    }
}

impl ColorKernel for Spobc {
    fn code(&self) -> &'static str {
        CODE
    }

    fn issuing_satoshi_needed(&self, _color_value: ColorValue) -> i64 {
        self.minimum_satoshi
    }

    fn out_point_to_color_in(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        out_point: &OutPoint,
    ) -> Result<ColorIn> {
        if ledger
            .is_output_spent(out_point)
            .op(LedgerOp::OutputSpent)?
        {
            return Ok(ColorIn::uncolored(*out_point));
        }
        // A zero amount output has been destroyed.
        if output_value(ledger, out_point)? == 0 {
            return Ok(ColorIn::uncolored(*out_point));
        }

        let walk = AncestryWalk::for_genesis(self, ledger, *genesis)?;
        let color_value = if walk.is_colored(out_point)? { 1 } else { 0 };
        Ok(ColorIn::new(*out_point, color_value))
    }

    fn issuing_tx(
        &self,
        ledger: &dyn Ledger,
        inputs: &[OutPoint],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
    ) -> Result<Transaction> {
        ensure_fee(fee)?;
        if outputs.len() != 1 {
            return Err(KernelError::InvalidColorValue);
        }
        if outputs[0].color_value != 1 {
            return Err(KernelError::InsufficientColorValue);
        }
        ensure_unspent(ledger, inputs)?;

        let mut tx = Transaction::new();
        for (i, input) in inputs.iter().enumerate() {
            let txin = TxIn::new(*input);
            tx.add_input(if i == 0 {
                txin.with_sequence(sequence_marker())
            } else {
                txin
            });
        }
        tx.add_output(TxOut::new(self.minimum_satoshi, outputs[0].script.clone()));
        attach_change(ledger, &mut tx, self.minimum_satoshi, fee, change_script)?;

        debug!("Built SPOBC issuance {}", tx.txid());
        Ok(tx)
    }

    fn transferring_tx(
        &self,
        ledger: &dyn Ledger,
        inputs: &[ColorIn],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
        destroy: bool,
    ) -> Result<Transaction> {
        ensure_fee(fee)?;
        self.check_transfer(inputs, outputs, destroy)?;
        ensure_unspent(ledger, inputs.iter().map(|i| &i.out_point))?;

        let mut tx = Transaction::new();
        for (i, input) in inputs.iter().enumerate() {
            let txin = TxIn::new(input.out_point);
            tx.add_input(if i == 0 {
                txin.with_sequence(sequence_marker())
            } else {
                txin
            });
        }

        // An output dropping a colored input's unit holds nothing, which
        // is what burns it under positional propagation.
        let mut required = 0i64;
        for (i, output) in outputs.iter().enumerate() {
            let burns = output.color_value == 0
                && inputs.get(i).map_or(false, |input| input.color_value > 0);
            let amount = if burns { 0 } else { self.minimum_satoshi };
            required = required.saturating_add(amount);
            tx.add_output(TxOut::new(amount, output.script.clone()));
        }
        attach_change(ledger, &mut tx, required, fee, change_script)?;

        debug!("Built SPOBC transfer {} (destroy: {})", tx.txid(), destroy);
        Ok(tx)
    }

    fn calculate_out_color_values(
        &self,
        genesis: &OutPoint,
        tx: &Transaction,
        input_values: &[ColorValue],
    ) -> Result<Vec<ColorValue>> {
        if let Some(values) = genesis_values(genesis, tx) {
            return values;
        }
        positional_values(tx, input_values)
    }

    fn find_affecting_inputs(
        &self,
        _ledger: &dyn Ledger,
        genesis: &OutPoint,
        tx: &Transaction,
        output_indexes: &[u32],
    ) -> Result<Vec<OutPoint>> {
        if output_indexes.is_empty() || tx.txid() == genesis.txid {
            return Ok(Vec::new());
        }
        if output_indexes.len() > 1 {
            return Err(KernelError::TooManyOutputs);
        }

        let index = output_indexes[0] as usize;
        if index >= tx.outputs.len() {
            return Err(KernelError::BadOutputIndex);
        }
        match tx.inputs.get(index) {
            Some(input) if !input.previous_output.is_null() => Ok(vec![input.previous_output]),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::TxId;
    use chroma_ledger::MemoryLedger;

    fn kernel() -> Spobc {
        Spobc::default()
    }

    fn funded(ledger: &MemoryLedger, amount: i64) -> OutPoint {
        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(OutPoint::NULL));
        tx.add_output(TxOut::new(amount, vec![0x51]));
        tx.lock_time = ledger.block_count().unwrap() as u32;
        OutPoint::new(ledger.insert_confirmed(tx).unwrap(), 0)
    }

    fn op(tag: u8) -> OutPoint {
        OutPoint::new(TxId::from_bytes([tag; 32]), 0)
    }

    #[test]
    fn test_sequence_marker() {
        assert_eq!(sequence_marker(), 1);
    }

    #[test]
    fn test_check_transfer() {
        let k = kernel();
        let out = |cv| ColorOut::new(vec![0xaa], cv);

        assert!(k
            .check_transfer(&[ColorIn::new(op(1), 1)], &[out(1)], false)
            .is_ok());
        assert!(matches!(
            k.check_transfer(&[ColorIn::new(op(1), 0)], &[out(1)], false),
            Err(KernelError::InsufficientColorValue)
        ));
        assert!(matches!(
            k.check_transfer(&[ColorIn::new(op(1), 1)], &[out(0)], false),
            Err(KernelError::UnintentionalValueDestruction)
        ));
        assert!(matches!(
            k.check_transfer(&[ColorIn::new(op(1), 0), ColorIn::new(op(2), 1)], &[out(0)], false),
            Err(KernelError::UnintentionalValueDestruction)
        ));
        assert!(k
            .check_transfer(&[ColorIn::new(op(1), 1)], &[out(0)], true)
            .is_ok());
        assert!(matches!(
            k.check_transfer(
                &[ColorIn::new(op(1), 1), ColorIn::new(op(2), 1)],
                &[out(1), out(1)],
                false
            ),
            Err(KernelError::TooMuchColorValue)
        ));
        assert!(matches!(
            k.check_transfer(&[ColorIn::new(op(1), 0)], &[out(0)], true),
            Err(KernelError::InsufficientColorValue)
        ));
    }

    #[test]
    fn test_issuing_tx() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 10_000);
        let tx = kernel()
            .issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 1)], &[0xcc], 70)
            .unwrap();

        assert_eq!(tx.inputs[0].sequence, 1);
        assert_eq!(tx.outputs[0].value, 5_430);
        assert_eq!(tx.outputs[1].value, 10_000 - 5_430 - 70);
    }

    #[test]
    fn test_issuing_tx_rejects_spent_input() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 10_000);
        let mut spend = Transaction::new();
        spend.add_input(TxIn::new(input));
        spend.add_output(TxOut::new(9_000, vec![]));
        chroma_ledger::LedgerExt::publish_tx(&ledger, &spend).unwrap();

        let result =
            kernel().issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 1)], &[], 0);
        assert!(matches!(result, Err(KernelError::OutputAlreadySpent(o)) if o == input));
    }

    #[test]
    fn test_issuing_tx_output_checks() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 10_000);
        assert!(matches!(
            kernel().issuing_tx(&ledger, &[input], &[], &[], 0),
            Err(KernelError::InvalidColorValue)
        ));
        assert!(matches!(
            kernel().issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 2)], &[], 0),
            Err(KernelError::InsufficientColorValue)
        ));
    }

    #[test]
    fn test_transfer_funds_every_output() {
        let ledger = MemoryLedger::new();
        let colored = funded(&ledger, 5_430);
        let extra = funded(&ledger, 6_000);
        let inputs = [ColorIn::new(colored, 1), ColorIn::uncolored(extra)];
        let outputs = [ColorOut::new(vec![0xaa], 1), ColorOut::new(vec![0xbb], 0)];

        let tx = kernel()
            .transferring_tx(&ledger, &inputs, &outputs, &[0xcc], 100, false)
            .unwrap();

        assert_eq!(tx.inputs[0].sequence, sequence_marker());
        assert_eq!(tx.inputs[1].sequence, chroma_core::SEQUENCE_FINAL);
        assert_eq!(tx.outputs.len(), 3);
        assert_eq!(tx.outputs[0].value, 5_430);
        assert_eq!(tx.outputs[1].value, 5_430);
        assert_eq!(tx.outputs[2].value, 11_430 - 2 * 5_430 - 100);

        let genesis = op(9);
        let values = kernel()
            .calculate_out_color_values(&genesis, &tx, &[1, 0])
            .unwrap();
        assert_eq!(values, vec![1, 0, 0]);
    }

    #[test]
    fn test_transfer_insufficient_for_all_outputs() {
        let ledger = MemoryLedger::new();
        let colored = funded(&ledger, 5_430);
        let inputs = [ColorIn::new(colored, 1)];
        let outputs = [ColorOut::new(vec![0xaa], 1), ColorOut::new(vec![0xbb], 0)];

        let result = kernel().transferring_tx(&ledger, &inputs, &outputs, &[], 0, false);
        assert!(matches!(
            result,
            Err(KernelError::InsufficientFunds {
                have: 5_430,
                need: 10_860
            })
        ));
    }

    #[test]
    fn test_destroying_transfer_burns_the_unit() {
        let ledger = MemoryLedger::new();
        let colored = funded(&ledger, 5_430);
        let tx = kernel()
            .transferring_tx(
                &ledger,
                &[ColorIn::new(colored, 1)],
                &[ColorOut::new(vec![0xaa], 0)],
                &[0xcc],
                0,
                true,
            )
            .unwrap();

        assert_eq!(tx.outputs[0].value, 0);
        let values = kernel()
            .calculate_out_color_values(&op(9), &tx, &[1])
            .unwrap();
        assert_eq!(values.iter().sum::<u64>(), 0);
    }

    #[test]
    fn test_affecting_inputs_positional() {
        let ledger = MemoryLedger::new();
        let genesis = op(9);
        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(op(1)));
        tx.add_input(TxIn::new(op(2)));
        for _ in 0..3 {
            tx.add_output(TxOut::new(5_430, vec![]));
        }
        let k = kernel();

        assert_eq!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[1]).unwrap(), vec![op(2)]);
        assert!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[2]).unwrap().is_empty());
        assert!(matches!(
            k.find_affecting_inputs(&ledger, &genesis, &tx, &[3]),
            Err(KernelError::BadOutputIndex)
        ));
        assert!(matches!(
            k.find_affecting_inputs(&ledger, &genesis, &tx, &[0, 1]),
            Err(KernelError::TooManyOutputs)
        ));
    }
}
