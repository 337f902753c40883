//! IFOC: the flat kernel.
//!
//! A single indivisible unit of color rides on output 0 of each transaction,
//! marked by a fixed amount. Input 0 is the only input that can carry it.

use chroma_core::{ColorIn, ColorOut, ColorValue, OutPoint, Transaction, TxIn, TxOut};
use chroma_ledger::Ledger;
use tracing::debug;

use super::{
    attach_change, ensure_fee, genesis_values, output_value, sum_color, ColorKernel,
};
use crate::config::IfocConfig;
use crate::error::{KernelError, Result};
use crate::trace::AncestryWalk;

pub const CODE: &str = "IFOC";

/// The flat kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifoc {
    transfer_amount: i64,
}

impl Ifoc {
    pub fn new(config: &IfocConfig) -> Self {
        Self {
            transfer_amount: config.transfer_amount,
        }
    }

    /// Amount that marks an output as colored.
    pub fn transfer_amount(&self) -> i64 {
        self.transfer_amount
    }

    fn check_outputs(&self, outputs: &[ColorOut], destroy: bool) -> Result<()> {
        if outputs.len() != 1 {
            return Err(KernelError::InvalidColorValue);
        }
        if outputs[0].color_value > 1 {
            return Err(KernelError::InsufficientColorValue);
        }
        if !destroy && outputs[0].color_value < 1 {
            return Err(KernelError::UnintentionalValueDestruction);
        }
        Ok(())
    }
}

impl Default for Ifoc {
    fn default() -> Self {
        Self::new(&IfocConfig::default())
    }
}

impl ColorKernel for Ifoc {
    fn code(&self) -> &'static str {
        CODE
    }

    fn issuing_satoshi_needed(&self, _color_value: ColorValue) -> i64 {
        self.transfer_amount
    }

    fn out_point_to_color_in(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        out_point: &OutPoint,
    ) -> Result<ColorIn> {
        if output_value(ledger, out_point)? != self.transfer_amount {
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
        self.check_outputs(outputs, false)?;

        let mut tx = Transaction::new();
        for input in inputs {
            tx.add_input(TxIn::new(*input));
        }
        tx.add_output(TxOut::new(self.transfer_amount, outputs[0].script.clone()));
        attach_change(ledger, &mut tx, self.transfer_amount, fee, change_script)?;

        debug!("Built IFOC issuance {}", tx.txid());
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
        self.check_outputs(outputs, destroy)?;

        let in_sum = sum_color(inputs.iter().map(|i| i.color_value))?;
        if in_sum != 1 || inputs[0].color_value != 1 {
            return Err(KernelError::InvalidColorValue);
        }
        let out_sum = sum_color(outputs.iter().map(|o| o.color_value))?;
        if out_sum > in_sum {
            return Err(KernelError::InsufficientColorValue);
        }

        // A destroyed unit goes to an empty output so the amount no longer
        // marks it as colored.
        let amount = if outputs[0].color_value == 1 {
            self.transfer_amount
        } else {
            0
        };

        let mut tx = Transaction::new();
        for input in inputs {
            tx.add_input(TxIn::new(input.out_point));
        }
        tx.add_output(TxOut::new(amount, outputs[0].script.clone()));
        attach_change(ledger, &mut tx, amount, fee, change_script)?;

        debug!("Built IFOC transfer {} (destroy: {})", tx.txid(), destroy);
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

        let sum = sum_color(input_values.iter().copied())?;
        if sum > 1 {
            return Err(KernelError::TooMuchColorValue);
        }

        let mut values = vec![0; tx.outputs.len()];
        if sum == 0 {
            return Ok(values);
        }
        if input_values[0] != 1 {
            return Err(KernelError::InvalidColorValue);
        }
        if let Some(first) = tx.outputs.first() {
            if first.value == self.transfer_amount {
                values[0] = 1;
            }
        }
        Ok(values)
    }

    fn find_affecting_inputs(
        &self,
        ledger: &dyn Ledger,
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
        if output_indexes[0] != 0 {
            return Err(KernelError::BadOutputIndex);
        }

        let Some(first) = tx.inputs.first() else {
            return Ok(Vec::new());
        };
        let prev = first.previous_output;
        if prev.is_null() || output_value(ledger, &prev)? != self.transfer_amount {
            return Ok(Vec::new());
        }
        Ok(vec![prev])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_ledger::MemoryLedger;

    fn kernel() -> Ifoc {
        Ifoc::default()
    }

    fn funded(ledger: &MemoryLedger, amount: i64) -> OutPoint {
        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(OutPoint::NULL));
        tx.add_output(TxOut::new(amount, vec![0x51]));
        tx.lock_time = ledger.block_count().unwrap() as u32;
        OutPoint::new(ledger.insert_confirmed(tx).unwrap(), 0)
    }

    #[test]
    fn test_check_outputs() {
        let k = kernel();
        assert!(k.check_outputs(&[ColorOut::new(vec![1], 1)], false).is_ok());
        assert!(k.check_outputs(&[ColorOut::new(vec![1], 0)], true).is_ok());
        assert!(matches!(
            k.check_outputs(&[], false),
            Err(KernelError::InvalidColorValue)
        ));
        assert!(matches!(
            k.check_outputs(&[ColorOut::new(vec![1], 2)], false),
            Err(KernelError::InsufficientColorValue)
        ));
        assert!(matches!(
            k.check_outputs(&[ColorOut::new(vec![1], 0)], false),
            Err(KernelError::UnintentionalValueDestruction)
        ));
    }

    #[test]
    fn test_issuing_tx_shape() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 15_000);
        let tx = kernel()
            .issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 1)], &[0xcc], 100)
            .unwrap();

        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].value, 10_000);
        assert_eq!(tx.outputs[0].script_pubkey.as_ref(), &[0xaa]);
        assert_eq!(tx.outputs[1].value, 4_900);
        assert_eq!(tx.outputs[1].script_pubkey.as_ref(), &[0xcc]);
    }

    #[test]
    fn test_issuing_tx_insufficient_funds() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 9_000);
        let result =
            kernel().issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 1)], &[], 100);
        assert!(matches!(
            result,
            Err(KernelError::InsufficientFunds {
                have: 9_000,
                need: 10_100
            })
        ));
    }

    #[test]
    fn test_negative_fee() {
        let ledger = MemoryLedger::new();
        let input = funded(&ledger, 20_000);
        let result =
            kernel().issuing_tx(&ledger, &[input], &[ColorOut::new(vec![0xaa], 1)], &[], -1);
        assert!(matches!(result, Err(KernelError::NegativeValue)));
    }

    #[test]
    fn test_transfer_requires_color_on_first_input() {
        let ledger = MemoryLedger::new();
        let a = funded(&ledger, 10_000);
        let b = funded(&ledger, 10_000);
        let result = kernel().transferring_tx(
            &ledger,
            &[ColorIn::new(a, 0), ColorIn::new(b, 1)],
            &[ColorOut::new(vec![0xaa], 1)],
            &[],
            0,
            false,
        );
        assert!(matches!(result, Err(KernelError::InvalidColorValue)));
    }

    #[test]
    fn test_transfer_rejects_bad_outputs() {
        let ledger = MemoryLedger::new();
        let a = funded(&ledger, 10_000);
        let result = kernel().transferring_tx(
            &ledger,
            &[ColorIn::new(a, 1)],
            &[ColorOut::new(vec![0xaa], 1), ColorOut::new(vec![0xbb], 0)],
            &[],
            0,
            false,
        );
        assert!(matches!(result, Err(KernelError::InvalidColorValue)));
    }

    #[test]
    fn test_destroying_transfer_burns_the_unit() {
        let ledger = MemoryLedger::new();
        let a = funded(&ledger, 10_000);
        let tx = kernel()
            .transferring_tx(
                &ledger,
                &[ColorIn::new(a, 1)],
                &[ColorOut::new(vec![0xaa], 0)],
                &[0xcc],
                500,
                true,
            )
            .unwrap();

        assert_eq!(tx.outputs[0].value, 0);
        assert_eq!(tx.outputs[1].value, 9_500);
        let genesis = OutPoint::new(chroma_core::TxId::from_bytes([1; 32]), 0);
        let values = kernel()
            .calculate_out_color_values(&genesis, &tx, &[1])
            .unwrap();
        assert_eq!(values, vec![0, 0]);
    }

    #[test]
    fn test_calculate_out_color_values() {
        let k = kernel();
        let genesis = OutPoint::new(chroma_core::TxId::from_bytes([1; 32]), 0);
        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(OutPoint::NULL));
        tx.add_input(TxIn::new(OutPoint::NULL));
        tx.add_output(TxOut::new(10_000, vec![]));
        tx.add_output(TxOut::new(3_000, vec![]));

        assert_eq!(k.calculate_out_color_values(&genesis, &tx, &[1, 0]).unwrap(), vec![1, 0]);
        assert_eq!(k.calculate_out_color_values(&genesis, &tx, &[0, 0]).unwrap(), vec![0, 0]);
        assert!(matches!(
            k.calculate_out_color_values(&genesis, &tx, &[1, 1]),
            Err(KernelError::TooMuchColorValue)
        ));
        assert!(matches!(
            k.calculate_out_color_values(&genesis, &tx, &[0, 1]),
            Err(KernelError::InvalidColorValue)
        ));

        tx.outputs[0].value = 9_999;
        assert_eq!(k.calculate_out_color_values(&genesis, &tx, &[1, 0]).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_affecting_inputs_errors() {
        let ledger = MemoryLedger::new();
        let genesis = OutPoint::new(chroma_core::TxId::from_bytes([1; 32]), 0);
        let tx = Transaction::new();
        let k = kernel();

        assert!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[]).unwrap().is_empty());
        assert!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[0]).unwrap().is_empty());
        assert!(matches!(
            k.find_affecting_inputs(&ledger, &genesis, &tx, &[0, 1]),
            Err(KernelError::TooManyOutputs)
        ));
        assert!(matches!(
            k.find_affecting_inputs(&ledger, &genesis, &tx, &[1]),
            Err(KernelError::BadOutputIndex)
        ));
    }

    #[test]
    fn test_affecting_inputs_checks_previous_amount() {
        let ledger = MemoryLedger::new();
        let genesis = OutPoint::new(chroma_core::TxId::from_bytes([1; 32]), 0);
        let colored = funded(&ledger, 10_000);
        let plain = funded(&ledger, 12_000);
        let k = kernel();

        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(colored));
        assert_eq!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[0]).unwrap(), vec![colored]);

        let mut tx = Transaction::new();
        tx.add_input(TxIn::new(plain));
        assert!(k.find_affecting_inputs(&ledger, &genesis, &tx, &[0]).unwrap().is_empty());
    }
}
