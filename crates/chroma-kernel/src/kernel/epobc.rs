//! EPOBC: the padded kernel.
//!
//! Colored outputs hold their color value plus a padding of `2^e` so that
//! every output clears the ledger's dust minimum. Input 0's sequence number
//! records the operation and the exponent:
//!
//! ```text
//! bit  0..6   marker    genesis 101001 / transfer 110011 (LSB first)
//! bit  6..12  exponent  e, padding = 2^e
//! bit 12..32  zero
//! ```
//!
//! Color is divisible. Within a transfer, inputs are consumed in order to
//! fund outputs in order, so one output can draw on several inputs and one
//! input can fund several outputs.

use std::collections::BTreeSet;

use chroma_core::{BitList, ColorIn, ColorOut, ColorValue, OutPoint, Transaction, TxIn, TxOut};
use chroma_ledger::{Ledger, LedgerOp};
use tracing::debug;

use super::{
    as_amount, attach_change, ensure_fee, ensure_unspent, fetch_tx, genesis_values,
    positional_values, sum_color, ColorKernel,
};
use crate::config::EpobcConfig;
use crate::error::{KernelError, LedgerResultExt, Result};
use crate::trace::AncestryWalk;

pub const CODE: &str = "EPOBC";

const MARKER_BITS: usize = 6;
const EXPONENT_BITS: usize = 6;
const MAX_EXPONENT: u32 = 62;

/// Which operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Genesis,
    Transfer,
}

impl Marker {
    pub fn bits(&self) -> BitList {
        let bits = match self {
            Marker::Genesis => vec![true, false, true, false, false, true],
            Marker::Transfer => vec![true, true, false, false, true, true],
        };
        BitList::from(bits)
    }

    fn from_value(value: u32) -> Option<Self> {
        [Marker::Genesis, Marker::Transfer]
            .into_iter()
            .find(|m| m.bits().decode() == value)
    }
}

/// The marker and padding exponent stored in input 0's sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub marker: Marker,
    pub exponent: u32,
}

impl Tag {
    pub fn new(marker: Marker, exponent: u32) -> Self {
        Self { marker, exponent }
    }

    /// The sequence number carrying this tag.
    pub fn sequence(&self) -> u32 {
        self.marker
            .bits()
            .combine(&BitList::encode(self.exponent, EXPONENT_BITS))
            .combine(&BitList::encode(0, 32 - MARKER_BITS - EXPONENT_BITS))
            .decode()
    }

    /// Read a tag back from a sequence number.
    pub fn from_sequence(sequence: u32) -> Option<Self> {
        let bits = BitList::encode(sequence, 32);
        let marker = Marker::from_value(bits.slice(0..MARKER_BITS).decode())?;
        let exponent = bits.slice(MARKER_BITS..MARKER_BITS + EXPONENT_BITS).decode();
        let rest = bits.slice(MARKER_BITS + EXPONENT_BITS..32).decode();
        if rest != 0 || exponent > MAX_EXPONENT {
            return None;
        }
        Some(Self { marker, exponent })
    }

    /// The tag of `tx`, if it is an EPOBC transaction at all.
    pub fn of(tx: &Transaction) -> Option<Self> {
        tx.inputs
            .first()
            .and_then(|input| Self::from_sequence(input.sequence))
    }

    pub fn padding(&self) -> i64 {
        1i64 << self.exponent
    }
}

/// Indexes of the inputs that fund the `wanted` outputs.
///
/// `input_values` are decoded color values; output values are decoded as
/// `amount - padding`. Inputs are consumed in order: an output covering the
/// cumulative range `(start, end]` is funded by every nonzero input whose
/// own cumulative range overlaps it. Outputs with no value, and every output
/// from the first one the inputs cannot cover, are funded by nothing.
pub fn affecting_indexes(
    input_values: &[ColorValue],
    output_amounts: &[i64],
    padding: i64,
    wanted: &[usize],
) -> Vec<usize> {
    let mut prefix = Vec::with_capacity(input_values.len());
    let mut in_sum = 0i128;
    for value in input_values {
        in_sum += *value as i128;
        prefix.push(in_sum);
    }

    let mut found = BTreeSet::new();
    let mut out_sum = 0i128;
    let mut cursor = 0;

    for (i, amount) in output_amounts.iter().enumerate() {
        let value = *amount as i128 - padding as i128;
        if value <= 0 {
            continue;
        }
        let start = out_sum;
        out_sum += value;
        if out_sum > in_sum {
            break;
        }

        while cursor < prefix.len() && prefix[cursor] <= start {
            cursor += 1;
        }
        if !wanted.contains(&i) {
            continue;
        }
        for j in cursor..prefix.len() {
            if input_values[j] > 0 {
                found.insert(j);
            }
            if prefix[j] >= out_sum {
                break;
            }
        }
    }

    found.into_iter().collect()
}

/// The padded kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epobc {
    minimum_satoshi: i64,
}

impl Epobc {
    pub fn new(config: &EpobcConfig) -> Self {
        Self {
            minimum_satoshi: config.minimum_satoshi,
        }
    }

    pub fn minimum_satoshi(&self) -> i64 {
        self.minimum_satoshi
    }

    /// Smallest `e` with `2^e >= minimum_satoshi - color_value`.
    pub fn padding_exponent(&self, color_value: ColorValue) -> u32 {
        let need = self.minimum_satoshi as i128 - color_value as i128;
        let mut exponent = 0;
        while exponent < MAX_EXPONENT && (1i128 << exponent) < need {
            exponent += 1;
        }
        exponent
    }

    pub fn padding(&self, color_value: ColorValue) -> i64 {
        1i64 << self.padding_exponent(color_value)
    }

    /// Color value held by a previous output, after removing the padding
    /// of the transaction that created it.
    fn decoded_value(&self, ledger: &dyn Ledger, out_point: &OutPoint) -> Result<ColorValue> {
        if out_point.is_null() {
            return Ok(0);
        }
        let tx = fetch_tx(ledger, &out_point.txid)?;
        let Some(tag) = Tag::of(&tx) else {
            return Ok(0);
        };
        let amount = tx
            .outputs
            .get(out_point.index as usize)
            .map(|o| o.value)
            .ok_or_else(|| KernelError::InvalidReference(format!("no output {}", out_point)))?;
        Ok(amount.saturating_sub(tag.padding()).max(0) as ColorValue)
    }

    fn build(
        &self,
        ledger: &dyn Ledger,
        tag: Tag,
        inputs: &[OutPoint],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
    ) -> Result<Transaction> {
        let mut tx = Transaction::new();
        for (i, input) in inputs.iter().enumerate() {
            let txin = TxIn::new(*input);
            tx.add_input(if i == 0 {
                txin.with_sequence(tag.sequence())
            } else {
                txin
            });
        }

        let mut required = 0i64;
        for output in outputs {
            let amount = as_amount(output.color_value)?
                .checked_add(tag.padding())
                .ok_or(KernelError::TooMuchColorValue)?;
            required = required.saturating_add(amount);
            tx.add_output(TxOut::new(amount, output.script.clone()));
        }
        attach_change(ledger, &mut tx, required, fee, change_script)?;
        Ok(tx)
    }
}

impl Default for Epobc {
    fn default() -> Self {
        Self::new(&EpobcConfig::default())
    }
}

impl ColorKernel for Epobc {
    fn code(&self) -> &'static str {
        CODE
    }

    fn issuing_satoshi_needed(&self, color_value: ColorValue) -> i64 {
        let cv = i64::try_from(color_value).unwrap_or(i64::MAX);
        self.padding(color_value).saturating_add(cv)
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
        let value = self.decoded_value(ledger, out_point)?;
        if value == 0 {
            return Ok(ColorIn::uncolored(*out_point));
        }

        let walk = AncestryWalk::for_genesis(self, ledger, *genesis)?;
        let color_value = if walk.is_colored(out_point)? { value } else { 0 };
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
        if outputs[0].color_value == 0 {
            return Err(KernelError::InsufficientColorValue);
        }
        ensure_unspent(ledger, inputs)?;

        let tag = Tag::new(Marker::Genesis, self.padding_exponent(outputs[0].color_value));
        let tx = self.build(ledger, tag, inputs, outputs, change_script, fee)?;

        debug!("Built EPOBC issuance {} with padding {}", tx.txid(), tag.padding());
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
        if inputs.is_empty() {
            return Err(KernelError::InsufficientColorValue);
        }
        if inputs.iter().any(|i| i.color_value == 0) || outputs.iter().any(|o| o.color_value == 0)
        {
            return Err(KernelError::InsufficientColorValue);
        }

        let in_sum = sum_color(inputs.iter().map(|i| i.color_value))?;
        let out_sum = sum_color(outputs.iter().map(|o| o.color_value))?;
        if out_sum > in_sum {
            return Err(KernelError::InsufficientColorValue);
        }
        if out_sum < in_sum && !destroy {
            return Err(KernelError::UnintentionalValueDestruction);
        }
        ensure_unspent(ledger, inputs.iter().map(|i| &i.out_point))?;

        let smallest = outputs
            .iter()
            .map(|o| o.color_value)
            .min()
            .unwrap_or(self.minimum_satoshi.max(0) as ColorValue);
        let tag = Tag::new(Marker::Transfer, self.padding_exponent(smallest));
        let out_points: Vec<OutPoint> = inputs.iter().map(|i| i.out_point).collect();
        let tx = self.build(ledger, tag, &out_points, outputs, change_script, fee)?;

        debug!(
            "Built EPOBC transfer {} with padding {} (destroy: {})",
            tx.txid(),
            tag.padding(),
            destroy
        );
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
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        tx: &Transaction,
        output_indexes: &[u32],
    ) -> Result<Vec<OutPoint>> {
        if output_indexes.is_empty() || tx.txid() == genesis.txid {
            return Ok(Vec::new());
        }
        if output_indexes
            .iter()
            .any(|i| *i as usize >= tx.outputs.len())
        {
            return Err(KernelError::BadOutputIndex);
        }
        let Some(tag) = Tag::of(tx) else {
            return Ok(Vec::new());
        };
        // Another color's issuance mints fresh value; its inputs carry none of ours.
        if tag.marker == Marker::Genesis {
            return Ok(Vec::new());
        }

        let mut input_values = Vec::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            input_values.push(self.decoded_value(ledger, &input.previous_output)?);
        }
        let amounts: Vec<i64> = tx.outputs.iter().map(|o| o.value).collect();
        let wanted: Vec<usize> = output_indexes.iter().map(|i| *i as usize).collect();

        Ok(affecting_indexes(&input_values, &amounts, tag.padding(), &wanted)
            .into_iter()
            .map(|j| tx.inputs[j].previous_output)
            .collect())
    }
}
