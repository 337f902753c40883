//! Color kernels: the rules that give color meaning on a ledger.
//!
//! Every kernel answers the same questions through [`ColorKernel`]:
//!
//! - how to shape an issuance or a transfer into a transaction,
//! - how color values flow from inputs to outputs of one transaction,
//! - which inputs of a transaction fund a given output,
//! - what color value an arbitrary output carries, by walking its ancestry.
//!
//! The concrete kernels are [`Ifoc`], [`Spobc`] and [`Epobc`]. [`Kernel`]
//! is the closed set of them, dispatching to the right one by variant.

pub mod epobc;
pub mod ifoc;
pub mod spobc;

pub use epobc::Epobc;
pub use ifoc::Ifoc;
pub use spobc::Spobc;

use chroma_core::{
    color::checked_sum, ColorIn, ColorOut, ColorValue, OutPoint, Transaction, TxId, TxOut,
};
use chroma_ledger::{Ledger, LedgerError, LedgerExt, LedgerOp};
use tracing::warn;

use crate::config::KernelConfig;
use crate::error::{KernelError, LedgerResultExt, Result};

/// The capability every color kernel provides.
pub trait ColorKernel {
    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────

    /// Short code naming the kernel in color definitions.
    fn code(&self) -> &'static str;

    /// Amount an issuance of `color_value` locks in its colored output.
    fn issuing_satoshi_needed(&self, color_value: ColorValue) -> i64;

    // ─────────────────────────────────────────────────────────────────────────
    // Tracing
    // ─────────────────────────────────────────────────────────────────────────

    /// Determine the color value `out_point` carries from `genesis`.
    fn out_point_to_color_in(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        out_point: &OutPoint,
    ) -> Result<ColorIn>;

    /// Re-trace each claimed color input, failing on the first mismatch.
    fn color_ins_valid(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        color_ins: &[ColorIn],
    ) -> Result<bool> {
        for claimed in color_ins {
            let traced = self.out_point_to_color_in(ledger, genesis, &claimed.out_point)?;
            if traced.color_value != claimed.color_value {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Build an unsigned transaction creating new color.
    fn issuing_tx(
        &self,
        ledger: &dyn Ledger,
        inputs: &[OutPoint],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
    ) -> Result<Transaction>;

    /// Build an unsigned transaction moving color from `inputs` to `outputs`.
    ///
    /// Output color never exceeds input color, and equals it unless
    /// `destroy` is set.
    fn transferring_tx(
        &self,
        ledger: &dyn Ledger,
        inputs: &[ColorIn],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
        destroy: bool,
    ) -> Result<Transaction>;

    // ─────────────────────────────────────────────────────────────────────────
    // Propagation
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward-simulate color through `tx` given its input values.
    fn calculate_out_color_values(
        &self,
        genesis: &OutPoint,
        tx: &Transaction,
        input_values: &[ColorValue],
    ) -> Result<Vec<ColorValue>>;

    /// Previous outputs of `tx` that fund the outputs at `output_indexes`.
    fn find_affecting_inputs(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        tx: &Transaction,
        output_indexes: &[u32],
    ) -> Result<Vec<OutPoint>>;
}

/// The closed set of color kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kernel {
    Ifoc(Ifoc),
    Spobc(Spobc),
    Epobc(Epobc),
}

impl Kernel {
    /// Build the kernel registered under `code`.
    pub fn from_code(code: &str, config: &KernelConfig) -> Result<Self> {
        match code {
            ifoc::CODE => Ok(Kernel::Ifoc(Ifoc::new(&config.ifoc))),
            spobc::CODE => Ok(Kernel::Spobc(Spobc::new(&config.spobc))),
            epobc::CODE => Ok(Kernel::Epobc(Epobc::new(&config.epobc))),
            other => Err(KernelError::UnknownKernelCode(other.to_string())),
        }
    }

    /// All kernels built from one configuration.
    pub fn all(config: &KernelConfig) -> [Kernel; 3] {
        [
            Kernel::Ifoc(Ifoc::new(&config.ifoc)),
            Kernel::Spobc(Spobc::new(&config.spobc)),
            Kernel::Epobc(Epobc::new(&config.epobc)),
        ]
    }

    fn inner(&self) -> &dyn ColorKernel {
        match self {
            Kernel::Ifoc(k) => k,
            Kernel::Spobc(k) => k,
            Kernel::Epobc(k) => k,
        }
    }
}

impl ColorKernel for Kernel {
    fn code(&self) -> &'static str {
        self.inner().code()
    }

    fn issuing_satoshi_needed(&self, color_value: ColorValue) -> i64 {
        self.inner().issuing_satoshi_needed(color_value)
    }

    fn out_point_to_color_in(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        out_point: &OutPoint,
    ) -> Result<ColorIn> {
        self.inner().out_point_to_color_in(ledger, genesis, out_point)
    }

    fn color_ins_valid(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        color_ins: &[ColorIn],
    ) -> Result<bool> {
        self.inner().color_ins_valid(ledger, genesis, color_ins)
    }

    fn issuing_tx(
        &self,
        ledger: &dyn Ledger,
        inputs: &[OutPoint],
        outputs: &[ColorOut],
        change_script: &[u8],
        fee: i64,
    ) -> Result<Transaction> {
        self.inner()
            .issuing_tx(ledger, inputs, outputs, change_script, fee)
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
        self.inner()
            .transferring_tx(ledger, inputs, outputs, change_script, fee, destroy)
    }

    fn calculate_out_color_values(
        &self,
        genesis: &OutPoint,
        tx: &Transaction,
        input_values: &[ColorValue],
    ) -> Result<Vec<ColorValue>> {
        self.inner()
            .calculate_out_color_values(genesis, tx, input_values)
    }

    fn find_affecting_inputs(
        &self,
        ledger: &dyn Ledger,
        genesis: &OutPoint,
        tx: &Transaction,
        output_indexes: &[u32],
    ) -> Result<Vec<OutPoint>> {
        self.inner()
            .find_affecting_inputs(ledger, genesis, tx, output_indexes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared rules
// ─────────────────────────────────────────────────────────────────────────────

/// Fetch and decode a transaction, logging undecodable ledger data.
pub(crate) fn fetch_tx(ledger: &dyn Ledger, txid: &TxId) -> Result<Transaction> {
    match ledger.tx(txid) {
        Ok(tx) => Ok(tx),
        Err(LedgerError::Decoding(e)) => {
            warn!("Ledger returned undecodable tx {}: {}", txid, e);
            Err(KernelError::LedgerAccess {
                op: LedgerOp::RawTx,
                source: LedgerError::Decoding(e),
            })
        }
        Err(e) => Err(KernelError::LedgerAccess {
            op: LedgerOp::RawTx,
            source: e,
        }),
    }
}

/// Amount held by an output.
pub(crate) fn output_value(ledger: &dyn Ledger, out_point: &OutPoint) -> Result<i64> {
    let tx = fetch_tx(ledger, &out_point.txid)?;
    tx.outputs
        .get(out_point.index as usize)
        .map(|o| o.value)
        .ok_or_else(|| KernelError::InvalidReference(format!("no output {}", out_point)))
}

/// The genesis rule: the genesis transaction mints exactly 1 at the genesis
/// index. `None` when `tx` is not the genesis transaction.
pub(crate) fn genesis_values(
    genesis: &OutPoint,
    tx: &Transaction,
) -> Option<Result<Vec<ColorValue>>> {
    if tx.txid() != genesis.txid {
        return None;
    }
    let index = genesis.index as usize;
    if index >= tx.outputs.len() {
        return Some(Err(KernelError::InvalidReference(format!(
            "genesis index {} out of range",
            genesis.index
        ))));
    }
    let mut values = vec![0; tx.outputs.len()];
    values[index] = 1;
    Some(Ok(values))
}

/// Positional propagation: output `i` carries input `i`'s color when it
/// exists with a nonzero amount. At most one unit of color may enter.
pub(crate) fn positional_values(
    tx: &Transaction,
    input_values: &[ColorValue],
) -> Result<Vec<ColorValue>> {
    if input_values.iter().any(|v| *v > 1) {
        return Err(KernelError::TooMuchColorValue);
    }
    match checked_sum(input_values.iter().copied()) {
        Some(sum) if sum <= 1 => {}
        _ => return Err(KernelError::TooMuchColorValue),
    }

    Ok(tx
        .outputs
        .iter()
        .enumerate()
        .map(|(i, out)| match input_values.get(i).copied() {
            Some(1) if out.value != 0 => 1,
            _ => 0,
        })
        .collect())
}

/// Sum color values, failing on overflow.
pub(crate) fn sum_color(values: impl IntoIterator<Item = ColorValue>) -> Result<ColorValue> {
    checked_sum(values).ok_or(KernelError::TooMuchColorValue)
}

/// A color value as a ledger amount.
pub(crate) fn as_amount(color_value: ColorValue) -> Result<i64> {
    i64::try_from(color_value).map_err(|_| KernelError::TooMuchColorValue)
}

pub(crate) fn ensure_fee(fee: i64) -> Result<()> {
    if fee < 0 {
        return Err(KernelError::NegativeValue);
    }
    Ok(())
}

/// Fail if any of `out_points` is already spent.
pub(crate) fn ensure_unspent<'a>(
    ledger: &dyn Ledger,
    out_points: impl IntoIterator<Item = &'a OutPoint>,
) -> Result<()> {
    for out_point in out_points {
        if ledger
            .is_output_spent(out_point)
            .op(LedgerOp::OutputSpent)?
        {
            return Err(KernelError::OutputAlreadySpent(*out_point));
        }
    }
    Ok(())
}

/// Check `tx`'s inputs cover `required + fee` and append change.
///
/// Change goes to `change_script` and is only added when positive.
pub(crate) fn attach_change(
    ledger: &dyn Ledger,
    tx: &mut Transaction,
    required: i64,
    fee: i64,
    change_script: &[u8],
) -> Result<()> {
    let mut have = 0i64;
    for out_point in tx.previous_outputs() {
        have = have.saturating_add(output_value(ledger, out_point)?);
    }
    let need = required.saturating_add(fee);
    if have < need {
        return Err(KernelError::InsufficientFunds { have, need });
    }

    let change = have - need;
    if change > 0 {
        tx.add_output(TxOut::new(change, change_script.to_vec()));
    }
    Ok(())
}
