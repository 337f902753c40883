//! Proptest generators for property-based testing.

use proptest::prelude::*;

use chroma_core::{ColorIn, ColorValue, OutPoint, Transaction, TxId, TxIn, TxOut};

/// Generate a random TxId.
pub fn txid() -> impl Strategy<Value = TxId> {
    any::<[u8; 32]>().prop_map(TxId::from_bytes)
}

/// Generate a random OutPoint.
pub fn out_point() -> impl Strategy<Value = OutPoint> {
    (txid(), 0u32..16).prop_map(|(txid, index)| OutPoint::new(txid, index))
}

/// Generate a color value no larger than `max`.
pub fn color_value(max: ColorValue) -> impl Strategy<Value = ColorValue> {
    0..=max
}

/// Generate a ColorIn.
pub fn color_in() -> impl Strategy<Value = ColorIn> {
    (out_point(), color_value(1_000_000)).prop_map(|(op, cv)| ColorIn::new(op, cv))
}

/// Generate script bytes.
pub fn script() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=40)
}

/// Generate a kernel code.
pub fn kernel_code() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("IFOC"), Just("SPOBC"), Just("EPOBC")]
}

/// Generate a canonical color definition string.
pub fn definition_string() -> impl Strategy<Value = String> {
    (kernel_code(), txid(), any::<u32>(), 0i64..=i64::MAX)
        .prop_map(|(code, txid, index, height)| format!("{}:{}:{}:{}", code, txid, index, height))
}

fn tx_in() -> impl Strategy<Value = TxIn> {
    (out_point(), script(), any::<u32>()).prop_map(|(prev, script_sig, sequence)| TxIn {
        previous_output: prev,
        script_sig: script_sig.into(),
        sequence,
    })
}

fn tx_out() -> impl Strategy<Value = TxOut> {
    (0i64..=21_000_000 * 100_000_000, script()).prop_map(|(value, s)| TxOut::new(value, s))
}

/// Generate an arbitrary (not necessarily valid) transaction.
pub fn transaction() -> impl Strategy<Value = Transaction> {
    (
        any::<i32>(),
        prop::collection::vec(tx_in(), 0..6),
        prop::collection::vec(tx_out(), 0..6),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

/// A color value split into nonzero parts that sum back to it.
#[derive(Debug, Clone)]
pub struct SplitParams {
    pub total: ColorValue,
    pub parts: Vec<ColorValue>,
}

impl Arbitrary for SplitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(1u64..=10_000, 1..5)
            .prop_map(|parts| SplitParams {
                total: parts.iter().sum(),
                parts,
            })
            .boxed()
    }
}
