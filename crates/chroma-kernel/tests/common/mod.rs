//! Shared setup for the integration tests.

#![allow(dead_code)]

use chroma_kernel::{ColorKernel, ColorOut, ColorValue, Kernel, OutPoint};
use chroma_testkit::fixtures::{random_script, LedgerFixture};

/// Route kernel logs to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Issue `color_value` units with `kernel`, confirm it, and return the
/// genesis output.
pub fn issue(
    fixture: &LedgerFixture,
    kernel: &Kernel,
    color_value: ColorValue,
    fee: i64,
) -> OutPoint {
    let needed = kernel.issuing_satoshi_needed(color_value);
    let coin = fixture.fund(needed + fee + 1_000).unwrap();
    let tx = kernel
        .issuing_tx(
            &fixture.ledger,
            &[coin],
            &[ColorOut::new(random_script(), color_value)],
            &random_script(),
            fee,
        )
        .unwrap();
    let txid = fixture.confirm(&tx).unwrap();
    OutPoint::new(txid, 0)
}
