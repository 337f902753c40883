//! Transactions and their wire encoding.
//!
//! The layout follows the ledger's legacy serialization:
//!
//! ```text
//! version:i32le | n_in:varint | { prev_txid:32 | prev_index:u32le | script:varbytes | sequence:u32le }*
//!               | n_out:varint | { value:i64le | script:varbytes }* | lock_time:u32le
//! ```
//!
//! A transaction id is SHA-256d over exactly these bytes, so encoding must be
//! deterministic and decoding must reject anything that would not re-encode to
//! the same bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{OutPoint, TxId};

/// Sequence number of an input that opts out of any marker.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Upper bound on inputs/outputs accepted when decoding.
const MAX_VEC_LEN: u64 = 1 << 20;

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// Unlocking script. Left empty by the kernels; signing happens elsewhere.
    pub script_sig: Bytes,
    /// Sequence number. The marker kernels store their tags here.
    pub sequence: u32,
}

impl TxIn {
    /// An unsigned input with the final sequence number.
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Bytes::new(),
            sequence: SEQUENCE_FINAL,
        }
    }

    /// Replace the sequence number.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in the ledger's base unit.
    pub value: i64,
    /// Locking script.
    pub script_pubkey: Bytes,
}

impl TxOut {
    pub fn new(value: i64, script_pubkey: impl Into<Bytes>) -> Self {
        Self {
            value,
            script_pubkey: script_pubkey.into(),
        }
    }
}

/// An unsigned or signed ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// An empty version-1 transaction.
    pub fn new() -> Self {
        Self {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    pub fn add_input(&mut self, input: TxIn) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TxOut) {
        self.outputs.push(output);
    }

    /// Compute the transaction id.
    pub fn txid(&self) -> TxId {
        TxId::hash(&self.to_bytes())
    }

    /// The out points this transaction spends, in input order.
    pub fn previous_outputs(&self) -> impl Iterator<Item = &OutPoint> {
        self.inputs.iter().map(|i| &i.previous_output)
    }

    /// Sum of all output amounts.
    pub fn output_total(&self) -> i64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.inputs.len() * 41 + self.outputs.len() * 9);
        buf.extend_from_slice(&self.version.to_le_bytes());

        encode_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(input.previous_output.txid.as_bytes());
            buf.extend_from_slice(&input.previous_output.index.to_le_bytes());
            encode_var_bytes(&mut buf, &input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        encode_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            encode_var_bytes(&mut buf, &output.script_pubkey);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Deserialize from wire bytes. Trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let version = i32::from_le_bytes(reader.array()?);

        let n_in = reader.len_prefix()?;
        let mut inputs = Vec::with_capacity(n_in);
        for _ in 0..n_in {
            let txid = TxId::from_bytes(reader.array()?);
            let index = u32::from_le_bytes(reader.array()?);
            let script_sig = reader.var_bytes()?;
            let sequence = u32::from_le_bytes(reader.array()?);
            inputs.push(TxIn {
                previous_output: OutPoint::new(txid, index),
                script_sig,
                sequence,
            });
        }

        let n_out = reader.len_prefix()?;
        let mut outputs = Vec::with_capacity(n_out);
        for _ in 0..n_out {
            let value = i64::from_le_bytes(reader.array()?);
            let script_pubkey = reader.var_bytes()?;
            outputs.push(TxOut {
                value,
                script_pubkey,
            });
        }

        let lock_time = u32::from_le_bytes(reader.array()?);

        if !reader.is_empty() {
            return Err(CoreError::Decoding(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}

/// Encode a compact-size integer.
fn encode_varint(buf: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(0xfd);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(0xfe);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(0xff);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

fn encode_var_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Cursor over a byte slice for decoding.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CoreError::Decoding(format!(
                "unexpected end of input: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(slice);
        Ok(arr)
    }

    fn varint(&mut self) -> Result<u64> {
        let [tag] = self.array::<1>()?;
        let (n, min) = match tag {
            0xfd => (u16::from_le_bytes(self.array()?) as u64, 0xfd),
            0xfe => (u32::from_le_bytes(self.array()?) as u64, 0x1_0000),
            0xff => (u64::from_le_bytes(self.array()?), 0x1_0000_0000),
            n => return Ok(n as u64),
        };
        // Non-minimal encodings would give the same transaction a second id.
        if n < min {
            return Err(CoreError::Decoding(format!("non-canonical varint {n}")));
        }
        Ok(n)
    }

    fn len_prefix(&mut self) -> Result<usize> {
        let n = self.varint()?;
        if n > MAX_VEC_LEN {
            return Err(CoreError::Decoding(format!("length {n} exceeds limit")));
        }
        Ok(n as usize)
    }

    fn var_bytes(&mut self) -> Result<Bytes> {
        let len = self.varint()?;
        let len = usize::try_from(len)
            .map_err(|_| CoreError::Decoding(format!("script length {len} too large")))?;
        Ok(Bytes::copy_from_slice(self.take(len)?))
    }
}
