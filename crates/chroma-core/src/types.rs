//! Strong type definitions for ledger references.
//!
//! Hashes are stored in internal (wire) byte order and rendered in reversed
//! order, which is how the ledger displays transaction and block ids.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Double SHA-256, the ledger's id hash.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

fn reversed_hex(bytes: &[u8; 32]) -> String {
    let mut rev = *bytes;
    rev.reverse();
    hex::encode(rev)
}

fn parse_reversed_hex(s: &str) -> Result<[u8; 32], hex::FromHexError> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    arr.reverse();
    Ok(arr)
}

/// A 32-byte transaction id, SHA-256d of the serialized transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    /// Create from raw bytes in internal order.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes in internal order.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash serialized transaction bytes into an id.
    pub fn hash(data: &[u8]) -> Self {
        Self(sha256d(data))
    }

    /// Convert to display hex (reversed byte order).
    pub fn to_hex(&self) -> String {
        reversed_hex(&self.0)
    }

    /// Parse from display hex (reversed byte order).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_reversed_hex(s).map(Self)
    }

    /// The all-zero id.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TxId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_hex(s)?)
    }
}

impl AsRef<[u8]> for TxId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for TxId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 32-byte block hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        reversed_hex(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        parse_reversed_hex(s).map(Self)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A reference to one output of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    /// The transaction holding the output.
    pub txid: TxId,
    /// Position in the transaction's output list.
    pub index: u32,
}

impl OutPoint {
    pub const fn new(txid: TxId, index: u32) -> Self {
        Self { txid, index }
    }

    /// The null out point referenced by inputs that spend nothing.
    pub const NULL: Self = Self {
        txid: TxId::ZERO,
        index: u32::MAX,
    };

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({}:{})", &self.txid.to_hex()[..16], self.index)
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

impl FromStr for OutPoint {
    type Err = CoreError;

    /// Parse `txid:index`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, index) = s
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidOutPoint(format!("missing ':' in {s:?}")))?;
        let txid = txid.parse()?;
        let index = index
            .parse()
            .map_err(|e| CoreError::InvalidOutPoint(format!("bad index {index:?}: {e}")))?;
        Ok(Self { txid, index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txid_hex_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        let id = TxId::from_bytes(bytes);
        let hex = id.to_hex();

        assert!(hex.ends_with("01"));
        assert!(hex.starts_with("00"));
        assert_eq!(TxId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn test_txid_from_hex_rejects_bad_length() {
        assert!(TxId::from_hex("abcd").is_err());
        assert!(TxId::from_hex("zz").is_err());
    }

    #[test]
    fn test_sha256d_known_value() {
        // SHA-256d of the empty string.
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_outpoint_display_parse() {
        let op = OutPoint::new(TxId::from_bytes([0xab; 32]), 7);
        let s = op.to_string();
        assert!(s.ends_with(":7"));
        assert_eq!(s.parse::<OutPoint>().unwrap(), op);
    }

    #[test]
    fn test_outpoint_parse_errors() {
        assert!("nocolon".parse::<OutPoint>().is_err());
        let bad_index = format!("{}:x", TxId::ZERO);
        assert!(bad_index.parse::<OutPoint>().is_err());
    }

    #[test]
    fn test_txid_debug() {
        let id = TxId::from_bytes([0xcd; 32]);
        assert_eq!(format!("{:?}", id), "TxId(cdcdcdcdcdcdcdcd)");
    }
}
