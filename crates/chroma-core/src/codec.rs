//! CBOR records for out points and color inputs.
//!
//! Wallet-side bookkeeping persists these records keyed by the color
//! definition hash. Records are CBOR maps with small integer keys written in
//! ascending order, so equal records always produce equal bytes.

use ciborium::value::Value;
use std::io::Cursor;

use crate::color::ColorIn;
use crate::error::{CoreError, Result};
use crate::types::{OutPoint, TxId};

mod keys {
    pub const TXID: u64 = 0;
    pub const INDEX: u64 = 1;
    pub const COLOR_VALUE: u64 = 2;
}

/// Little-endian bytes of a `u32`.
pub fn serialize_u32(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

/// Read a little-endian `u32` from the first four bytes.
pub fn deserialize_u32(bytes: &[u8]) -> Result<u32> {
    let arr: [u8; 4] = bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| CoreError::Decoding(format!("need 4 bytes, have {}", bytes.len())))?;
    Ok(u32::from_le_bytes(arr))
}

/// Encode an out point record.
pub fn encode_out_point(out_point: &OutPoint) -> Result<Vec<u8>> {
    encode_map(out_point_entries(out_point))
}

/// Decode an out point record.
pub fn decode_out_point(bytes: &[u8]) -> Result<OutPoint> {
    let map = decode_map(bytes)?;
    parse_out_point(&map)
}

/// Encode a color input record.
pub fn encode_color_in(color_in: &ColorIn) -> Result<Vec<u8>> {
    let mut entries = out_point_entries(&color_in.out_point);
    entries.push((
        Value::Integer(keys::COLOR_VALUE.into()),
        Value::Integer(color_in.color_value.into()),
    ));
    encode_map(entries)
}

/// Decode a color input record.
pub fn decode_color_in(bytes: &[u8]) -> Result<ColorIn> {
    let map = decode_map(bytes)?;
    let out_point = parse_out_point(&map)?;
    let color_value = get_uint(&map, keys::COLOR_VALUE)?;
    Ok(ColorIn::new(out_point, color_value))
}

fn out_point_entries(out_point: &OutPoint) -> Vec<(Value, Value)> {
    vec![
        (
            Value::Integer(keys::TXID.into()),
            Value::Bytes(out_point.txid.as_bytes().to_vec()),
        ),
        (
            Value::Integer(keys::INDEX.into()),
            Value::Integer(out_point.index.into()),
        ),
    ]
}

fn parse_out_point(map: &[(Value, Value)]) -> Result<OutPoint> {
    let txid = match get(map, keys::TXID) {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            TxId::from_bytes(arr)
        }
        _ => return Err(CoreError::Decoding("invalid txid".into())),
    };
    let index = u32::try_from(get_uint(map, keys::INDEX)?)
        .map_err(|_| CoreError::Decoding("index out of range".into()))?;
    Ok(OutPoint::new(txid, index))
}

fn encode_map(entries: Vec<(Value, Value)>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(&Value::Map(entries), &mut buf)
        .map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(buf)
}

fn decode_map(bytes: &[u8]) -> Result<Vec<(Value, Value)>> {
    let mut cursor = Cursor::new(bytes);
    let value: Value =
        ciborium::from_reader(&mut cursor).map_err(|e| CoreError::Decoding(e.to_string()))?;
    if cursor.position() as usize != bytes.len() {
        return Err(CoreError::Decoding("trailing bytes after record".into()));
    }
    match value {
        Value::Map(m) => Ok(m),
        _ => Err(CoreError::Decoding("expected map".into())),
    }
}

fn get(map: &[(Value, Value)], key: u64) -> Option<&Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
        .map(|(_, v)| v)
}

fn get_uint(map: &[(Value, Value)], key: u64) -> Result<u64> {
    match get(map, key) {
        Some(Value::Integer(i)) => u64::try_from(i128::from(*i))
            .map_err(|_| CoreError::Decoding(format!("key {key} is negative"))),
        _ => Err(CoreError::Decoding(format!("missing integer at key {key}"))),
    }
}
