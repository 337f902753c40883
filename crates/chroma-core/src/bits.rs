//! Fixed-width bit lists.
//!
//! Bits are stored least-significant first. The padded kernel packs its
//! operation marker and padding exponent into an input's sequence number by
//! combining narrow lists into a 32-bit one.

use std::ops::Range;

/// An ordered list of bits, least-significant bit at index 0.
///
/// Equality is length-sensitive: a one-bit `[true]` is not equal to the
/// two-bit `[true, false]` even though both decode to 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitList(Vec<bool>);

impl BitList {
    /// Encode `value` into exactly `width` bits.
    ///
    /// Bits of `value` above `width` are dropped; positions past 32 are zero.
    pub fn encode(value: u32, width: usize) -> Self {
        let bits = (0..width)
            .map(|i| i < 32 && (value >> i) & 1 == 1)
            .collect();
        Self(bits)
    }

    /// Decode back into an integer. Bits past position 31 are ignored.
    pub fn decode(&self) -> u32 {
        self.0
            .iter()
            .take(32)
            .enumerate()
            .filter(|(_, bit)| **bit)
            .fold(0u32, |acc, (i, _)| acc | (1 << i))
    }

    /// Concatenate, with `self` in the low positions and `other` above it.
    pub fn combine(mut self, other: &BitList) -> Self {
        self.0.extend_from_slice(&other.0);
        self
    }

    /// Copy out a sub-range of bits.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self(self.0[range].to_vec())
    }

    /// Get the bit at position `i`, if any.
    pub fn get(&self, i: usize) -> Option<bool> {
        self.0.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for BitList {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_lsb_first() {
        let bits = BitList::encode(37, 6);
        assert_eq!(bits.as_slice(), &[true, false, true, false, false, true]);

        let bits = BitList::encode(51, 6);
        assert_eq!(bits.as_slice(), &[true, true, false, false, true, true]);
    }

    #[test]
    fn test_combine_places_second_above_first() {
        let low = BitList::encode(0b11, 2);
        let high = BitList::encode(0b1, 3);
        let combined = low.combine(&high);

        assert_eq!(combined.len(), 5);
        assert_eq!(combined.decode(), 0b00111);
    }

    #[test]
    fn test_equality_is_length_sensitive() {
        let one = BitList::from(vec![true]);
        let two = BitList::from(vec![true, false]);

        assert_eq!(one.decode(), two.decode());
        assert_ne!(one, two);
    }

    #[test]
    fn test_slice_and_get() {
        let bits = BitList::encode(37 | (13 << 6), 32);
        assert_eq!(bits.slice(0..6).decode(), 37);
        assert_eq!(bits.slice(6..12).decode(), 13);
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(32), None);
    }

    #[test]
    fn test_wide_list_ignores_high_bits() {
        let bits = BitList::encode(u32::MAX, 40);
        assert_eq!(bits.len(), 40);
        assert_eq!(bits.get(35), Some(false));
        assert_eq!(bits.decode(), u32::MAX);
    }

    proptest! {
        #[test]
        fn test_roundtrip(width in 1usize..=32, value in any::<u32>()) {
            let value = if width == 32 { value } else { value & ((1u32 << width) - 1) };
            let bits = BitList::encode(value, width);
            prop_assert_eq!(bits.len(), width);
            prop_assert_eq!(bits.decode(), value);
        }
    }
}
