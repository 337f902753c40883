//! Golden test vectors for deterministic verification.
//!
//! Every observer of a color must agree on these values: the sequence
//! numbers that mark padded transactions, the paddings themselves, which
//! inputs fund which outputs, and the identity of a color definition.

/// A padded-kernel sequence number.
#[derive(Debug, Clone)]
pub struct SequenceVector {
    pub name: &'static str,
    /// Integer value of the six marker bits.
    pub marker: u32,
    pub exponent: u32,
    pub sequence: u32,
}

/// Padding for a color value under a dust minimum.
#[derive(Debug, Clone)]
pub struct PaddingVector {
    pub color_value: u64,
    pub minimum_satoshi: i64,
    pub padding: i64,
    /// Amount the colored output holds: `color_value + padding`.
    pub amount: i64,
}

/// Which inputs fund the wanted outputs of a padded transfer.
#[derive(Debug, Clone)]
pub struct AffectingVector {
    pub name: &'static str,
    /// Decoded input color values.
    pub inputs: &'static [u64],
    /// Output amounts, padding included.
    pub outputs: &'static [i64],
    pub padding: i64,
    pub wanted: &'static [usize],
    pub expected: &'static [usize],
}

/// A color definition and its derived identity.
#[derive(Debug, Clone)]
pub struct DefinitionVector {
    pub definition: &'static str,
    pub code: &'static str,
    pub index: u32,
    pub height: i64,
    pub hash_string: &'static str,
}

pub const GENESIS_MARKER: u32 = 37;
pub const TRANSFER_MARKER: u32 = 51;

/// Get all sequence vectors.
pub fn sequence_vectors() -> Vec<SequenceVector> {
    vec![
        SequenceVector {
            name: "genesis, padding 8192",
            marker: GENESIS_MARKER,
            exponent: 13,
            sequence: 869,
        },
        SequenceVector {
            name: "transfer, padding 8192",
            marker: TRANSFER_MARKER,
            exponent: 13,
            sequence: 883,
        },
        SequenceVector {
            name: "genesis, padding 1",
            marker: GENESIS_MARKER,
            exponent: 0,
            sequence: 37,
        },
        SequenceVector {
            name: "transfer, padding 32",
            marker: TRANSFER_MARKER,
            exponent: 5,
            sequence: 371,
        },
        SequenceVector {
            name: "transfer, largest exponent",
            marker: TRANSFER_MARKER,
            exponent: 62,
            sequence: 4019,
        },
    ]
}

/// Get all padding vectors.
pub fn padding_vectors() -> Vec<PaddingVector> {
    let v = |color_value: u64, padding: i64| PaddingVector {
        color_value,
        minimum_satoshi: 5430,
        padding,
        amount: color_value as i64 + padding,
    };
    vec![
        v(1, 8192),
        v(100, 8192),
        v(1500, 4096),
        v(5000, 512),
        v(5429, 1),
        v(5430, 1),
        v(10000, 1),
    ]
}

/// Get all affecting-input vectors.
pub fn affecting_vectors() -> Vec<AffectingVector> {
    vec![
        AffectingVector {
            name: "direct",
            inputs: &[1],
            outputs: &[9],
            padding: 8,
            wanted: &[0],
            expected: &[0],
        },
        AffectingVector {
            name: "nothing wanted",
            inputs: &[1, 2, 3],
            outputs: &[1029, 1039],
            padding: 1024,
            wanted: &[],
            expected: &[],
        },
        AffectingVector {
            name: "join",
            inputs: &[2, 3],
            outputs: &[21],
            padding: 16,
            wanted: &[0],
            expected: &[0, 1],
        },
        AffectingVector {
            name: "split",
            inputs: &[5],
            outputs: &[34, 35],
            padding: 32,
            wanted: &[0],
            expected: &[0],
        },
        AffectingVector {
            name: "split 2",
            inputs: &[5],
            outputs: &[66, 67],
            padding: 64,
            wanted: &[1],
            expected: &[0],
        },
        AffectingVector {
            name: "zeros",
            inputs: &[0, 0, 0],
            outputs: &[128, 128, 128],
            padding: 128,
            wanted: &[0, 1, 2],
            expected: &[],
        },
        AffectingVector {
            name: "null before and after",
            inputs: &[0, 2, 3, 0],
            outputs: &[256, 261, 299],
            padding: 256,
            wanted: &[1],
            expected: &[1, 2],
        },
        AffectingVector {
            name: "odd 1",
            inputs: &[1, 2, 3],
            outputs: &[517, 527],
            padding: 512,
            wanted: &[0],
            expected: &[0, 1, 2],
        },
        AffectingVector {
            name: "odd 2",
            inputs: &[1, 2, 3],
            outputs: &[1029, 1039],
            padding: 1024,
            wanted: &[1],
            expected: &[],
        },
        AffectingVector {
            name: "exhausted input at boundary",
            inputs: &[2, 3],
            outputs: &[18, 19],
            padding: 16,
            wanted: &[1],
            expected: &[1],
        },
        AffectingVector {
            name: "zero input between funders",
            inputs: &[1, 0, 4],
            outputs: &[69],
            padding: 64,
            wanted: &[0],
            expected: &[0, 2],
        },
    ]
}

/// Get all definition vectors.
pub fn definition_vectors() -> Vec<DefinitionVector> {
    vec![
        DefinitionVector {
            definition: "SPOBC:b1586cd10b32f78795b86e9a3febe58dcb59189175fad884a7f4a6623b77486e:0:300000",
            code: "SPOBC",
            index: 0,
            height: 300000,
            hash_string: "SPOBC:b1586cd10b32f78795b86e9a3febe58dcb59189175fad884a7f4a6623b77486e:0",
        },
        DefinitionVector {
            definition: "EPOBC:0000000000000000000000000000000000000000000000000000000000000001:7:0",
            code: "EPOBC",
            index: 7,
            height: 0,
            hash_string: "EPOBC:0000000000000000000000000000000000000000000000000000000000000001:7",
        },
        DefinitionVector {
            definition: "IFOC:ffeeddccbbaa99887766554433221100ffeeddccbbaa99887766554433221100:1:42",
            code: "IFOC",
            index: 1,
            height: 42,
            hash_string: "IFOC:ffeeddccbbaa99887766554433221100ffeeddccbbaa99887766554433221100:1",
        },
    ]
}
