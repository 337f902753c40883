//! Color definitions: a kernel bound to a genesis output.
//!
//! The canonical string form is `<code>:<txid>:<index>:<height>`, for
//! example `SPOBC:b1586cd1...f74:0:300000`. The height records where the
//! genesis was confirmed and is not part of the color's identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use chroma_core::{ColorIn, ColorValue, OutPoint, Transaction, TxId};
use chroma_ledger::Ledger;
use sha2::{Digest, Sha256};

use crate::error::{KernelError, Result};
use crate::kernel::{ColorKernel, Kernel};
use crate::registry::KernelRegistry;

/// A color: which kernel governs it and where it was issued.
#[derive(Debug, Clone)]
pub struct ColorDefinition {
    kernel: Kernel,
    genesis: OutPoint,
    height: i64,
}

impl ColorDefinition {
    pub fn new(kernel: Kernel, genesis: OutPoint, height: i64) -> Result<Self> {
        if height < 0 {
            return Err(KernelError::InvalidReference(format!(
                "negative height {}",
                height
            )));
        }
        Ok(Self {
            kernel,
            genesis,
            height,
        })
    }

    /// Parse the canonical string form, resolving the code in `registry`.
    pub fn parse(s: &str, registry: &KernelRegistry) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        let [code, txid, index, height] = fields.as_slice() else {
            return Err(KernelError::MalformedColorDefinition(format!(
                "expected 4 fields, got {}",
                fields.len()
            )));
        };

        let kernel = registry.get(code)?.clone();
        let txid = TxId::from_hex(txid)
            .map_err(|e| KernelError::InvalidReference(format!("txid {:?}: {}", txid, e)))?;
        let index: u32 = index
            .parse()
            .map_err(|e| KernelError::InvalidReference(format!("index {:?}: {}", index, e)))?;
        let height: i64 = height
            .parse()
            .map_err(|e| KernelError::InvalidReference(format!("height {:?}: {}", height, e)))?;

        Self::new(kernel, OutPoint::new(txid, index), height)
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn code(&self) -> &'static str {
        self.kernel.code()
    }

    pub fn genesis(&self) -> &OutPoint {
        &self.genesis
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    /// The identity string: code and genesis, without the height.
    pub fn hash_string(&self) -> String {
        format!("{}:{}:{}", self.code(), self.genesis.txid, self.genesis.index)
    }

    /// SHA-256 of [`hash_string`](Self::hash_string).
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.hash_string().as_bytes()).into()
    }

    /// A stable number below 2^31 derived from the hash, usable as a
    /// wallet account index.
    pub fn account_number(&self) -> u32 {
        let hash = self.hash();
        u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]) % (1 << 31)
    }

    /// Forward-simulate this color through `tx`.
    pub fn run_kernel(
        &self,
        tx: &Transaction,
        input_values: &[ColorValue],
    ) -> Result<Vec<ColorValue>> {
        self.kernel
            .calculate_out_color_values(&self.genesis, tx, input_values)
    }

    /// Inputs of `tx` that fund the given outputs with this color.
    pub fn affecting_inputs(
        &self,
        ledger: &dyn Ledger,
        tx: &Transaction,
        output_indexes: &[u32],
    ) -> Result<Vec<OutPoint>> {
        self.kernel
            .find_affecting_inputs(ledger, &self.genesis, tx, output_indexes)
    }

    /// Trace the color value held by `out_point`.
    pub fn color_value(&self, ledger: &dyn Ledger, out_point: &OutPoint) -> Result<ColorValue> {
        Ok(self.color_in(ledger, out_point)?.color_value)
    }

    pub fn color_in(&self, ledger: &dyn Ledger, out_point: &OutPoint) -> Result<ColorIn> {
        self.kernel
            .out_point_to_color_in(ledger, &self.genesis, out_point)
    }
}

impl PartialEq for ColorDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code() && self.genesis == other.genesis
    }
}

impl Eq for ColorDefinition {}

impl Hash for ColorDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code().hash(state);
        self.genesis.hash(state);
    }
}

impl fmt::Display for ColorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.code(),
            self.genesis.txid,
            self.genesis.index,
            self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use std::collections::HashSet;

    const TXID: &str = "b1586cd10b32f78795b86e9a3febe58dcb59189175fad884a7f4a6623b77486e";

    fn registry() -> KernelRegistry {
        KernelRegistry::with_config(&KernelConfig::default())
    }

    #[test]
    fn test_parse_and_display() {
        let s = format!("SPOBC:{}:0:300000", TXID);
        let cd = ColorDefinition::parse(&s, &registry()).unwrap();
        assert_eq!(cd.code(), "SPOBC");
        assert_eq!(cd.genesis().index, 0);
        assert_eq!(cd.height(), 300000);
        assert_eq!(cd.to_string(), s);
    }

    #[test]
    fn test_parse_errors() {
        let r = registry();
        assert!(matches!(
            ColorDefinition::parse("SPOBC:abc:0", &r),
            Err(KernelError::MalformedColorDefinition(_))
        ));
        assert!(matches!(
            ColorDefinition::parse(&format!("SPOBC:{}:0:1:2", TXID), &r),
            Err(KernelError::MalformedColorDefinition(_))
        ));
        assert!(matches!(
            ColorDefinition::parse(&format!("NOPE:{}:0:1", TXID), &r),
            Err(KernelError::UnknownKernelCode(_))
        ));
        assert!(matches!(
            ColorDefinition::parse("IFOC:xyz:0:1", &r),
            Err(KernelError::InvalidReference(_))
        ));
        assert!(matches!(
            ColorDefinition::parse(&format!("IFOC:{}:-1:1", TXID), &r),
            Err(KernelError::InvalidReference(_))
        ));
        assert!(matches!(
            ColorDefinition::parse(&format!("IFOC:{}:0:x", TXID), &r),
            Err(KernelError::InvalidReference(_))
        ));
        assert!(matches!(
            ColorDefinition::parse(&format!("IFOC:{}:0:-5", TXID), &r),
            Err(KernelError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_new_rejects_negative_height() {
        let kernel = registry().get("EPOBC").unwrap().clone();
        let genesis = OutPoint::new(TxId::ZERO, 0);
        assert!(ColorDefinition::new(kernel, genesis, -1).is_err());
    }

    #[test]
    fn test_identity_ignores_height() {
        let r = registry();
        let a = ColorDefinition::parse(&format!("EPOBC:{}:1:10", TXID), &r).unwrap();
        let b = ColorDefinition::parse(&format!("EPOBC:{}:1:99", TXID), &r).unwrap();
        let c = ColorDefinition::parse(&format!("SPOBC:{}:1:10", TXID), &r).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_hash_and_account_number() {
        let cd = ColorDefinition::parse(&format!("IFOC:{}:0:1", TXID), &registry()).unwrap();
        assert_eq!(cd.hash_string(), format!("IFOC:{}:0", TXID));

        let expected: [u8; 32] = Sha256::digest(cd.hash_string().as_bytes()).into();
        assert_eq!(cd.hash(), expected);

        let n = u32::from_le_bytes([expected[0], expected[1], expected[2], expected[3]]);
        assert_eq!(cd.account_number(), n % (1 << 31));
        assert!(cd.account_number() < 1 << 31);
    }
}
