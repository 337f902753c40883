//! Kernel registry: kernels by code.

use std::collections::BTreeMap;

use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::kernel::{ColorKernel, Kernel};

/// Kernels available for color definitions, keyed by code.
///
/// Built once and read afterwards. A code can only be registered once.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    kernels: BTreeMap<&'static str, Kernel>,
}

impl KernelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every kernel, built from `config`.
    pub fn with_config(config: &KernelConfig) -> Self {
        let kernels = Kernel::all(config)
            .into_iter()
            .map(|k| (k.code(), k))
            .collect();
        Self { kernels }
    }

    pub fn register(&mut self, kernel: Kernel) -> Result<()> {
        let code = kernel.code();
        if self.kernels.contains_key(code) {
            return Err(KernelError::DuplicateKernelRegistration(code.to_string()));
        }
        self.kernels.insert(code, kernel);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Result<&Kernel> {
        self.kernels
            .get(code)
            .ok_or_else(|| KernelError::UnknownKernelCode(code.to_string()))
    }

    /// Registered codes, sorted.
    pub fn codes(&self) -> Vec<&'static str> {
        self.kernels.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IfocConfig;
    use crate::kernel::Ifoc;

    #[test]
    fn test_with_config_registers_all() {
        let registry = KernelRegistry::with_config(&KernelConfig::default());
        assert_eq!(registry.codes(), vec!["EPOBC", "IFOC", "SPOBC"]);
        assert_eq!(registry.get("SPOBC").unwrap().code(), "SPOBC");
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = KernelRegistry::new();
        assert!(registry.is_empty());
        registry.register(Kernel::Ifoc(Ifoc::default())).unwrap();

        let other = Kernel::Ifoc(Ifoc::new(&IfocConfig {
            transfer_amount: 1,
        }));
        assert!(matches!(
            registry.register(other),
            Err(KernelError::DuplicateKernelRegistration(code)) if code == "IFOC"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_code() {
        let registry = KernelRegistry::new();
        assert!(matches!(
            registry.get("IFOC"),
            Err(KernelError::UnknownKernelCode(_))
        ));
    }
}
