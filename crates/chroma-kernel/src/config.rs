//! Kernel configuration.
//!
//! Every field has a default, so a partial JSON or TOML document only needs
//! to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Configuration for the kernels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Flat kernel settings.
    pub ifoc: IfocConfig,
    /// Marker kernel settings.
    pub spobc: SpobcConfig,
    /// Padded kernel settings.
    pub epobc: EpobcConfig,
}

/// Settings for the flat kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IfocConfig {
    /// Amount every colored output carries.
    pub transfer_amount: i64,
}

impl Default for IfocConfig {
    fn default() -> Self {
        Self {
            transfer_amount: 10_000,
        }
    }
}

/// Settings for the marker kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpobcConfig {
    /// Amount every output carries. Keeps outputs above the dust limit.
    pub minimum_satoshi: i64,
}

impl Default for SpobcConfig {
    fn default() -> Self {
        Self {
            minimum_satoshi: 5_430,
        }
    }
}

/// Settings for the padded kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpobcConfig {
    /// Smallest amount a colored output may hold, padding included.
    pub minimum_satoshi: i64,
}

impl Default for EpobcConfig {
    fn default() -> Self {
        Self {
            minimum_satoshi: 5_430,
        }
    }
}
