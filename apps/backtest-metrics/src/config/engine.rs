//! Metrics engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metrics engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial account balance the running balance starts from.
    #[serde(default = "default_deposit")]
    pub deposit: Decimal,
    /// Compute metrics on pips (`true`) or on account currency (`false`).
    #[serde(default = "default_true")]
    pub pips_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deposit: default_deposit(),
            pips_mode: true,
        }
    }
}

fn default_deposit() -> Decimal {
    Decimal::new(1_000_000, 2)
}

pub(crate) const fn default_true() -> bool {
    true
}
