//! Caller-side settlement policy.

use splitledger_core::Money;

/// Thresholds applied around the engine's exact outputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SettlementPolicy {
    /// Balances whose magnitude is below this are treated as settled by
    /// report helpers. The aggregator itself never suppresses anything.
    pub settled_threshold: Money,
    /// Residue the simplifier may leave unmatched before it logs a warning.
    pub residue_tolerance: Money,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            settled_threshold: Money::from_cents(1),
            residue_tolerance: Money::from_cents(1),
        }
    }
}

impl SettlementPolicy {
    pub fn with_settled_threshold(mut self, threshold: Money) -> Self {
        self.settled_threshold = threshold;
        self
    }

    pub fn with_residue_tolerance(mut self, tolerance: Money) -> Self {
        self.residue_tolerance = tolerance;
        self
    }

    /// Whether `balance` counts as settled under this policy.
    pub fn is_settled(&self, balance: Money) -> bool {
        balance.is_zero() || balance.abs() < self.settled_threshold
    }
}
