//! Configuration loading and representation.

use anyhow::Context;
use thiserror::Error;

use splitledger_core::{DomainError, Money};
use splitledger_settlement::SettlementPolicy;

pub const SETTLED_THRESHOLD_VAR: &str = "SPLITLEDGER_SETTLED_THRESHOLD";
pub const RESIDUE_TOLERANCE_VAR: &str = "SPLITLEDGER_RESIDUE_TOLERANCE";
pub const LOG_VAR: &str = "SPLITLEDGER_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid amount {value:?}")]
    InvalidAmount {
        var: &'static str,
        value: String,
        #[source]
        source: DomainError,
    },

    #[error("{var}: amount must not be negative, got {value}")]
    NegativeAmount { var: &'static str, value: Money },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub policy: SettlementPolicy,
    /// Default log directive when `RUST_LOG` is unset.
    pub log_directive: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: SettlementPolicy::default(),
            log_directive: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Reads the configuration from process environment variables; unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`], with context for process startup.
    pub fn from_env_context() -> anyhow::Result<Self> {
        Self::from_env().context("failed to load splitledger configuration from environment")
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(threshold) = amount_var(&lookup, SETTLED_THRESHOLD_VAR)? {
            config.policy = config.policy.with_settled_threshold(threshold);
        }
        if let Some(tolerance) = amount_var(&lookup, RESIDUE_TOLERANCE_VAR)? {
            config.policy = config.policy.with_residue_tolerance(tolerance);
        }
        if let Some(directive) = lookup(LOG_VAR).filter(|s| !s.trim().is_empty()) {
            config.log_directive = directive.trim().to_string();
        }

        Ok(config)
    }

    /// Installs the JSON log subscriber with this config's directive as the
    /// fallback for `RUST_LOG`.
    pub fn init_logging(&self) {
        splitledger_observability::init_with_directive(&self.log_directive);
    }
}

fn amount_var<F>(lookup: &F, var: &'static str) -> Result<Option<Money>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let amount: Money = value
        .parse()
        .map_err(|source| ConfigError::InvalidAmount {
            var,
            value: value.clone(),
            source,
        })?;
    if amount.is_negative() {
        return Err(ConfigError::NegativeAmount { var, value: amount });
    }
    Ok(Some(amount))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.policy.settled_threshold, Money::from_cents(1));
    }

    #[test]
    fn variables_override_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            (SETTLED_THRESHOLD_VAR, "0.05"),
            (RESIDUE_TOLERANCE_VAR, "0"),
            (LOG_VAR, " debug "),
        ]))
        .unwrap();

        assert_eq!(config.policy.settled_threshold, Money::from_cents(5));
        assert_eq!(config.policy.residue_tolerance, Money::ZERO);
        assert_eq!(config.log_directive, "debug");
    }

    #[test]
    fn sub_cent_and_negative_amounts_are_rejected() {
        let err =
            EngineConfig::from_lookup(lookup(&[(SETTLED_THRESHOLD_VAR, "0.005")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAmount { var: SETTLED_THRESHOLD_VAR, .. }));

        let err = EngineConfig::from_lookup(lookup(&[(RESIDUE_TOLERANCE_VAR, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeAmount { var: RESIDUE_TOLERANCE_VAR, .. }));
    }

    /// The only test that touches the process environment; every other test
    /// goes through `from_lookup`.
    #[test]
    fn process_env_errors_carry_startup_context() {
        // SAFETY: no other test in this binary reads or writes this variable.
        unsafe { std::env::set_var(SETTLED_THRESHOLD_VAR, "ten cents") };

        let direct = EngineConfig::from_env().unwrap_err();
        let with_context = EngineConfig::from_env_context().unwrap_err();

        // SAFETY: as above.
        unsafe { std::env::remove_var(SETTLED_THRESHOLD_VAR) };

        assert!(matches!(direct, ConfigError::InvalidAmount { var: SETTLED_THRESHOLD_VAR, .. }));
        assert_eq!(
            with_context.to_string(),
            "failed to load splitledger configuration from environment"
        );
        assert!(matches!(
            with_context.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidAmount { var: SETTLED_THRESHOLD_VAR, .. })
        ));
        assert!(format!("{with_context:#}").contains(SETTLED_THRESHOLD_VAR));
    }
}
