//! Verifier configuration.
//!
//! Defaults come from the host; `from_env` lets a harness override them:
//!
//! | Variable                         | Values                     |
//! |----------------------------------|----------------------------|
//! | `CIRCUIT_VERIFY_POLICY`          | `abort`, `collect`         |
//! | `CIRCUIT_TARGET_ARCH64`          | `1`, `0`, `true`, `false`  |
//! | `CIRCUIT_VERIFY_MAX_DIAGNOSTICS` | a positive integer         |

use std::str::FromStr;

use crate::error::{ConfigError, Result};

pub const POLICY_VAR: &str = "CIRCUIT_VERIFY_POLICY";
pub const ARCH64_VAR: &str = "CIRCUIT_TARGET_ARCH64";
pub const MAX_DIAGNOSTICS_VAR: &str = "CIRCUIT_VERIFY_MAX_DIAGNOSTICS";

/// What the verifier does with a non-empty report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the report at ERROR and panic.
    #[default]
    Abort,
    /// Hand the report back to the caller.
    Collect,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "collect" => Ok(FailurePolicy::Collect),
            _ => Err(ConfigError::InvalidValue {
                key: POLICY_VAR,
                value: s.to_string(),
                expected: "abort or collect",
            }),
        }
    }
}

/// Verifier settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Resolve `ARCH` to `I64` (otherwise `I32`).
    pub is_arch64: bool,
    /// Abort or collect.
    pub policy: FailurePolicy,
    /// Stop recording after this many diagnostics.
    pub max_diagnostics: Option<usize>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            is_arch64: cfg!(target_pointer_width = "64"),
            policy: FailurePolicy::Abort,
            max_diagnostics: None,
        }
    }
}

impl VerifierConfig {
    /// Default settings with the collect policy.
    pub fn collecting() -> Self {
        VerifierConfig {
            policy: FailurePolicy::Collect,
            ..Self::default()
        }
    }

    pub fn with_arch64(mut self, is_arch64: bool) -> Self {
        self.is_arch64 = is_arch64;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = Some(max);
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(POLICY_VAR) {
            config.policy = value.parse()?;
        }

        if let Some(value) = lookup(ARCH64_VAR) {
            config.is_arch64 = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ARCH64_VAR,
                        value,
                        expected: "0, 1, true or false",
                    })
                }
            };
        }

        if let Some(value) = lookup(MAX_DIAGNOSTICS_VAR) {
            match value.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.max_diagnostics = Some(max),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: MAX_DIAGNOSTICS_VAR,
                        value,
                        expected: "a positive integer",
                    })
                }
            }
        }

        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = VerifierConfig::default();
        assert_eq!(config.policy, FailurePolicy::Abort);
        assert_eq!(config.max_diagnostics, None);
        assert_eq!(config.is_arch64, cfg!(target_pointer_width = "64"));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = VerifierConfig::from_lookup(lookup(&[
            (POLICY_VAR, "Collect"),
            (ARCH64_VAR, "0"),
            (MAX_DIAGNOSTICS_VAR, "3"),
        ]))
        .unwrap();
        assert_eq!(config.policy, FailurePolicy::Collect);
        assert!(!config.is_arch64);
        assert_eq!(config.max_diagnostics, Some(3));
    }

    #[test]
    fn test_empty_lookup_is_default() {
        let config = VerifierConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, VerifierConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = VerifierConfig::from_lookup(lookup(&[(POLICY_VAR, "retry")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: POLICY_VAR, .. }));

        let err = VerifierConfig::from_lookup(lookup(&[(ARCH64_VAR, "yes")])).unwrap_err();
        assert!(err.to_string().contains(ARCH64_VAR));

        assert!(VerifierConfig::from_lookup(lookup(&[(MAX_DIAGNOSTICS_VAR, "0")])).is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = VerifierConfig::collecting()
            .with_arch64(false)
            .with_max_diagnostics(1);
        assert_eq!(config.policy, FailurePolicy::Collect);
        assert!(!config.is_arch64);
        assert_eq!(
            config.with_policy(FailurePolicy::Abort).policy,
            FailurePolicy::Abort
        );
    }
}
