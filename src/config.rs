//! Configuration for disposal behavior.
//!
//! A [`DisposeConfig`] can be built in code, read from environment variables,
//! or (with the `config` feature) loaded from JSON.

use std::env;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::{DisposeError, DisposeResult};

/// What `dispose()` does when a hook panics on the explicit path.
///
/// Panics on the implicit path are always contained, since a panic inside
/// `Drop` while already unwinding aborts the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum PanicPolicy {
    /// Return `Err(DisposeError::HookPanicked)` from `dispose()`.
    #[default]
    Report,
    /// Re-raise the first panic once both hooks have been attempted.
    Propagate,
}

impl FromStr for PanicPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "report" => Ok(PanicPolicy::Report),
            "propagate" => Ok(PanicPolicy::Propagate),
            _ => Err(()),
        }
    }
}

/// Disposal configuration
///
/// # Examples
///
/// ```rust
/// use disposable_base::{DisposeConfig, PanicPolicy};
///
/// let config = DisposeConfig::default()
///     .with_explicit_panics(PanicPolicy::Propagate)
///     .with_warn_on_implicit(true);
///
/// assert_eq!(config.explicit_panics, PanicPolicy::Propagate);
/// assert!(config.warn_on_implicit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DisposeConfig {
    /// Panic handling for hooks run by `dispose()`
    pub explicit_panics: PanicPolicy,
    /// Write a warning to stderr whenever a resource is finalized without `dispose()`
    pub warn_on_implicit: bool,
}

impl DisposeConfig {
    /// Prefix used by [`DisposeConfig::from_env`].
    pub const ENV_PREFIX: &'static str = "DISPOSABLE";

    /// Sets the explicit-path panic policy.
    pub fn with_explicit_panics(mut self, policy: PanicPolicy) -> Self {
        self.explicit_panics = policy;
        self
    }

    /// Enables or disables the implicit finalization warning.
    pub fn with_warn_on_implicit(mut self, warn: bool) -> Self {
        self.warn_on_implicit = warn;
        self
    }

    /// Reads `DISPOSABLE_EXPLICIT_PANICS` and `DISPOSABLE_WARN_ON_IMPLICIT`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> DisposeResult<Self> {
        Self::from_env_with_prefix(Self::ENV_PREFIX)
    }

    /// Same as [`DisposeConfig::from_env`] with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> DisposeResult<Self> {
        let mut config = Self::default();

        if let Some((key, value)) = read_var(prefix, "explicit_panics") {
            config.explicit_panics = value
                .parse()
                .map_err(|_| DisposeError::InvalidConfig { key, value })?;
        }

        if let Some((key, value)) = read_var(prefix, "warn_on_implicit") {
            config.warn_on_implicit =
                parse_bool(&value).ok_or(DisposeError::InvalidConfig { key, value })?;
        }

        Ok(config)
    }

    /// Parses a configuration from JSON. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DisposeResult<Self> {
        serde_json::from_str(json).map_err(|e| DisposeError::Serialization(e.to_string()))
    }

    /// Serializes the configuration to JSON.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> DisposeResult<String> {
        serde_json::to_string(self).map_err(|e| DisposeError::Serialization(e.to_string()))
    }
}

fn read_var(prefix: &str, key: &str) -> Option<(String, String)> {
    let env_key = format!("{}_{}", prefix.to_uppercase(), key.to_uppercase());
    env::var(&env_key).ok().map(|value| (env_key, value))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
