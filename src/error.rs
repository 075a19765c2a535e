//! Error types for disposal operations.

use std::fmt;

use crate::Hook;

/// Disposal errors
///
/// Hooks are expected not to fail, but a hook that panics is caught and
/// surfaced here instead of tearing down the caller. Configuration parsing
/// reports its problems through the same type.
///
/// # Examples
///
/// ```rust
/// use disposable_base::{DisposeError, Hook};
///
/// let error = DisposeError::HookPanicked {
///     resource: "FileHandle",
///     hook: Hook::Explicit,
///     message: "flush failed".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Hook dispose_explicit panicked in FileHandle: flush failed"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisposeError {
    /// A cleanup hook panicked
    HookPanicked {
        /// Label of the resource whose hook panicked
        resource: &'static str,
        /// Which hook panicked
        hook: Hook,
        /// Panic message if it was a string payload
        message: String,
    },
    /// Several resources failed while a tracker was cleaning up
    Aggregate(Vec<DisposeError>),
    /// A configuration value could not be parsed
    InvalidConfig {
        /// The configuration key (environment variable name)
        key: String,
        /// The rejected value
        value: String,
    },
    /// Configuration (de)serialization failed
    Serialization(String),
}

impl DisposeError {
    /// Returns the number of underlying failures.
    ///
    /// An `Aggregate` counts its children recursively; every other variant counts as one.
    pub fn failure_count(&self) -> usize {
        match self {
            DisposeError::Aggregate(errors) => errors.iter().map(|e| e.failure_count()).sum(),
            _ => 1,
        }
    }

    /// Builds a result from collected failures: `Ok(value)` when there are none,
    /// the error itself when there is exactly one, otherwise an `Aggregate`.
    pub(crate) fn collect<T>(value: T, mut errors: Vec<DisposeError>) -> DisposeResult<T> {
        match errors.len() {
            0 => Ok(value),
            1 => Err(errors.remove(0)),
            _ => Err(DisposeError::Aggregate(errors)),
        }
    }
}

impl fmt::Display for DisposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposeError::HookPanicked { resource, hook, message } => {
                write!(f, "Hook {} panicked in {}: {}", hook, resource, message)
            }
            DisposeError::Aggregate(errors) => {
                write!(f, "{} disposal failures", errors.len())?;
                for error in errors {
                    write!(f, "; {}", error)?;
                }
                Ok(())
            }
            DisposeError::InvalidConfig { key, value } => {
                write!(f, "Invalid configuration value for {}: {:?}", key, value)
            }
            DisposeError::Serialization(msg) => {
                write!(f, "Configuration serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DisposeError {}

/// Result type for disposal operations
///
/// A convenience alias for `Result<T, DisposeError>`.
pub type DisposeResult<T> = Result<T, DisposeError>;
