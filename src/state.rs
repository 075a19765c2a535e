//! Disposal state, paths, and hook identifiers.

use std::fmt;

/// Lifecycle state of a [`Disposable`](crate::Disposable).
///
/// The only transition is `Live -> Disposed`. It happens on the first disposal,
/// whichever path triggers it, and is never reversed.
///
/// # Examples
///
/// ```rust
/// use disposable_base::{Disposable, DisposableProbe, DisposeState};
///
/// let mut resource = Disposable::new(DisposableProbe::empty());
/// assert_eq!(resource.state(), DisposeState::Live);
///
/// resource.dispose().unwrap();
/// assert_eq!(resource.state(), DisposeState::Disposed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisposeState {
    /// Cleanup has not run yet.
    #[default]
    Live,
    /// Cleanup has run. Terminal.
    Disposed,
}

impl DisposeState {
    /// Returns true once cleanup has run.
    #[inline]
    pub fn is_disposed(self) -> bool {
        matches!(self, DisposeState::Disposed)
    }
}

/// Which path triggered disposal.
///
/// The path decides which hooks run, but it is not recorded in the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisposalPath {
    /// The owner called `dispose()`. Both hooks run.
    Explicit,
    /// Finalization on drop or tracker collection. Only the implicit hook runs.
    Implicit,
}

impl DisposalPath {
    /// Returns true if this path runs the explicit-cleanup hook.
    #[inline]
    pub fn runs_explicit_hook(self) -> bool {
        matches!(self, DisposalPath::Explicit)
    }
}

impl fmt::Display for DisposalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposalPath::Explicit => write!(f, "explicit"),
            DisposalPath::Implicit => write!(f, "implicit"),
        }
    }
}

/// Identifies one of the two cleanup hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// [`DisposeHooks::dispose_explicit`](crate::DisposeHooks::dispose_explicit)
    Explicit,
    /// [`DisposeHooks::dispose_implicit`](crate::DisposeHooks::dispose_implicit)
    Implicit,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Explicit => write!(f, "dispose_explicit"),
            Hook::Implicit => write!(f, "dispose_implicit"),
        }
    }
}
