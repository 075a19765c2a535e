//! The disposable base wrapper and its two disposal paths.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::panic;
use std::sync::Arc;
use std::time::Instant;

use crate::internal::{panic_message, run_hook, PanicPayload};
use crate::observer::Observers;
use crate::{
    DisposalPath, DisposeConfig, DisposeError, DisposeHooks, DisposeObserver, DisposeResult,
    DisposeState, Hook, PanicPolicy,
};

/// First hook failure of a disposal run, kept with its payload so the
/// explicit path can re-raise it under [`PanicPolicy::Propagate`].
struct HookFailure {
    error: DisposeError,
    payload: PanicPayload,
}

/// Owns a resource and runs its [`DisposeHooks`] at most once.
///
/// There are two ways into the `Disposed` state:
///
/// - **Explicit**: the owner calls [`dispose`](Disposable::dispose). Runs
///   `dispose_explicit` then `dispose_implicit`.
/// - **Implicit**: the wrapper is dropped (or finalized by a
///   [`DisposeTracker`](crate::DisposeTracker)) while still live. Runs only
///   `dispose_implicit`.
///
/// Whichever happens first wins; the other becomes a no-op. Dropping a wrapper
/// that was already disposed does nothing, which plays the role of suppressing
/// finalization.
///
/// # Examples
///
/// ```
/// use disposable_base::{Disposable, DisposableProbe};
///
/// let (probe, explicit, implicit) = DisposableProbe::counted();
/// let mut resource = Disposable::new(probe);
///
/// resource.dispose().unwrap();
/// resource.dispose().unwrap();
///
/// assert!(resource.is_disposed());
/// assert_eq!(explicit.count(), 1);
/// assert_eq!(implicit.count(), 1);
/// ```
///
/// Finalization on drop only runs the implicit hook:
///
/// ```
/// use disposable_base::{Disposable, DisposableProbe};
///
/// let (probe, explicit, implicit) = DisposableProbe::counted();
/// drop(Disposable::new(probe));
///
/// assert_eq!(explicit.count(), 0);
/// assert_eq!(implicit.count(), 1);
/// ```
pub struct Disposable<T: DisposeHooks> {
    resource: T,
    state: DisposeState,
    label: &'static str,
    config: DisposeConfig,
    observers: Observers,
}

impl<T: DisposeHooks> Disposable<T> {
    /// Wraps a resource with the default configuration.
    ///
    /// The label defaults to the type name of `T`.
    pub fn new(resource: T) -> Self {
        Self::with_config(resource, DisposeConfig::default())
    }

    /// Wraps a resource with an explicit configuration.
    pub fn with_config(resource: T, config: DisposeConfig) -> Self {
        Self {
            resource,
            state: DisposeState::Live,
            label: std::any::type_name::<T>(),
            config,
            observers: Observers::default(),
        }
    }

    /// Sets the label reported to observers and in errors.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Attaches an observer that is notified of this resource's disposal.
    pub fn observe(mut self, observer: Arc<dyn DisposeObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub(crate) fn with_observers(mut self, observers: &Observers) -> Self {
        for observer in observers.iter() {
            self.observers.add(observer.clone());
        }
        self
    }

    /// Disposes the resource explicitly.
    ///
    /// On the first call the state flips to `Disposed`, then `dispose_explicit`
    /// and `dispose_implicit` run in that order. Later calls return `Ok(())`
    /// without side effects.
    ///
    /// # Errors
    ///
    /// If a hook panics, the other hook still runs. The first failure is then
    /// handled per [`DisposeConfig::explicit_panics`]: under
    /// [`PanicPolicy::Report`] it is returned as [`DisposeError::HookPanicked`],
    /// under [`PanicPolicy::Propagate`] the panic is resumed. Either way the
    /// resource stays disposed and its hooks never run again.
    pub fn dispose(&mut self) -> DisposeResult<()> {
        match self.run(DisposalPath::Explicit) {
            Ok(()) => Ok(()),
            Err(failure) => match self.config.explicit_panics {
                PanicPolicy::Report => Err(failure.error),
                PanicPolicy::Propagate => panic::resume_unwind(failure.payload),
            },
        }
    }

    /// Runs the finalization path. Panics are always contained.
    pub(crate) fn finalize(&mut self) -> DisposeResult<()> {
        self.run(DisposalPath::Implicit).map_err(|failure| failure.error)
    }

    fn run(&mut self, path: DisposalPath) -> Result<(), HookFailure> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.state = DisposeState::Disposed;

        if path == DisposalPath::Implicit && self.config.warn_on_implicit {
            eprintln!(
                "[disposable-base] {} finalized without dispose(). Call dispose() before dropping.",
                self.label
            );
        }

        self.observers.disposing(self.label, path);
        let start = Instant::now();
        let mut failure = None;

        if path.runs_explicit_hook() {
            let resource = &mut self.resource;
            if let Err(payload) = run_hook(|| resource.dispose_explicit()) {
                failure = Some(self.hook_failure(Hook::Explicit, payload));
            }
        }

        let resource = &mut self.resource;
        if let Err(payload) = run_hook(|| resource.dispose_implicit()) {
            let implicit_failure = self.hook_failure(Hook::Implicit, payload);
            if failure.is_none() {
                failure = Some(implicit_failure);
            }
        }

        self.observers.disposed(self.label, path, start.elapsed());

        match failure {
            None => Ok(()),
            Some(failure) => Err(failure),
        }
    }

    fn hook_failure(&self, hook: Hook, payload: PanicPayload) -> HookFailure {
        let message = panic_message(&payload);
        self.observers.hook_panicked(self.label, hook, &message);
        HookFailure {
            error: DisposeError::HookPanicked {
                resource: self.label,
                hook,
                message,
            },
            payload,
        }
    }

    /// Returns true once either disposal path has run.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// Returns the current lifecycle state.
    #[inline]
    pub fn state(&self) -> DisposeState {
        self.state
    }

    /// Label used for observers and errors.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The configuration this wrapper was built with.
    pub fn config(&self) -> &DisposeConfig {
        &self.config
    }

    /// Shared access to the wrapped resource.
    pub fn get(&self) -> &T {
        &self.resource
    }

    /// Mutable access to the wrapped resource.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.resource
    }

    /// Runs `f` against the resource, then disposes it explicitly.
    ///
    /// If `f` panics the wrapper is dropped during unwinding and the
    /// implicit path runs instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use disposable_base::{Disposable, DisposableProbe};
    ///
    /// let (probe, explicit, implicit) = DisposableProbe::counted();
    /// let answer = Disposable::new(probe).using(|_probe| 42).unwrap();
    ///
    /// assert_eq!(answer, 42);
    /// assert_eq!((explicit.count(), implicit.count()), (1, 1));
    /// ```
    pub fn using<R, F>(mut self, f: F) -> DisposeResult<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = f(self.get_mut());
        self.dispose()?;
        Ok(result)
    }
}

/// Wraps `resource` with the default configuration and runs [`Disposable::using`].
pub fn using<T, R, F>(resource: T, f: F) -> DisposeResult<R>
where
    T: DisposeHooks,
    F: FnOnce(&mut T) -> R,
{
    Disposable::new(resource).using(f)
}

impl<T: DisposeHooks> Deref for Disposable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.resource
    }
}

impl<T: DisposeHooks> DerefMut for Disposable<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.resource
    }
}

impl<T: DisposeHooks + fmt::Debug> fmt::Debug for Disposable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("resource", &self.resource)
            .field("observers", &format!("{} observers", self.observers.len()))
            .finish()
    }
}

impl<T: DisposeHooks> Drop for Disposable<T> {
    fn drop(&mut self) {
        if let Err(error) = self.finalize() {
            if !self.observers.has_observers() {
                eprintln!("[disposable-base] {}", error);
            }
        }
    }
}
