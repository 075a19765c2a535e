//! Tracking owner that finalizes resources before its scope exits.
//!
//! A [`DisposeTracker`] takes the place of a garbage collector's finalizer
//! queue. Resources registered with it are handed back as [`Tracked`]
//! handles. Resources that nobody disposes explicitly are finalized (implicit
//! hook only) when [`collect`](DisposeTracker::collect) finds them
//! unreferenced, or at the latest when the tracker itself is dropped.

use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::internal::{DisposeBag, Sweep, TrackedEntry};
use crate::observer::Observers;
use crate::{Disposable, DisposeConfig, DisposeError, DisposeHooks, DisposeObserver, DisposeResult};

/// Shared handle to a resource registered with a [`DisposeTracker`].
///
/// Clones refer to the same resource. The tracker treats a resource as
/// unreachable once every handle has been dropped.
pub struct Tracked<T: DisposeHooks> {
    inner: Arc<Mutex<Disposable<T>>>,
}

impl<T: DisposeHooks> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: DisposeHooks> Tracked<T> {
    /// Locks the wrapper for direct access.
    ///
    /// Do not hold the guard across calls to [`DisposeTracker::dispose_all`]
    /// on the same thread.
    pub fn lock(&self) -> MutexGuard<'_, Disposable<T>> {
        self.inner.lock()
    }

    /// Disposes the resource explicitly. See [`Disposable::dispose`].
    pub fn dispose(&self) -> DisposeResult<()> {
        self.inner.lock().dispose()
    }

    /// Returns true once the resource has been disposed or finalized.
    pub fn is_disposed(&self) -> bool {
        self.inner.lock().is_disposed()
    }

    /// Label used for observers and errors.
    pub fn label(&self) -> &'static str {
        self.inner.lock().label()
    }
}

impl<T: DisposeHooks + fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f.debug_tuple("Tracked").field(&*guard).finish(),
            None => f
                .debug_tuple("Tracked")
                .field(&format_args!("<locked>"))
                .finish(),
        }
    }
}

/// Entries `dispose_all` found locked. They go back into the bag when the
/// pass ends, including when a hook panic unwinds out of it.
struct Busy<'a> {
    bag: &'a Mutex<DisposeBag>,
    entries: Vec<Box<dyn TrackedEntry>>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            self.bag.lock().requeue(mem::take(&mut self.entries));
        }
    }
}

/// Owner of tracked resources with LIFO cleanup.
///
/// # Examples
///
/// ```
/// use disposable_base::{DisposableProbe, DisposeTracker};
///
/// let tracker = DisposeTracker::new();
/// let (probe, explicit, implicit) = DisposableProbe::counted();
///
/// let handle = tracker.track(probe);
/// assert!(!handle.is_disposed());
///
/// // Nothing references the resource anymore: collection finalizes it.
/// drop(handle);
/// assert_eq!(tracker.collect().unwrap(), 1);
///
/// assert_eq!(explicit.count(), 0);
/// assert_eq!(implicit.count(), 1);
/// ```
pub struct DisposeTracker {
    bag: Mutex<DisposeBag>,
    config: DisposeConfig,
    observers: Observers,
}

impl DisposeTracker {
    /// Creates a tracker with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DisposeConfig::default())
    }

    /// Creates a tracker whose resources are wrapped with `config`.
    pub fn with_config(config: DisposeConfig) -> Self {
        Self {
            bag: Mutex::new(DisposeBag::default()),
            config,
            observers: Observers::default(),
        }
    }

    /// Attaches an observer to every resource tracked from now on.
    pub fn observe(mut self, observer: Arc<dyn DisposeObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// The configuration applied to resources passed to [`track`](DisposeTracker::track).
    pub fn config(&self) -> &DisposeConfig {
        &self.config
    }

    /// Wraps `resource` with the tracker's config and observers and registers it.
    pub fn track<T>(&self, resource: T) -> Tracked<T>
    where
        T: DisposeHooks + Send + 'static,
    {
        let disposable =
            Disposable::with_config(resource, self.config.clone()).with_observers(&self.observers);
        self.adopt(disposable)
    }

    /// Registers an already configured wrapper as-is.
    pub fn adopt<T>(&self, disposable: Disposable<T>) -> Tracked<T>
    where
        T: DisposeHooks + Send + 'static,
    {
        let inner = Arc::new(Mutex::new(disposable));
        self.bag.lock().push(Box::new(inner.clone()));
        Tracked { inner }
    }

    /// Finalizes tracked resources that no [`Tracked`] handle references anymore.
    ///
    /// Also forgets resources that were already disposed. Returns how many
    /// resources were finalized. Hooks run after the orphans have been removed
    /// from the tracker, so other threads keep seeing every other registration.
    ///
    /// # Errors
    ///
    /// Hook panics are contained and returned once the pass completes, as a
    /// single [`DisposeError::HookPanicked`] or a [`DisposeError::Aggregate`].
    pub fn collect(&self) -> DisposeResult<usize> {
        let orphans = self.bag.lock().take_orphans();
        let mut sweep = Sweep::default();
        for orphan in orphans {
            sweep.record(orphan.finalize());
        }
        Self::finish(sweep)
    }

    /// Explicitly disposes every live tracked resource in LIFO order.
    ///
    /// Returns how many resources were disposed. Outstanding handles stay
    /// valid but report `is_disposed() == true`.
    ///
    /// Resources locked at the time of the call are skipped and stay
    /// registered. That covers one whose hook is running on this thread, which
    /// lets a hook call `dispose_all` without deadlocking. A skipped resource is
    /// cleaned up by whoever holds it, or later by `collect` or the tracker's drop.
    ///
    /// # Errors
    ///
    /// Under [`PanicPolicy::Report`](crate::PanicPolicy::Report) hook panics are
    /// collected like in [`collect`](DisposeTracker::collect). Under
    /// `Propagate` the first panic unwinds out of this call; resources not yet
    /// reached are finalized when the tracker is dropped.
    pub fn dispose_all(&self) -> DisposeResult<usize> {
        let mut sweep = Sweep::default();
        let mut busy = Busy {
            bag: &self.bag,
            entries: Vec::new(),
        };
        loop {
            // The bag lock is released before running hooks so they may track new resources.
            let next = self.bag.lock().pop();
            let Some(entry) = next else { break };
            match entry.try_dispose() {
                None => busy.entries.push(entry),
                Some(Ok(false)) => {}
                Some(result) => sweep.record(result.map(drop)),
            }
        }
        drop(busy);
        Self::finish(sweep)
    }

    /// Number of registrations, including disposed ones not yet collected.
    pub fn len(&self) -> usize {
        self.bag.lock().len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.bag.lock().is_empty()
    }

    /// Number of tracked resources that have not been disposed.
    pub fn live_count(&self) -> usize {
        self.bag.lock().live_count()
    }

    fn finish(sweep: Sweep) -> DisposeResult<usize> {
        DisposeError::collect(sweep.count, sweep.errors)
    }
}

impl Default for DisposeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DisposeTracker {
    fn drop(&mut self) {
        let bag = self.bag.get_mut();
        if self.config.warn_on_implicit && bag.live_count() > 0 {
            eprintln!(
                "[disposable-base] DisposeTracker dropped with undisposed resources. Call dispose_all() before dropping."
            );
        }

        let sweep = bag.finalize_all_reverse();
        if !self.observers.has_observers() {
            for error in sweep.errors {
                eprintln!("[disposable-base] {}", error);
            }
        }
    }
}
