//! Test doubles for asserting disposal behavior.
//!
//! [`DisposableProbe`] forwards each hook to an optional callback, and
//! [`CallCounter`] gives a cheap way to count how often a callback ran.
//! [`EventLog`] records observer events in order.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{DisposalPath, DisposeHooks, DisposeObserver, Hook};

type Callback = Box<dyn FnMut() + Send>;

/// A resource whose hooks just invoke injected callbacks.
///
/// Lets a test assert which cleanup path ran and how many times.
///
/// # Examples
///
/// ```
/// use disposable_base::{CallCounter, Disposable, DisposableProbe};
///
/// let explicit = CallCounter::new();
/// let implicit = CallCounter::new();
/// let probe = DisposableProbe::new(explicit.incrementer(), implicit.incrementer());
///
/// let mut resource = Disposable::new(probe);
/// resource.dispose().unwrap();
/// resource.dispose().unwrap();
///
/// assert_eq!(explicit.count(), 1);
/// assert_eq!(implicit.count(), 1);
/// ```
#[derive(Default)]
pub struct DisposableProbe {
    on_explicit: Option<Callback>,
    on_implicit: Option<Callback>,
}

impl DisposableProbe {
    /// Creates a probe with both callbacks set.
    pub fn new<E, I>(on_explicit: E, on_implicit: I) -> Self
    where
        E: FnMut() + Send + 'static,
        I: FnMut() + Send + 'static,
    {
        Self::empty().on_explicit(on_explicit).on_implicit(on_implicit)
    }

    /// Creates a probe with no callbacks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a probe wired to two fresh counters: `(probe, explicit, implicit)`.
    pub fn counted() -> (Self, CallCounter, CallCounter) {
        let explicit = CallCounter::new();
        let implicit = CallCounter::new();
        let probe = Self::new(explicit.incrementer(), implicit.incrementer());
        (probe, explicit, implicit)
    }

    /// Sets the callback run by the explicit-cleanup hook.
    pub fn on_explicit<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_explicit = Some(Box::new(f));
        self
    }

    /// Sets the callback run by the implicit-cleanup hook.
    pub fn on_implicit<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_implicit = Some(Box::new(f));
        self
    }
}

impl DisposeHooks for DisposableProbe {
    fn dispose_explicit(&mut self) {
        if let Some(f) = self.on_explicit.as_mut() {
            f();
        }
    }

    fn dispose_implicit(&mut self) {
        if let Some(f) = self.on_implicit.as_mut() {
            f();
        }
    }
}

impl fmt::Debug for DisposableProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableProbe")
            .field("on_explicit", &self.on_explicit.is_some())
            .field("on_implicit", &self.on_implicit.is_some())
            .finish()
    }
}

/// Shared invocation counter.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback that increments this counter.
    pub fn incrementer(&self) -> impl FnMut() + Send + 'static {
        let counter = self.0.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Current count.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the count back to zero.
    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// An event recorded by [`EventLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisposalEvent {
    /// A disposal path started.
    Disposing {
        resource: &'static str,
        path: DisposalPath,
    },
    /// A disposal path finished, whether or not a hook panicked.
    Disposed {
        resource: &'static str,
        path: DisposalPath,
    },
    /// A hook panicked and the panic was caught.
    HookPanicked {
        resource: &'static str,
        hook: Hook,
        message: String,
    },
}

/// Observer that records every event in order.
///
/// Durations are dropped from `disposed` events so they can be compared.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<DisposalEvent>>,
}

impl EventLog {
    /// Creates an empty log, already shared so it can be passed to `observe`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<DisposalEvent> {
        self.events.lock().clone()
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DisposeObserver for EventLog {
    fn disposing(&self, resource: &'static str, path: DisposalPath) {
        self.events.lock().push(DisposalEvent::Disposing { resource, path });
    }

    fn disposed(&self, resource: &'static str, path: DisposalPath, _duration: Duration) {
        self.events.lock().push(DisposalEvent::Disposed { resource, path });
    }

    fn hook_panicked(&self, resource: &'static str, hook: Hook, message: &str) {
        self.events.lock().push(DisposalEvent::HookPanicked {
            resource,
            hook,
            message: message.to_string(),
        });
    }
}
