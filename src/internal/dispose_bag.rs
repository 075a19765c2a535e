//! Internal registration bag for tracked resources.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Disposable, DisposeError, DisposeHooks, DisposeResult};

/// Type-erased view of a tracked `Arc<Mutex<Disposable<T>>>`.
pub(crate) trait TrackedEntry: Send {
    /// `None` when the entry is locked elsewhere, which means it is in use.
    fn try_is_disposed(&self) -> Option<bool>;
    /// True when the tracker holds the only reference.
    fn is_orphaned(&self) -> bool;
    /// Disposes the entry unless it is locked elsewhere, possibly by the
    /// calling thread. `Some(Ok(false))` means it was already disposed.
    fn try_dispose(&self) -> Option<DisposeResult<bool>>;
    fn finalize(&self) -> DisposeResult<()>;
}

impl<T> TrackedEntry for Arc<Mutex<Disposable<T>>>
where
    T: DisposeHooks + Send + 'static,
{
    fn try_is_disposed(&self) -> Option<bool> {
        self.try_lock().map(|guard| guard.is_disposed())
    }

    fn is_orphaned(&self) -> bool {
        Arc::strong_count(self) == 1
    }

    fn try_dispose(&self) -> Option<DisposeResult<bool>> {
        let mut guard = self.try_lock()?;
        if guard.is_disposed() {
            return Some(Ok(false));
        }
        Some(guard.dispose().map(|()| true))
    }

    fn finalize(&self) -> DisposeResult<()> {
        self.lock().finalize()
    }
}

/// Outcome of a pass over the bag: how many resources were cleaned up, and
/// the failures collected along the way.
#[derive(Default)]
pub(crate) struct Sweep {
    pub(crate) count: usize,
    pub(crate) errors: Vec<DisposeError>,
}

impl Sweep {
    pub(crate) fn record(&mut self, result: DisposeResult<()>) {
        self.count += 1;
        if let Err(error) = result {
            self.errors.push(error);
        }
    }
}

/// Container for tracked resources with LIFO cleanup order.
#[derive(Default)]
pub(crate) struct DisposeBag {
    entries: Vec<Box<dyn TrackedEntry>>,
}

impl DisposeBag {
    /// Add a tracked resource.
    pub(crate) fn push(&mut self, entry: Box<dyn TrackedEntry>) {
        self.entries.push(entry);
    }

    /// Put entries popped earlier back in front of whatever was registered since.
    ///
    /// `popped` is in pop order, newest first.
    pub(crate) fn requeue(&mut self, mut popped: Vec<Box<dyn TrackedEntry>>) {
        popped.reverse();
        popped.append(&mut self.entries);
        self.entries = popped;
    }

    /// Remove the most recently tracked entry.
    pub(crate) fn pop(&mut self) -> Option<Box<dyn TrackedEntry>> {
        self.entries.pop()
    }

    /// Finalize every live entry in reverse order (LIFO).
    pub(crate) fn finalize_all_reverse(&mut self) -> Sweep {
        let mut sweep = Sweep::default();
        while let Some(entry) = self.entries.pop() {
            if entry.try_is_disposed() == Some(true) {
                continue;
            }
            sweep.record(entry.finalize());
        }
        sweep
    }

    /// Remove live entries nothing else references and return them newest first.
    ///
    /// Disposed entries are dropped. Entries that are still referenced, or
    /// currently locked, stay in order. Nothing is finalized here, so the
    /// caller can run hooks after releasing the bag.
    pub(crate) fn take_orphans(&mut self) -> Vec<Box<dyn TrackedEntry>> {
        let mut orphans = Vec::new();
        for entry in mem::take(&mut self.entries) {
            match entry.try_is_disposed() {
                Some(true) => {}
                Some(false) if entry.is_orphaned() => orphans.push(entry),
                _ => self.entries.push(entry),
            }
        }
        orphans.reverse();
        orphans
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count entries that have not been disposed yet. Locked entries count as live.
    pub(crate) fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.try_is_disposed() != Some(true))
            .count()
    }

    /// Check if the bag is empty (nothing tracked).
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
