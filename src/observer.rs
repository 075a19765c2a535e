//! Diagnostic observers for disposal events.
//!
//! Observers are the logging surface of the crate: every disposal, on either
//! path, is reported to the observers attached to the resource.

use std::sync::Arc;
use std::time::Duration;

use crate::{DisposalPath, Hook};

/// Observer trait for disposal events.
///
/// All methods have empty default implementations, so an observer only
/// overrides the events it cares about. Calls are made synchronously on the
/// thread that disposes the resource, which for the implicit path means from
/// inside `Drop`. Keep implementations lightweight and never panic from them.
///
/// # Examples
///
/// ```
/// use disposable_base::{Disposable, DisposableProbe, DisposalPath, DisposeObserver};
/// use std::sync::Arc;
///
/// struct PrintObserver;
///
/// impl DisposeObserver for PrintObserver {
///     fn disposing(&self, resource: &'static str, path: DisposalPath) {
///         println!("disposing {} via {} path", resource, path);
///     }
/// }
///
/// let mut probe = Disposable::new(DisposableProbe::empty())
///     .with_label("probe")
///     .observe(Arc::new(PrintObserver));
/// probe.dispose().unwrap();
/// ```
pub trait DisposeObserver: Send + Sync {
    /// Called after the state flips to `Disposed`, before any hook runs.
    ///
    /// # Arguments
    ///
    /// * `resource` - Label of the resource being disposed
    /// * `path` - Which disposal path triggered the cleanup
    fn disposing(&self, resource: &'static str, path: DisposalPath) {
        let _ = (resource, path);
    }

    /// Called after all hooks for the path have been attempted.
    ///
    /// # Arguments
    ///
    /// * `resource` - Label of the disposed resource
    /// * `path` - Which disposal path ran
    /// * `duration` - Time spent running the hooks
    fn disposed(&self, resource: &'static str, path: DisposalPath, duration: Duration) {
        let _ = (resource, path, duration);
    }

    /// Called when a hook panicked. The panic has already been caught.
    fn hook_panicked(&self, resource: &'static str, hook: Hook, message: &str) {
        let _ = (resource, hook, message);
    }
}

/// Container for attached observers.
///
/// Cloned into every resource a tracker wraps. Has minimal overhead when no
/// observers are attached.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DisposeObserver>>,
}

impl Observers {
    /// Adds an observer to the collection.
    pub(crate) fn add(&mut self, observer: Arc<dyn DisposeObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are attached.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn DisposeObserver>> {
        self.observers.iter()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn disposing(&self, resource: &'static str, path: DisposalPath) {
        for observer in &self.observers {
            observer.disposing(resource, path);
        }
    }

    #[inline]
    pub(crate) fn disposed(&self, resource: &'static str, path: DisposalPath, duration: Duration) {
        for observer in &self.observers {
            observer.disposed(resource, path, duration);
        }
    }

    #[inline]
    pub(crate) fn hook_panicked(&self, resource: &'static str, hook: Hook, message: &str) {
        for observer in &self.observers {
            observer.hook_panicked(resource, hook, message);
        }
    }
}

/// Built-in observer that logs events to stdout, and hook panics to stderr.
///
/// Useful for development and debugging. For production use, implement an
/// observer that forwards to your logging infrastructure.
///
/// # Examples
///
/// ```
/// use disposable_base::{Disposable, DisposableProbe, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut probe = Disposable::new(DisposableProbe::empty())
///     .observe(Arc::new(LoggingObserver::new()));
///
/// // Prints "[disposable-base] Disposing: ... (explicit)" and the completion line
/// probe.dispose().unwrap();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[disposable-base]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix written before every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DisposeObserver for LoggingObserver {
    fn disposing(&self, resource: &'static str, path: DisposalPath) {
        println!("{} Disposing: {} ({})", self.prefix, resource, path);
    }

    fn disposed(&self, resource: &'static str, path: DisposalPath, duration: Duration) {
        println!("{} Disposed: {} ({}) in {:?}", self.prefix, resource, path, duration);
    }

    fn hook_panicked(&self, resource: &'static str, hook: Hook, message: &str) {
        eprintln!("{} HOOK PANIC in {}::{}: {}", self.prefix, resource, hook, message);
    }
}
