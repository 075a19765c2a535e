//! Disposal hooks for two-phase resource cleanup.

/// Cleanup hooks split by disposal path.
///
/// Implement this trait for resources wrapped in a [`Disposable`](crate::Disposable).
/// Both hooks default to no-ops, so a type only overrides the phases it needs.
///
/// - `dispose_explicit` runs only when the owner calls `dispose()`. Release
///   other owned objects here, since they are known to be alive.
/// - `dispose_implicit` runs on every disposal path, including finalization on
///   drop. Only release what is safe without other live objects here (raw
///   handles, counters, external registrations).
///
/// Each hook runs at most once per wrapped instance.
///
/// # Examples
///
/// ```
/// use disposable_base::{Disposable, DisposeHooks};
///
/// struct TempDir {
///     path: String,
///     removed: bool,
///     index_flushed: bool,
/// }
///
/// impl DisposeHooks for TempDir {
///     fn dispose_explicit(&mut self) {
///         // Only safe when the owner is in control.
///         self.index_flushed = true;
///     }
///
///     fn dispose_implicit(&mut self) {
///         self.removed = true;
///     }
/// }
///
/// let mut dir = Disposable::new(TempDir {
///     path: "/tmp/work".to_string(),
///     removed: false,
///     index_flushed: false,
/// });
/// dir.dispose().unwrap();
/// assert!(dir.removed && dir.index_flushed);
/// ```
pub trait DisposeHooks {
    /// Cleanup that is only valid when disposal is requested by the owner.
    fn dispose_explicit(&mut self) {}

    /// Cleanup that is safe on any path, including finalization.
    fn dispose_implicit(&mut self) {}
}

impl<T: DisposeHooks + ?Sized> DisposeHooks for Box<T> {
    fn dispose_explicit(&mut self) {
        (**self).dispose_explicit();
    }

    fn dispose_implicit(&mut self) {
        (**self).dispose_implicit();
    }
}
