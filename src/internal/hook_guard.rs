//! Panic containment for cleanup hooks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Boxed panic payload captured from a hook.
pub(crate) type PanicPayload = Box<dyn Any + Send + 'static>;

/// Run a hook, catching any panic it raises.
pub(crate) fn run_hook<F>(f: F) -> Result<(), PanicPayload>
where
    F: FnOnce(),
{
    panic::catch_unwind(AssertUnwindSafe(f))
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &PanicPayload) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
