//! Internal implementation details.

pub(crate) mod dispose_bag;
pub(crate) mod hook_guard;

pub(crate) use dispose_bag::{DisposeBag, Sweep, TrackedEntry};
pub(crate) use hook_guard::{panic_message, run_hook, PanicPayload};
