//! Core traits for two-phase disposal.

mod dispose;

pub use dispose::DisposeHooks;
