//! # disposable-base
//!
//! Two-phase resource cleanup for Rust, modeled on the .NET dispose pattern.
//!
//! ## Features
//!
//! - **Two hooks**: cleanup split into an explicit phase (owner-requested) and
//!   an implicit phase (safe on any path, including finalization)
//! - **At-most-once**: hooks never run twice, however many times or ways disposal is triggered
//! - **Deterministic finalization**: dropping an undisposed wrapper runs the implicit hook
//! - **Tracking owner**: [`DisposeTracker`] finalizes unreferenced resources on demand
//!   and everything left when it goes out of scope
//! - **Contained hook panics**: reported as errors or re-raised, per [`PanicPolicy`]
//! - **Test doubles**: [`DisposableProbe`] and [`CallCounter`] for asserting which path ran
//!
//! ## Quick Start
//!
//! ```rust
//! use disposable_base::{Disposable, DisposeHooks};
//!
//! struct Connection {
//!     open: bool,
//!     pending_writes: Vec<String>,
//! }
//!
//! impl DisposeHooks for Connection {
//!     fn dispose_explicit(&mut self) {
//!         // Only when the owner disposes deterministically.
//!         self.pending_writes.clear();
//!     }
//!
//!     fn dispose_implicit(&mut self) {
//!         // Always, including on drop.
//!         self.open = false;
//!     }
//! }
//!
//! let mut conn = Disposable::new(Connection {
//!     open: true,
//!     pending_writes: vec!["INSERT".to_string()],
//! });
//!
//! conn.dispose().unwrap();
//! assert!(conn.is_disposed());
//! assert!(!conn.open);
//! assert!(conn.pending_writes.is_empty());
//!
//! // A second dispose is a no-op.
//! conn.dispose().unwrap();
//! ```
//!
//! ## Finalization
//!
//! ```rust
//! use disposable_base::{Disposable, DisposableProbe};
//!
//! let (probe, explicit, implicit) = DisposableProbe::counted();
//! {
//!     let _resource = Disposable::new(probe);
//!     // never disposed
//! }
//! assert_eq!(explicit.count(), 0);
//! assert_eq!(implicit.count(), 1);
//! ```
//!
//! ## Tracking
//!
//! ```rust
//! use disposable_base::{DisposableProbe, DisposeTracker};
//!
//! let tracker = DisposeTracker::new();
//! let (probe, explicit, implicit) = DisposableProbe::counted();
//! let handle = tracker.track(probe);
//!
//! let clone = handle.clone();
//! drop(handle);
//! assert_eq!(tracker.collect().unwrap(), 0); // still referenced by `clone`
//!
//! drop(clone);
//! assert_eq!(tracker.collect().unwrap(), 1);
//! assert_eq!((explicit.count(), implicit.count()), (0, 1));
//! ```

// Module declarations
pub mod config;
pub mod disposable;
pub mod error;
pub mod observer;
pub mod state;
pub mod testing;
pub mod tracker;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use config::{DisposeConfig, PanicPolicy};
pub use disposable::{using, Disposable};
pub use error::{DisposeError, DisposeResult};
pub use observer::{DisposeObserver, LoggingObserver};
pub use state::{DisposalPath, DisposeState, Hook};
pub use testing::{CallCounter, DisposableProbe, DisposalEvent, EventLog};
pub use tracker::{DisposeTracker, Tracked};
pub use traits::DisposeHooks;
