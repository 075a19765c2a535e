//! Scoped cleanup demo.
//!
//! Shows explicit disposal, finalization on drop, and a tracker collecting
//! resources nobody disposed.
//!
//! Run with: cargo run --example scoped_cleanup

use disposable_base::{
    Disposable, DisposeConfig, DisposeHooks, DisposeResult, DisposeTracker, LoggingObserver,
};
use std::sync::Arc;

/// A pretend temp file: the path is the external handle, the buffer is a managed child.
struct TempFile {
    path: String,
    buffer: Vec<u8>,
}

impl TempFile {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            buffer: Vec::new(),
        }
    }
}

impl DisposeHooks for TempFile {
    fn dispose_explicit(&mut self) {
        println!("  flushing {} bytes to {}", self.buffer.len(), self.path);
        self.buffer.clear();
    }

    fn dispose_implicit(&mut self) {
        println!("  removing {}", self.path);
    }
}

fn main() -> DisposeResult<()> {
    let config = DisposeConfig::from_env()?.with_warn_on_implicit(true);
    let logger = Arc::new(LoggingObserver::with_prefix("[demo]"));

    println!("== explicit dispose");
    let mut report = Disposable::with_config(TempFile::new("/tmp/report.csv"), config.clone())
        .with_label("report")
        .observe(logger.clone());
    report.buffer.extend_from_slice(b"id,total\n1,42\n");
    report.dispose()?;
    report.dispose()?; // no-op

    println!("== finalized on drop");
    {
        let mut scratch = Disposable::with_config(TempFile::new("/tmp/scratch.bin"), config.clone())
            .with_label("scratch")
            .observe(logger.clone());
        scratch.buffer.push(0xFF);
        // Never disposed: only the implicit hook runs when the scope ends.
    }

    println!("== tracker");
    let tracker = DisposeTracker::with_config(config).observe(logger);
    let kept = tracker.track(TempFile::new("/tmp/kept.log"));
    drop(tracker.track(TempFile::new("/tmp/orphan.log")));

    println!("  collected {} orphaned resource(s)", tracker.collect()?);
    kept.dispose()?;
    println!("  {} registration(s) left", tracker.live_count());

    Ok(())
}
