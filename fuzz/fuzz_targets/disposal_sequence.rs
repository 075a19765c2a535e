#![no_main]

use disposable_base::{DisposableProbe, DisposeTracker, Tracked};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut counters = Vec::new();
    let mut handles: Vec<Option<Tracked<DisposableProbe>>> = Vec::new();

    {
        let tracker = DisposeTracker::new();

        // Low 2 bits pick the operation, the rest pick a slot.
        for &byte in data {
            let slot = (byte >> 2) as usize % handles.len().max(1);
            match byte % 4 {
                0 => {
                    let (probe, explicit, implicit) = DisposableProbe::counted();
                    handles.push(Some(tracker.track(probe)));
                    counters.push((explicit, implicit));
                }
                1 => {
                    if let Some(Some(handle)) = handles.get(slot) {
                        handle.dispose().unwrap();
                    }
                }
                2 => {
                    if let Some(handle) = handles.get_mut(slot) {
                        *handle = None;
                    }
                }
                _ => {
                    tracker.collect().unwrap();
                }
            }

            for (explicit, implicit) in &counters {
                assert!(explicit.count() <= 1);
                assert!(implicit.count() <= 1);
                assert!(explicit.count() <= implicit.count());
            }
        }

        handles.clear();
    }

    // Tracker dropped: every resource has been cleaned up exactly once.
    for (explicit, implicit) in &counters {
        assert!(explicit.count() <= 1);
        assert_eq!(implicit.count(), 1);
    }
});
