/// DisposeTracker tests: collection of unreachable resources, LIFO disposal,
/// and finalization when the tracker goes out of scope.

use disposable_base::{
    CallCounter, Disposable, DisposableProbe, DisposalEvent, DisposalPath, DisposeConfig,
    DisposeError, DisposeTracker, EventLog, PanicPolicy,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

fn ordered_probe(order: &Arc<Mutex<Vec<String>>>, name: &str) -> DisposableProbe {
    let explicit_order = order.clone();
    let implicit_order = order.clone();
    let explicit_name = format!("explicit-{}", name);
    let implicit_name = format!("implicit-{}", name);
    DisposableProbe::new(
        move || explicit_order.lock().unwrap().push(explicit_name.clone()),
        move || implicit_order.lock().unwrap().push(implicit_name.clone()),
    )
}

#[test]
fn test_collect_finalizes_unreachable_resource() {
    let tracker = DisposeTracker::new();
    let a = CallCounter::new();
    let b = CallCounter::new();

    let handle = tracker.track(DisposableProbe::new(a.incrementer(), b.incrementer()));
    drop(handle);

    assert_eq!(tracker.collect().unwrap(), 1);
    assert_eq!(a.count(), 0);
    assert_eq!(b.count(), 1);
    assert!(tracker.is_empty());
}

#[test]
fn test_collect_skips_referenced_resources() {
    let tracker = DisposeTracker::new();
    let (probe, explicit, implicit) = DisposableProbe::counted();

    let handle = tracker.track(probe);
    assert_eq!(tracker.collect().unwrap(), 0);
    assert_eq!(tracker.len(), 1);
    assert!(!handle.is_disposed());
    assert_eq!((explicit.count(), implicit.count()), (0, 0));
}

#[test]
fn test_collect_after_explicit_dispose_does_not_rerun_hooks() {
    let tracker = DisposeTracker::new();
    let (probe, explicit, implicit) = DisposableProbe::counted();

    let handle = tracker.track(probe);
    handle.dispose().unwrap();
    handle.dispose().unwrap();
    drop(handle);

    assert_eq!(tracker.collect().unwrap(), 0);
    assert_eq!((explicit.count(), implicit.count()), (1, 1));
}

#[test]
fn test_dispose_all_is_lifo_and_explicit() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let tracker = DisposeTracker::new();

    let _first = tracker.track(ordered_probe(&order, "first"));
    let _second = tracker.track(ordered_probe(&order, "second"));
    let _third = tracker.track(ordered_probe(&order, "third"));

    assert_eq!(tracker.dispose_all().unwrap(), 3);
    assert_eq!(
        *order.lock().unwrap(),
        vec![
            "explicit-third",
            "implicit-third",
            "explicit-second",
            "implicit-second",
            "explicit-first",
            "implicit-first",
        ]
    );
    assert!(tracker.is_empty());
    assert!(_first.is_disposed());
}

#[test]
fn test_dispose_all_skips_already_disposed() {
    let tracker = DisposeTracker::new();
    let a = tracker.track(DisposableProbe::empty());
    let _b = tracker.track(DisposableProbe::empty());

    a.dispose().unwrap();
    assert_eq!(tracker.live_count(), 1);
    assert_eq!(tracker.dispose_all().unwrap(), 1);
}

#[test]
fn test_tracker_drop_finalizes_remaining_in_lifo_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let first;
    {
        let tracker = DisposeTracker::new();
        first = tracker.track(ordered_probe(&order, "first"));
        let _second = tracker.track(ordered_probe(&order, "second"));
        let disposed = tracker.track(ordered_probe(&order, "disposed"));
        disposed.dispose().unwrap();
        order.lock().unwrap().clear();
    }

    assert_eq!(*order.lock().unwrap(), vec!["implicit-second", "implicit-first"]);
    // Handles outlive the tracker but the resource is already finalized.
    assert!(first.is_disposed());
}

#[test]
fn test_dropping_handle_defers_finalization_to_tracker() {
    let tracker = DisposeTracker::new();
    let (probe, explicit, implicit) = DisposableProbe::counted();
    let handle = tracker.track(probe);

    // The tracker still holds a reference, so dropping the handle finalizes nothing yet.
    drop(handle);
    assert_eq!(implicit.count(), 0);

    drop(tracker);
    assert_eq!((explicit.count(), implicit.count()), (0, 1));
}

#[test]
fn test_collect_aggregates_hook_failures() {
    let tracker = DisposeTracker::new();
    drop(tracker.track(DisposableProbe::empty().on_implicit(|| panic!("one"))));
    drop(tracker.track(DisposableProbe::empty().on_implicit(|| panic!("two"))));
    drop(tracker.track(DisposableProbe::empty()));

    match tracker.collect() {
        Err(DisposeError::Aggregate(errors)) => {
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected aggregate error, got {:?}", other),
    }
    assert!(tracker.is_empty());
}

#[test]
fn test_dispose_all_propagate_leaves_rest_for_drop() {
    let config = DisposeConfig::default().with_explicit_panics(PanicPolicy::Propagate);
    let first_implicit = CallCounter::new();
    {
        let tracker = DisposeTracker::with_config(config);
        let _first =
            tracker.track(DisposableProbe::empty().on_implicit(first_implicit.incrementer()));
        let _second = tracker.track(DisposableProbe::empty().on_explicit(|| panic!("boom")));

        let result = panic::catch_unwind(AssertUnwindSafe(|| tracker.dispose_all()));
        assert!(result.is_err());
        assert_eq!(first_implicit.count(), 0);
        assert_eq!(tracker.live_count(), 1);
    }
    assert_eq!(first_implicit.count(), 1);
}

#[test]
fn test_adopt_keeps_existing_configuration() {
    let tracker = DisposeTracker::new();
    let log = EventLog::new();
    let disposable = Disposable::new(DisposableProbe::empty())
        .with_label("adopted")
        .observe(log.clone());

    let handle = tracker.adopt(disposable);
    assert_eq!(handle.label(), "adopted");
    drop(handle);
    tracker.collect().unwrap();

    assert_eq!(
        log.events(),
        vec![
            DisposalEvent::Disposing {
                resource: "adopted",
                path: DisposalPath::Implicit,
            },
            DisposalEvent::Disposed {
                resource: "adopted",
                path: DisposalPath::Implicit,
            },
        ]
    );
}

#[test]
fn test_tracker_observers_apply_to_tracked_resources() {
    let log = EventLog::new();
    let tracker = DisposeTracker::new().observe(log.clone());
    let handle = tracker.track(DisposableProbe::empty());
    let label = handle.label();

    handle.dispose().unwrap();
    assert_eq!(
        log.events(),
        vec![
            DisposalEvent::Disposing {
                resource: label,
                path: DisposalPath::Explicit,
            },
            DisposalEvent::Disposed {
                resource: label,
                path: DisposalPath::Explicit,
            },
        ]
    );
}

#[test]
fn test_hooks_may_track_new_resources_during_dispose_all() {
    let tracker = Arc::new(DisposeTracker::new());
    let late = CallCounter::new();

    let inner_tracker = tracker.clone();
    let late_counter = late.clone();
    let _outer = tracker.track(DisposableProbe::empty().on_explicit(move || {
        drop(inner_tracker.track(DisposableProbe::empty().on_explicit(late_counter.incrementer())));
    }));

    // The resource tracked mid-pass is picked up by the same pass.
    assert_eq!(tracker.dispose_all().unwrap(), 2);
    assert_eq!(late.count(), 1);
}

#[test]
fn test_tracked_handles_across_threads() {
    let tracker = DisposeTracker::new();
    let (probe, explicit, implicit) = DisposableProbe::counted();
    let handle = tracker.track(probe);

    crossbeam_utils::thread::scope(|s| {
        for _ in 0..4 {
            let handle = handle.clone();
            s.spawn(move |_| {
                handle.dispose().unwrap();
            });
        }
    })
    .unwrap();

    assert_eq!((explicit.count(), implicit.count()), (1, 1));
}

#[test]
fn test_dispose_all_from_within_tracked_hook_returns() {
    let tracker = Arc::new(DisposeTracker::new());
    let (sibling_probe, sibling_explicit, _) = DisposableProbe::counted();
    let sibling = tracker.track(sibling_probe);

    // A weak reference keeps the hook from owning its own tracker.
    let weak = Arc::downgrade(&tracker);
    let (tx, rx) = mpsc::channel();
    let handle = tracker.track(DisposableProbe::empty().on_explicit(move || {
        if let Some(tracker) = weak.upgrade() {
            tx.send(tracker.dispose_all()).unwrap();
        }
    }));

    let worker = thread::spawn(move || handle.dispose());
    let nested = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("dispose_all called from a hook did not return");

    // The resource whose hook is running is skipped, its sibling is disposed.
    assert_eq!(nested.unwrap(), 1);
    worker.join().unwrap().unwrap();
    assert!(sibling.is_disposed());
    assert_eq!(sibling_explicit.count(), 1);

    assert_eq!(tracker.live_count(), 0);
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.collect().unwrap(), 0);
    assert!(tracker.is_empty());
}

#[test]
fn test_dispose_all_sees_live_resources_while_collect_runs_hooks() {
    let tracker = DisposeTracker::new();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    drop(tracker.track(DisposableProbe::empty().on_implicit(move || {
        entered_tx.send(()).unwrap();
        release_rx.recv().unwrap();
    })));
    let (live_probe, live_explicit, live_implicit) = DisposableProbe::counted();
    let live = tracker.track(live_probe);

    let (disposed, collected) = crossbeam_utils::thread::scope(|s| {
        let collector = s.spawn(|_| tracker.collect());
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // The orphan's hook is blocked inside collect on the other thread.
        let registered = tracker.len();
        let disposed = tracker.dispose_all();
        release_tx.send(()).unwrap();

        assert_eq!(registered, 1);
        (disposed, collector.join().unwrap())
    })
    .unwrap();

    assert_eq!(disposed.unwrap(), 1);
    assert_eq!(collected.unwrap(), 1);
    assert!(live.is_disposed());
    assert_eq!((live_explicit.count(), live_implicit.count()), (1, 1));
}
