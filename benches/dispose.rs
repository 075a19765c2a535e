use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use disposable_base::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_explicit_dispose(c: &mut Criterion) {
    c.bench_function("explicit_dispose_empty_probe", |b| {
        b.iter_batched(
            || Disposable::new(DisposableProbe::empty()),
            |mut resource| {
                black_box(resource.dispose()).unwrap();
                resource
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_finalize_on_drop(c: &mut Criterion) {
    let counter = CallCounter::new();

    c.bench_function("finalize_on_drop_counted", |b| {
        b.iter_batched(
            || Disposable::new(DisposableProbe::empty().on_implicit(counter.incrementer())),
            drop,
            BatchSize::SmallInput,
        )
    });
}

fn bench_redundant_dispose(c: &mut Criterion) {
    let mut resource = Disposable::new(DisposableProbe::empty());
    resource.dispose().unwrap();

    c.bench_function("redundant_dispose_noop", |b| {
        b.iter(|| black_box(resource.dispose()).unwrap())
    });
}

fn bench_observed_dispose(c: &mut Criterion) {
    struct NullObserver;
    impl DisposeObserver for NullObserver {}

    let observer: Arc<dyn DisposeObserver> = Arc::new(NullObserver);

    c.bench_function("explicit_dispose_observed", |b| {
        b.iter_batched(
            || Disposable::new(DisposableProbe::empty()).observe(observer.clone()),
            |mut resource| {
                black_box(resource.dispose()).unwrap();
                resource
            },
            BatchSize::SmallInput,
        )
    });
}

// ===== Tracker Benchmarks =====

fn bench_tracker_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_collect");

    for count in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let tracker = DisposeTracker::new();
                    let mut kept = Vec::with_capacity(count / 2);
                    for i in 0..count {
                        let handle = tracker.track(DisposableProbe::empty());
                        if i % 2 == 0 {
                            kept.push(handle);
                        }
                    }
                    (tracker, kept)
                },
                |(tracker, kept)| {
                    black_box(tracker.collect().unwrap());
                    (tracker, kept)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_tracker_dispose_all(c: &mut Criterion) {
    c.bench_function("tracker_dispose_all_100", |b| {
        b.iter_batched(
            || {
                let tracker = DisposeTracker::new();
                for _ in 0..100 {
                    drop(tracker.track(DisposableProbe::empty()));
                }
                tracker
            },
            |tracker| {
                black_box(tracker.dispose_all().unwrap());
                tracker
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_explicit_dispose,
    bench_finalize_on_drop,
    bench_redundant_dispose,
    bench_observed_dispose,
    bench_tracker_collect,
    bench_tracker_dispose_all
);
criterion_main!(benches);
