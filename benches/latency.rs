use std::hint::black_box;
use std::sync::Arc;

use conflate_core::backing_queue::MpmcQueue;
use conflate_core::entry::EvictEntry;
use conflate_core::index::DynamicKeyIndex;
use conflate_core::queue::evict::{EvictAppender, EvictPoller};
use conflate_core::EvictConflationQueue;
use criterion::{criterion_group, criterion_main, Criterion};

fn queue() -> EvictConflationQueue<
    u32,
    u64,
    DynamicKeyIndex<u32, EvictEntry<u64>>,
    MpmcQueue<(u32, Arc<EvictEntry<u64>>)>,
> {
    EvictConflationQueue::new(DynamicKeyIndex::new(), MpmcQueue::with_capacity(4096))
}

fn warmed_appender_poller_roundtrip(c: &mut Criterion) {
    let q = queue();
    let mut appender = EvictAppender::new();
    let mut poller = EvictPoller::new();

    // First call allocates the scratch marker; warm it up before measuring
    // so the benchmark reflects steady-state, allocation-free round trips.
    q.enqueue(&mut appender, 0, 0).unwrap();
    q.poll(&mut poller, None);

    c.bench_function("evict_enqueue_poll_round_trip_warm", |b| {
        b.iter(|| {
            q.enqueue(&mut appender, black_box(1), black_box(42)).unwrap();
            black_box(q.poll(&mut poller, None));
        });
    });
}

fn repeat_key_conflation_latency(c: &mut Criterion) {
    let q = queue();
    let mut appender = EvictAppender::new();

    c.bench_function("evict_conflating_enqueue_same_key", |b| {
        b.iter(|| {
            q.enqueue(&mut appender, black_box(7), black_box(1)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    warmed_appender_poller_roundtrip,
    repeat_key_conflation_latency
);
criterion_main!(benches);
