//! Criterion benchmarks for pulsar-core primitives
//!
//! Run with: cargo bench -p pulsar-core
#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pulsar_core::{Debouncer, Edge, EdgeLatch};

fn bench_debouncer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Debouncer");

    group.bench_function("process_bounce_train", |b| {
        let debouncer = Debouncer::new();
        let mut t = 0u64;
        b.iter(|| {
            t += 97;
            let edge = if t % 3 == 0 { Edge::Rising } else { Edge::Falling };
            black_box(debouncer.process(black_box(edge), t));
        });
    });

    group.bench_function("value", |b| {
        let debouncer = Debouncer::new();
        debouncer.process(Edge::Rising, 0);
        let mut t = 0u64;
        b.iter(|| {
            t += 10;
            black_box(debouncer.value(t));
        });
    });

    group.finish();
}

fn bench_latch(c: &mut Criterion) {
    c.bench_function("EdgeLatch/record_take", |b| {
        let latch = EdgeLatch::new();
        b.iter(|| {
            latch.record(black_box(true));
            black_box(latch.take());
        });
    });
}

criterion_group!(benches, bench_debouncer, bench_latch);
criterion_main!(benches);
