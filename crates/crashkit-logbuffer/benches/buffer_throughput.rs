//! Insertion and enumeration benchmarks for the priority log buffer.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use crashkit_logbuffer::prelude::*;
use std::hint::black_box;

fn full_buffer(total: usize) -> PriorityLogBuffer {
    let mut buffer = PriorityLogBuffer::with_limits([total / 10; Severity::COUNT], total);
    for clock in 0..total {
        let severity = Severity::ALL
            .get(clock % Severity::COUNT)
            .copied()
            .unwrap_or(Severity::Other);
        buffer.add(LogEntry::new(i64::try_from(clock).unwrap_or(i64::MAX), severity, "seed"));
    }
    buffer
}

fn bench_add_at_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_at_capacity");

    for total in [100usize, 1000, 10_000] {
        let mut buffer = full_buffer(total);
        let mut clock = 0i64;
        group.bench_with_input(BenchmarkId::from_parameter(total), &total, |b, _| {
            b.iter(|| {
                clock += 1;
                black_box(buffer.add(LogEntry::new(clock, Severity::Verbose, "bench")))
            });
        });
    }

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let buffer = full_buffer(1000).with_merge_key(MergeKey::Clock);

    c.bench_function("iterate_1000", |b| {
        b.iter(|| black_box(buffer.iter().count()));
    });
}

fn bench_shared_add(c: &mut Criterion) {
    let shared = SharedLogBuffer::new(full_buffer(1000));
    let mut clock = 0i64;

    c.bench_function("shared_add", |b| {
        b.iter(|| {
            clock += 1;
            black_box(shared.add(LogEntry::new(clock, Severity::Info, "bench")))
        });
    });
}

criterion_group!(benches, bench_add_at_capacity, bench_iterate, bench_shared_add);
criterion_main!(benches);
