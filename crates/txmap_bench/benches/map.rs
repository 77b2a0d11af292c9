//! Transactional map benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use txmap_bench::utils::{populated_map, random_entries};
use txmap_core::TransactionalMap;

/// Benchmark direct writes with no transaction open.
fn bench_direct_put(c: &mut Criterion) {
    c.bench_function("direct_put", |b| {
        let map = TransactionalMap::new();
        let ctx = map.context();
        let mut rng = rand::thread_rng();

        b.iter(|| {
            let key: u64 = rng.gen();
            map.put(ctx, black_box(key), black_box(key));
        });
    });
}

/// Benchmark reads inside an open transaction.
fn bench_overlay_get(c: &mut Criterion) {
    c.bench_function("overlay_get", |b| {
        let map = populated_map(10_000);
        let ctx = map.context();
        map.start_transaction(ctx).unwrap();
        let mut rng = rand::thread_rng();

        b.iter(|| {
            let key = rng.gen_range(0..10_000u64);
            black_box(map.get(ctx, black_box(&key)));
        });
    });
}

/// Benchmark opening a transaction; dominated by the snapshot copy.
fn bench_start_transaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("start_transaction");

    for size in [100u64, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let map = populated_map(size);
            let ctx = map.context();

            b.iter(|| {
                map.start_transaction(black_box(ctx)).unwrap();
                map.rollback(ctx).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark committing batches of writes.
fn bench_commit_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_batch");

    for batch_size in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let map = populated_map(1_000);
                let ctx = map.context();
                let entries = random_entries(batch_size);

                b.iter(|| {
                    map.transaction(ctx, |tx| {
                        for (k, v) in &entries {
                            tx.put(*k, black_box(*v));
                        }
                        Ok(())
                    })
                    .unwrap();
                });
            },
        );
    }
    group.finish();
}

/// Benchmark transaction overhead (empty transaction).
fn bench_transaction_overhead(c: &mut Criterion) {
    c.bench_function("transaction_overhead", |b| {
        let map: TransactionalMap<u64, u64> = TransactionalMap::new();
        let ctx = map.context();

        b.iter(|| {
            map.transaction(ctx, |_tx| Ok(())).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_direct_put,
    bench_overlay_get,
    bench_start_transaction,
    bench_commit_batch,
    bench_transaction_overhead,
);
criterion_main!(benches);
