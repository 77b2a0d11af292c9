//! Stress tests for txmap.
//!
//! These harnesses hammer one shared map from many threads, each thread
//! acting as its own calling context.

use crate::fixtures::NumericMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform, split across threads.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Keys written per transaction.
    pub batch_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            batch_size: 8,
        }
    }
}

#[derive(Default)]
struct Tally {
    successful: AtomicUsize,
    failed: AtomicUsize,
}

impl Tally {
    fn record(&self, ok: bool) {
        if ok {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn finish(&self, start: Instant) -> StressTestResult {
        StressTestResult::new(
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

fn run_threads<F>(threads: usize, body: F)
where
    F: Fn(usize) + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let body = Arc::clone(&body);
            thread::spawn(move || body(t))
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}

/// Commits transactions from every thread, each writing its own keys.
///
/// Every thread writes a disjoint key range, so afterwards the map must hold
/// exactly `operations` keys (rounded down to whole batches per thread).
/// An operation is one committed transaction.
pub fn stress_concurrent_commits(map: Arc<NumericMap>, config: &StressConfig) -> StressTestResult {
    let tally = Arc::new(Tally::default());
    let threads = config.threads.max(1);
    let batch_size = config.batch_size.max(1);
    let txns_per_thread = config.operations / threads / batch_size;
    let start = Instant::now();

    let shared = Arc::clone(&tally);
    run_threads(threads, move |t| {
        let ctx = map.context();
        for txn in 0..txns_per_thread {
            let ok = map.start_transaction(ctx).is_ok() && {
                for i in 0..batch_size {
                    let key = ((t * txns_per_thread + txn) * batch_size + i) as u64;
                    map.put(ctx, key, key);
                }
                map.commit(ctx).is_ok()
            };
            shared.record(ok);
        }
    });

    tally.finish(start)
}

/// Interleaves direct writes with transactional commits.
///
/// Even threads write directly, odd threads commit transactions; all on
/// disjoint keys. Nothing may be lost. An operation is one put.
pub fn stress_direct_and_transactional(
    map: Arc<NumericMap>,
    config: &StressConfig,
) -> StressTestResult {
    let tally = Arc::new(Tally::default());
    let threads = config.threads.max(1);
    let ops_per_thread = config.operations / threads;
    let batch_size = config.batch_size.max(1);
    let start = Instant::now();

    let shared = Arc::clone(&tally);
    run_threads(threads, move |t| {
        let ctx = map.context();
        let base = (t * ops_per_thread) as u64;

        if t % 2 == 0 {
            for i in 0..ops_per_thread as u64 {
                map.put(ctx, base + i, i);
                shared.record(map.get(ctx, &(base + i)) == Some(i));
            }
            return;
        }

        let indices: Vec<u64> = (0..ops_per_thread as u64).collect();
        for chunk in indices.chunks(batch_size) {
            if map.start_transaction(ctx).is_err() {
                chunk.iter().for_each(|_| shared.record(false));
                continue;
            }
            for &i in chunk {
                map.put(ctx, base + i, i);
            }
            let committed = map.commit(ctx).is_ok();
            for &i in chunk {
                shared.record(committed && map.get(ctx, &(base + i)) == Some(i));
            }
        }
    });

    tally.finish(start)
}

/// Writes and rolls back from every thread.
///
/// After each rollback the thread checks that none of its writes reached
/// the shared store. An operation is one rolled-back transaction.
pub fn stress_rollbacks(map: Arc<NumericMap>, config: &StressConfig) -> StressTestResult {
    let tally = Arc::new(Tally::default());
    let threads = config.threads.max(1);
    let txns_per_thread = config.operations / threads;
    let batch_size = config.batch_size;
    let start = Instant::now();

    let shared = Arc::clone(&tally);
    run_threads(threads, move |t| {
        let ctx = map.context();
        let base = (t * batch_size) as u64 + 1_000_000;

        for _ in 0..txns_per_thread {
            let opened = map.start_transaction(ctx).is_ok();
            for i in 0..batch_size as u64 {
                map.put(ctx, base + i, i);
            }
            let rolled_back = opened && map.rollback(ctx).is_ok();
            let leaked = (0..batch_size as u64).any(|i| map.contains_key(ctx, &(base + i)));
            shared.record(rolled_back && !leaked);
        }
    });

    tally.finish(start)
}

/// Checks that readers never observe half of a commit.
///
/// Writer threads repeatedly commit `{0: n, 1: n}` in one transaction.
/// Reader threads take whole-store copies and count any copy where the two
/// keys disagree as a failure. An operation is one commit or one read.
pub fn stress_atomic_visibility(map: Arc<NumericMap>, config: &StressConfig) -> StressTestResult {
    let tally = Arc::new(Tally::default());
    let threads = config.threads.max(1);
    let ops_per_thread = config.operations / threads;
    let start = Instant::now();

    let seed = map.context();
    map.put(seed, 0, 0);
    map.put(seed, 1, 0);

    let shared = Arc::clone(&tally);
    run_threads(threads, move |t| {
        let ctx = map.context();
        for n in 0..ops_per_thread as u64 {
            if t % 2 == 0 {
                let ok = map.start_transaction(ctx).is_ok() && {
                    map.put(ctx, 0, n);
                    map.put(ctx, 1, n);
                    map.commit(ctx).is_ok()
                };
                shared.record(ok);
            } else {
                let view = map.to_map(ctx);
                shared.record(view.get(&0) == view.get(&1));
            }
        }
    });

    tally.finish(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shared_map;
    use txmap_core::Config;

    #[test]
    fn test_concurrent_commits() {
        let map = shared_map(Config::default());
        let config = StressConfig {
            operations: 1_600,
            threads: 4,
            batch_size: 8,
        };

        let result = stress_concurrent_commits(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200);

        let ctx = map.context();
        assert_eq!(map.len(ctx), 1_600);
        assert_eq!(map.committed_seq().as_u64(), 200);
    }

    #[test]
    fn test_direct_and_transactional() {
        let map = shared_map(Config::default());
        let config = StressConfig {
            operations: 2_000,
            threads: 4,
            batch_size: 10,
        };

        let result = stress_direct_and_transactional(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 2_000);
        assert_eq!(map.len(map.context()), 2_000);
    }

    #[test]
    fn test_rollbacks() {
        let map = shared_map(Config::default());
        let config = StressConfig {
            operations: 400,
            threads: 4,
            batch_size: 4,
        };

        let result = stress_rollbacks(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert!(map.is_empty(map.context()));
        assert_eq!(map.stats().transactions_rolled_back(), 400);
    }

    #[test]
    fn test_atomic_visibility() {
        let map = shared_map(Config::default());
        let config = StressConfig {
            operations: 2_000,
            threads: 4,
            ..Default::default()
        };

        let result = stress_atomic_visibility(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(map.active_transactions(), 0);
    }

    #[test]
    fn test_zero_threads_and_batch_are_clamped() {
        let config = StressConfig {
            operations: 64,
            threads: 0,
            batch_size: 0,
        };

        let map = shared_map(Config::default());
        let result = stress_concurrent_commits(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 64);
        assert_eq!(map.len(map.context()), 64);

        let map = shared_map(Config::default());
        let result = stress_direct_and_transactional(Arc::clone(&map), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(map.len(map.context()), 64);

        let result = stress_rollbacks(shared_map(Config::default()), &config);
        assert_eq!(result.failed_ops, 0);

        let result = stress_atomic_visibility(shared_map(Config::default()), &config);
        assert_eq!(result.failed_ops, 0);
    }
}
