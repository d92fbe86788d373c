//! Stress helpers for WireDB.
//!
//! These drive the atomic counter and the codec from many threads at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wiredb_core::{Number, SegmentCodec};

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
    #[allow(clippy::cast_precision_loss)]
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
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 8,
        }
    }
}

/// Increments `number` from every thread; each increment counts as a success.
pub fn stress_counter_increments(number: &Arc<Number>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let number = Arc::clone(number);
            let ops = config.operations;
            thread::spawn(move || {
                for _ in 0..ops {
                    number.increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(config.threads * config.operations, 0, start.elapsed())
}

/// Adds one to `number` through compare-and-swap retry loops.
///
/// A lost race counts as a failure; each thread retries until it has
/// landed `config.operations` swaps.
pub fn stress_counter_cas(number: &Arc<Number>, config: &StressConfig) -> StressTestResult {
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let number = Arc::clone(number);
            let failed = Arc::clone(&failed);
            let ops = config.operations;
            thread::spawn(move || {
                let mut landed = 0;
                while landed < ops {
                    let current = number.get();
                    if number.compare_and_swap(current, current.wrapping_add(1)) {
                        landed += 1;
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        config.threads * config.operations,
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Builds, encodes and parses segments from every thread on one shared codec.
pub fn stress_concurrent_builds(codec: &SegmentCodec, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let ops = config.operations;
            scope.spawn(move || {
                for i in 0..ops {
                    let key = format!("t{t}:k{i}");
                    let value = Number::new(i64::try_from(i).unwrap_or(i64::MAX));
                    let ok = codec
                        .build_live(&key, &value, 0)
                        .and_then(|segment| codec.parse(&segment.encode()))
                        .and_then(|parsed| codec.to_number(&parsed))
                        .is_ok_and(|n| n == value);
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StressConfig {
        StressConfig {
            operations: 2_000,
            threads: 4,
        }
    }

    #[test]
    fn increments_are_not_lost() {
        let number = Arc::new(Number::new(0));
        let result = stress_counter_increments(&number, &small());
        assert_eq!(result.total_ops, 8_000);
        assert_eq!(number.get(), 8_000);
    }

    #[test]
    fn cas_loops_land_every_swap() {
        let number = Arc::new(Number::new(0));
        let result = stress_counter_cas(&number, &small());
        assert_eq!(result.successful_ops, 8_000);
        assert_eq!(number.get(), 8_000);
    }

    #[test]
    fn shared_codec_builds_concurrently() {
        let codec = SegmentCodec::identity();
        let result = stress_concurrent_builds(&codec, &small());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 8_000);
    }
}
