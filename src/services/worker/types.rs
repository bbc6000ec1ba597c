//! Worker counters, latency tracking, and shutdown signaling.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Monotonic counters shared across in-flight rows.
#[derive(Debug, Default)]
pub struct WorkerCounters {
    processed: AtomicU64,
    failed: AtomicU64,
    frontier_enqueued: AtomicU64,
    frontier_new: AtomicU64,
}

impl WorkerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment processed and return the new total.
    pub fn incr_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn incr_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_frontier_enqueued(&self) {
        self.frontier_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_frontier_new(&self) {
        self.frontier_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn frontier_enqueued(&self) -> u64 {
        self.frontier_enqueued.load(Ordering::Relaxed)
    }

    pub fn frontier_new(&self) -> u64 {
        self.frontier_new.load(Ordering::Relaxed)
    }
}

/// Latency summary over the worker's lifetime samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub avg_ms: f64,
    pub p95_ms: f64,
}

/// Collected per-row wall times in milliseconds.
#[derive(Debug, Default)]
pub struct LatencyWindow {
    samples: Mutex<Vec<f64>>,
}

impl LatencyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample; a poisoned lock drops the sample rather than
    /// taking down the worker.
    pub fn record(&self, elapsed_ms: f64) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.push(elapsed_ms);
        }
    }

    /// Summarize recorded samples; empty or unreadable windows report zeros.
    pub fn summary(&self) -> LatencySummary {
        let samples = match self.samples.lock() {
            Ok(samples) => samples,
            Err(_) => {
                return LatencySummary {
                    avg_ms: 0.0,
                    p95_ms: 0.0,
                }
            }
        };
        if samples.is_empty() {
            return LatencySummary {
                avg_ms: 0.0,
                p95_ms: 0.0,
            };
        }
        let avg_ms = samples.iter().sum::<f64>() / samples.len() as f64;
        let mut ordered = samples.clone();
        ordered.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = (0.95 * (ordered.len() - 1) as f64) as usize;
        LatencySummary {
            avg_ms,
            p95_ms: ordered[idx],
        }
    }
}

/// Cooperative shutdown flag set by signal handlers and observed by the
/// control loop between rows.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_summary_empty() {
        let window = LatencyWindow::new();
        let summary = window.summary();
        assert_eq!(summary.avg_ms, 0.0);
        assert_eq!(summary.p95_ms, 0.0);
    }

    #[test]
    fn test_latency_summary_values() {
        let window = LatencyWindow::new();
        for ms in [10.0, 20.0, 30.0, 40.0] {
            window.record(ms);
        }
        let summary = window.summary();
        assert_eq!(summary.avg_ms, 25.0);
        // index 0.95 * 3 = 2.85 -> 2
        assert_eq!(summary.p95_ms, 30.0);
    }

    #[test]
    fn test_latency_p95_unsorted_input() {
        let window = LatencyWindow::new();
        for ms in [500.0, 5.0, 100.0] {
            window.record(ms);
        }
        assert_eq!(window.summary().p95_ms, 100.0);
    }

    #[test]
    fn test_counters_increment() {
        let counters = WorkerCounters::new();
        assert_eq!(counters.incr_processed(), 1);
        assert_eq!(counters.incr_processed(), 2);
        counters.incr_failed();
        counters.incr_frontier_enqueued();
        counters.incr_frontier_new();
        assert_eq!(counters.processed(), 2);
        assert_eq!(counters.failed(), 1);
        assert_eq!(counters.frontier_enqueued(), 1);
        assert_eq!(counters.frontier_new(), 1);
    }

    #[test]
    fn test_shutdown_flag_shared() {
        let flag = ShutdownFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_set());
        flag.trigger();
        assert!(observer.is_set());
    }
}
