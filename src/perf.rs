#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Write counters shared by every worker.
///
/// Increments are lock-free. `reset` is not synchronized with in-flight
/// increments, so an increment racing a reset may be lost.
#[derive(Debug)]
pub struct PerformanceCounters {
    attempts: AtomicU64,
    hits: AtomicU64,
    epoch: Instant,
    // Window start, as nanoseconds after `epoch`.
    window_start: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PerfSnapshot {
    pub attempts: u64,
    pub hits: u64,
    pub hit_rate: f64,
    pub throughput: f64,
    pub elapsed_seconds: f64,
}

impl Default for PerformanceCounters {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl PerformanceCounters {
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            attempts: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            epoch: start,
            window_start: AtomicU64::new(0),
        }
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.reset_at(Instant::now());
    }

    /// Zero both counters and open a new window at `now`.
    pub fn reset_at(&self, now: Instant) {
        let offset = now.saturating_duration_since(self.epoch).as_nanos();
        self.window_start
            .store(u64::try_from(offset).unwrap_or(u64::MAX), Ordering::Relaxed);
        self.attempts.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn window_start(&self) -> Instant {
        self.epoch + Duration::from_nanos(self.window_start.load(Ordering::Relaxed))
    }

    /// Rates per second over the current window. A window of zero length
    /// reports zero rates.
    #[must_use]
    pub fn snapshot(&self, now: Instant) -> PerfSnapshot {
        let elapsed_seconds = now.saturating_duration_since(self.window_start()).as_secs_f64();
        let attempts = self.attempts();
        let hits = self.hits();
        let rate = |count: u64| {
            if elapsed_seconds > 0.0 {
                #[allow(clippy::cast_precision_loss)]
                let count = count as f64;
                count / elapsed_seconds
            } else {
                0.0
            }
        };
        PerfSnapshot {
            attempts,
            hits,
            hit_rate: rate(hits),
            throughput: rate(attempts),
            elapsed_seconds,
        }
    }
}
