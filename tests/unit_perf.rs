#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use loadgen::perf::PerformanceCounters;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn no_lost_increments_across_threads() {
    let counters = Arc::new(PerformanceCounters::default());
    let (k, m) = (8u64, 10_000u64);
    let handles: Vec<_> = (0..k)
        .map(|_| {
            let c = Arc::clone(&counters);
            thread::spawn(move || {
                for _ in 0..m {
                    c.record_attempt();
                    c.record_hit();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("join");
    }
    assert_eq!(counters.attempts(), k * m);
    assert_eq!(counters.hits(), k * m);
}

#[test]
fn rates_over_window() {
    let start = Instant::now();
    let counters = PerformanceCounters::starting_at(start);
    for _ in 0..40 {
        counters.record_attempt();
    }
    for _ in 0..10 {
        counters.record_hit();
    }
    let snap = counters.snapshot(start + Duration::from_secs(2));
    assert_eq!(snap.attempts, 40);
    assert_eq!(snap.hits, 10);
    assert!((snap.elapsed_seconds - 2.0).abs() < 1e-9);
    assert!((snap.throughput - 20.0).abs() < 1e-9);
    assert!((snap.hit_rate - 5.0).abs() < 1e-9);
}

#[test]
fn empty_window_reports_zero_rates() {
    let start = Instant::now();
    let counters = PerformanceCounters::starting_at(start);
    counters.record_attempt();
    let snap = counters.snapshot(start);
    assert_eq!(snap.elapsed_seconds, 0.0);
    assert_eq!(snap.throughput, 0.0);
    assert_eq!(snap.hit_rate, 0.0);
}

#[test]
fn reset_zeroes_and_restamps() {
    let start = Instant::now();
    let counters = PerformanceCounters::starting_at(start);
    counters.record_attempt();
    counters.record_hit();
    let later = start + Duration::from_secs(5);
    counters.reset_at(later);
    assert_eq!(counters.attempts(), 0);
    assert_eq!(counters.hits(), 0);
    assert_eq!(counters.window_start(), later);
    let snap = counters.snapshot(later + Duration::from_secs(1));
    assert!((snap.elapsed_seconds - 1.0).abs() < 1e-9);
    assert_eq!(snap.throughput, 0.0);
}

#[test]
fn reset_then_snapshot_has_zero_rates() {
    let counters = PerformanceCounters::default();
    counters.record_attempt();
    counters.reset();
    let snap = counters.snapshot(Instant::now());
    assert_eq!(snap.hit_rate, 0.0);
    assert_eq!(snap.throughput, 0.0);
}
