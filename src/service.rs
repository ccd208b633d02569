#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use anyhow::Result as AnyResult;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::domain::PerfReport;
use crate::lib_cpu::{WorkContext, WorkerPool};
use crate::lib_mem::BufferPool;
use crate::metrics::{gauge_value, Metrics};
use crate::perf::{PerfSnapshot, PerformanceCounters};

/// Front door for every structural change. Cheap to clone; clones share the
/// same pools.
#[derive(Clone)]
pub struct LoadController {
    ctx: Arc<WorkContext>,
    // Also serializes memory resizes, so one structural change runs at a time.
    workers: Arc<Mutex<WorkerPool>>,
    metrics: Metrics,
}

fn clamp_target(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

impl LoadController {
    pub fn new(sleep: Duration, buffer_size: usize) -> AnyResult<Self> {
        let metrics = Metrics::new()?;
        metrics.buffer_size_bytes.set(gauge_value(buffer_size));
        let ctx = Arc::new(WorkContext::new(
            Arc::new(BufferPool::new(buffer_size)),
            Arc::new(PerformanceCounters::default()),
            sleep,
        ));
        let workers = Arc::new(Mutex::new(WorkerPool::new(Arc::clone(&ctx))));
        Ok(Self {
            ctx,
            workers,
            metrics,
        })
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.ctx.pool().size()
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    #[must_use]
    pub fn random_range(&self) -> usize {
        self.ctx.random_range()
    }

    /// Grow or shrink the buffer pool one buffer at a time until it holds
    /// `max(n, 0)` buffers, then ask for spare memory back.
    pub fn set_memory_target(&self, n: i64) {
        let target = clamp_target(n);
        let _guard = self.workers.lock();
        let pool = self.ctx.pool();
        let before = pool.size();
        while pool.size() < target {
            pool.grow();
        }
        while pool.size() > target {
            pool.shrink();
        }
        pool.reclaim();
        self.metrics.buffers.set(gauge_value(pool.size()));
        info!(
            before,
            target,
            resident_bytes = pool.resident_bytes(),
            "memory target reached"
        );
    }

    /// Start or stop workers until `max(n, 0)` are running. Blocks until every
    /// removed worker has exited.
    ///
    /// # Errors
    /// Fails if a worker thread cannot be spawned.
    pub fn set_worker_target(&self, n: i64) -> AnyResult<()> {
        let target = clamp_target(n);
        let mut workers = self.workers.lock();
        let before = workers.len();
        let res = workers.scale_to(target);
        self.metrics.workers.set(gauge_value(workers.len()));
        info!(before, target, running = workers.len(), "worker target applied");
        res
    }

    pub fn set_random_range(&self, n: i64) {
        let range = clamp_target(n);
        self.ctx.set_random_range(range);
        self.metrics.random_range.set(gauge_value(range));
        info!(range, "random range set");
    }

    pub fn reset_stats(&self) {
        self.ctx.counters().reset();
        self.metrics.stats_resets_total.inc();
        info!("performance window reset");
    }

    #[must_use]
    pub fn snapshot(&self) -> PerfSnapshot {
        self.ctx.counters().snapshot(Instant::now())
    }

    #[must_use]
    pub fn report(&self) -> PerfReport {
        PerfReport {
            buffers: self.buffer_count(),
            workers: self.worker_count(),
            random_range: self.random_range(),
            snapshot: self.snapshot(),
        }
    }

    /// Stop every worker, then release every buffer.
    ///
    /// # Errors
    /// Never fails in practice; scaling down does not spawn threads.
    pub fn shutdown(&self) -> AnyResult<()> {
        self.set_worker_target(0)?;
        self.set_memory_target(0);
        info!("shutdown complete");
        Ok(())
    }
}
