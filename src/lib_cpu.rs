#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

//! CPU and memory-bandwidth side of the load: worker threads that keep
//! overwriting randomly chosen buffers.

use anyhow::{Context, Result as AnyResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use crate::lib_mem::BufferPool;
use crate::perf::PerformanceCounters;

/// State every worker reads on each iteration.
pub struct WorkContext {
    pool: Arc<BufferPool>,
    counters: Arc<PerformanceCounters>,
    // Relaxed on purpose: a worker reading a stale bound just writes one more
    // time under the old one.
    random_range: AtomicUsize,
    sleep: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Random range is zero, nothing attempted.
    Idle,
    /// The chosen index was past the end of the pool.
    Miss,
    Hit,
}

impl WorkContext {
    #[must_use]
    pub fn new(pool: Arc<BufferPool>, counters: Arc<PerformanceCounters>, sleep: Duration) -> Self {
        Self {
            pool,
            counters,
            random_range: AtomicUsize::new(0),
            sleep,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    #[must_use]
    pub fn counters(&self) -> &Arc<PerformanceCounters> {
        &self.counters
    }

    #[must_use]
    pub fn random_range(&self) -> usize {
        self.random_range.load(Ordering::Relaxed)
    }

    pub fn set_random_range(&self, range: usize) {
        self.random_range.store(range, Ordering::Relaxed);
    }

    /// One write: pick an index below the random range, look it up, and fill
    /// the buffer with fresh random bytes if it is still resident.
    pub fn random_write<R: Rng>(&self, rng: &mut R) -> WriteOutcome {
        let range = self.random_range();
        if range == 0 {
            return WriteOutcome::Idle;
        }
        let index = rng.gen_range(0..range);
        self.counters.record_attempt();
        let Some(buffer) = self.pool.get(index) else {
            return WriteOutcome::Miss;
        };
        {
            let mut bytes = buffer.lock();
            rng.fill(&mut bytes[..]);
        }
        self.counters.record_hit();
        WriteOutcome::Hit
    }
}

/// Worker loop. Runs until `stop` is observed; a sleep already started
/// always completes first.
pub fn run_worker(ctx: &WorkContext, stop: &AtomicBool) {
    let mut rng = StdRng::from_entropy();
    while !stop.load(Ordering::Acquire) {
        let outcome = ctx.random_write(&mut rng);
        if !ctx.sleep.is_zero() {
            if stop.load(Ordering::Acquire) {
                break;
            }
            thread::sleep(ctx.sleep);
        } else if outcome == WriteOutcome::Idle {
            std::hint::spin_loop();
        }
    }
}

struct Worker {
    id: usize,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn stop_and_join(self) {
        self.stop.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            warn!(worker = self.id, "worker thread panicked");
        } else {
            debug!(worker = self.id, "worker stopped");
        }
    }
}

/// Resizable set of worker threads, scaled down most-recent-first.
pub struct WorkerPool {
    ctx: Arc<WorkContext>,
    workers: Vec<Worker>,
    next_id: usize,
}

impl WorkerPool {
    #[must_use]
    pub fn new(ctx: Arc<WorkContext>) -> Self {
        Self {
            ctx,
            workers: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Start or stop workers until exactly `target` are running. Each removed
    /// worker is joined before the next one is touched, so on return no
    /// removed worker can still access the buffer pool.
    ///
    /// # Errors
    /// Fails if a worker thread cannot be spawned; workers started before the
    /// failure keep running.
    pub fn scale_to(&mut self, target: usize) -> AnyResult<()> {
        while self.workers.len() < target {
            self.spawn_worker()?;
        }
        self.shrink_to(target);
        Ok(())
    }

    fn shrink_to(&mut self, target: usize) {
        while self.workers.len() > target {
            if let Some(worker) = self.workers.pop() {
                worker.stop_and_join();
            }
        }
    }

    fn spawn_worker(&mut self) -> AnyResult<()> {
        let id = self.next_id;
        let stop = Arc::new(AtomicBool::new(false));
        let ctx = Arc::clone(&self.ctx);
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("loadgen-worker-{id}"))
            .spawn(move || run_worker(&ctx, &flag))
            .with_context(|| format!("spawn worker {id}"))?;
        self.next_id += 1;
        self.workers.push(Worker { id, stop, handle });
        debug!(worker = id, "worker started");
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shrink_to(0);
    }
}
