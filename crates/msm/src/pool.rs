//! Fixed worker pool with barrier-synchronized broadcast
//!
//! Every call runs one closure per worker thread. Threads agree on their
//! share of the work through [`ThreadContext::range`] and meet at
//! [`ThreadContext::barrier`] between phases.

use std::ops::Range;
use std::sync::{Barrier, Mutex, OnceLock};

use dmsm_api::{validate, Error, Result};
use tracing::debug;

/// What a thread does in the serial steps between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Thread 0: runs prefix sums, allocation and the final combination
    Coordinator,
    /// Every other thread
    Worker,
}

/// `[n·id/T, n·(id+1)/T)`
#[inline]
pub fn partition_range(n: usize, id: usize, threads: usize) -> Range<usize> {
    let split = |i: usize| ((n as u128 * i as u128) / threads as u128) as usize;
    split(id)..split(id + 1)
}

/// Per-thread view of a broadcast
pub struct ThreadContext<'a> {
    id: usize,
    threads: usize,
    barrier: &'a Barrier,
}

impl<'a> ThreadContext<'a> {
    /// Thread index in `0..threads`
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of threads taking part
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Role of this thread
    #[inline]
    pub fn role(&self) -> Role {
        if self.id == 0 {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    /// True on the coordinator
    #[inline]
    pub fn is_main(&self) -> bool {
        self.role() == Role::Coordinator
    }

    /// This thread's share of `n` items
    #[inline]
    pub fn range(&self, n: usize) -> Range<usize> {
        partition_range(n, self.id, self.threads)
    }

    /// Block until every thread has reached the same barrier
    #[inline]
    pub fn barrier(&self) {
        self.barrier.wait();
    }

    /// Coordinator builds a value that every thread then reads.
    ///
    /// Contains one barrier. `slot` must be empty on entry and shared by all
    /// threads of the broadcast.
    pub fn broadcast_from_main<'s, T, F>(&self, slot: &'s OnceLock<T>, factory: F) -> Result<&'s T>
    where
        F: FnOnce() -> T,
    {
        if self.is_main() {
            slot.get_or_init(factory);
        }
        self.barrier();
        slot.get().ok_or_else(|| Error::Processing {
            operation: "broadcast_from_main",
            details: "coordinator did not publish a value",
        })
    }
}

/// Runs `op` on the calling thread as a one-thread broadcast
pub fn run_inline<R>(op: impl FnOnce(&ThreadContext<'_>) -> R) -> R {
    let barrier = Barrier::new(1);
    let ctx = ThreadContext {
        id: 0,
        threads: 1,
        barrier: &barrier,
    };
    op(&ctx)
}

/// A fixed set of worker threads shared by consecutive MSM calls
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    barrier: Barrier,
    lock: Mutex<()>,
    threads: usize,
}

impl WorkerPool {
    /// Spawn `threads` workers
    pub fn start(threads: usize) -> Result<Self> {
        validate::parameter(threads > 0, "threads", "worker pool needs at least one thread")?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dmsm-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool {
                details: e.to_string(),
            })?;
        debug!(threads, "worker pool started");
        Ok(Self {
            pool,
            barrier: Barrier::new(threads),
            lock: Mutex::new(()),
            threads,
        })
    }

    /// Pool sized to the available parallelism
    pub fn with_available_parallelism() -> Result<Self> {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::start(threads)
    }

    /// Number of worker threads
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `op` once on every worker and collect the results by thread id.
    ///
    /// Blocks the caller until all workers return. Concurrent calls are
    /// serialized so barrier generations never mix.
    pub fn run<R, F>(&self, op: F) -> Vec<R>
    where
        R: Send,
        F: Fn(&ThreadContext<'_>) -> R + Sync,
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.pool.broadcast(|bc| {
            let ctx = ThreadContext {
                id: bc.index(),
                threads: bc.num_threads(),
                barrier: &self.barrier,
            };
            op(&ctx)
        })
    }

    /// Tear the workers down
    pub fn stop(self) {
        debug!(threads = self.threads, "worker pool stopped");
        drop(self);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_partition_range_covers_exactly() {
        for n in [0usize, 1, 7, 64, 1000] {
            for threads in [1usize, 2, 3, 16] {
                let mut next = 0;
                for id in 0..threads {
                    let r = partition_range(n, id, threads);
                    assert_eq!(r.start, next);
                    next = r.end;
                }
                assert_eq!(next, n);
            }
        }
    }

    #[test]
    fn test_start_rejects_zero_threads() {
        assert!(matches!(
            WorkerPool::start(0),
            Err(Error::Parameter { .. })
        ));
    }

    #[test]
    fn test_run_collects_by_thread_id() {
        let pool = WorkerPool::start(4).unwrap();
        let ids = pool.run(|ctx| (ctx.id(), ctx.threads(), ctx.role()));
        assert_eq!(ids.len(), 4);
        for (i, (id, threads, role)) in ids.into_iter().enumerate() {
            assert_eq!(id, i);
            assert_eq!(threads, 4);
            assert_eq!(role == Role::Coordinator, i == 0);
        }
        pool.stop();
    }

    #[test]
    fn test_barrier_orders_phases() {
        let pool = WorkerPool::start(8).unwrap();
        let arrived = AtomicUsize::new(0);
        for _ in 0..3 {
            arrived.store(0, Ordering::SeqCst);
            let seen = pool.run(|ctx| {
                arrived.fetch_add(1, Ordering::SeqCst);
                ctx.barrier();
                arrived.load(Ordering::SeqCst)
            });
            assert!(seen.iter().all(|&s| s == 8));
        }
    }

    #[test]
    fn test_broadcast_from_main() {
        let pool = WorkerPool::start(3).unwrap();
        let slot = OnceLock::new();
        let values = pool.run(|ctx| {
            *ctx.broadcast_from_main(&slot, || vec![1u32, 2, 3]).unwrap() == vec![1, 2, 3]
        });
        assert_eq!(values, vec![true; 3]);
    }

    #[test]
    fn test_run_inline() {
        let out = run_inline(|ctx| {
            let slot = OnceLock::new();
            ctx.barrier();
            let v = *ctx.broadcast_from_main(&slot, || 11).unwrap();
            (ctx.is_main(), ctx.range(10), v)
        });
        assert_eq!(out, (true, 0..10, 11));
    }
}
