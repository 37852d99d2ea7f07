use std::ops::Range;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{ConfigError, ConfigResult};

/// Count of detached tasks still running, with a condvar to wait on zero.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn start(&self) {
        *self.count.lock() += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.drained.wait(&mut count);
        }
    }
}

/// Decrements the pending count even if the task panics.
struct FinishGuard(Arc<Pending>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Fixed pool of worker threads, spawned once.
///
/// Two ways to hand it work:
/// - [`submit`](Self::submit) + [`barrier_wait`](Self::barrier_wait) for
///   detached `'static` tasks.
/// - [`batch`](Self::batch) for tasks that borrow from the caller's stack;
///   the call returns only after every task in the batch has finished.
///
/// Either way, writes made inside a task are visible to the caller once the
/// wait returns.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
    pending: Arc<Pending>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> ConfigResult<Self> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("swarm-worker-{i}"))
            .build()?;
        log::info!("worker pool started with {} threads", workers);
        Ok(Self {
            pool,
            workers,
            pending: Arc::new(Pending::default()),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue a detached task. No ordering between independently submitted tasks.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pending.start();
        let guard = FinishGuard(Arc::clone(&self.pending));
        self.pool.spawn(move || {
            let _guard = guard;
            task();
        });
    }

    /// Block until every task submitted before this call has completed.
    pub fn barrier_wait(&self) {
        self.pending.wait();
    }

    /// Run a batch of borrowing tasks and wait for all of them.
    pub fn batch<'scope, F>(&self, build: F)
    where
        F: FnOnce(&TaskBatch<'_, 'scope>) + Send,
    {
        self.pool.scope(|scope| build(&TaskBatch { scope }));
    }

    /// Split `[0, n)` into one contiguous range per worker and run `f(start, end)`
    /// on each, waiting for all of them.
    pub fn dispatch<F>(&self, n: usize, f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        let f = &f;
        let workers = self.workers;
        self.batch(move |batch| {
            for range in split_range(n, workers) {
                batch.submit(move || f(range.start, range.end));
            }
        });
    }

    /// Like [`dispatch`](Self::dispatch), but hands each task exclusive access
    /// to its own sub-slice. `f` receives the sub-slice's start index.
    pub fn dispatch_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let f = &f;
        let n = items.len();
        let workers = self.workers;
        self.batch(move |batch| {
            let mut rest = items;
            for range in split_range(n, workers) {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                batch.submit(move || f(range.start, chunk));
            }
        });
    }
}

/// Handle for submitting tasks inside [`WorkerPool::batch`].
pub struct TaskBatch<'a, 'scope> {
    scope: &'a rayon::Scope<'scope>,
}

impl<'scope> TaskBatch<'_, 'scope> {
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        self.scope.spawn(move |_| task());
    }
}

/// Split `[0, n)` into `parts` contiguous ranges whose lengths differ by at most one.
pub fn split_range(n: usize, parts: usize) -> impl Iterator<Item = Range<usize>> {
    let parts = parts.max(1);
    (0..parts).map(move |i| (i * n / parts)..((i + 1) * n / parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(ConfigError::NoWorkers)));
    }

    #[test]
    fn split_covers_range_without_gaps() {
        let ranges: Vec<_> = split_range(10, 4).collect();
        assert_eq!(ranges, vec![0..2, 2..5, 5..7, 7..10]);

        let ranges: Vec<_> = split_range(2, 4).collect();
        assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), 2);
        assert_eq!(ranges.last().map(|r| r.end), Some(2));
    }

    #[test]
    fn barrier_waits_for_submitted_tasks() {
        let pool = WorkerPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..64 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                std::thread::sleep(std::time::Duration::from_micros(200));
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
        pool.barrier_wait();
        assert_eq!(counter.load(Ordering::Relaxed), 64);
        // A second wait with nothing queued returns immediately.
        pool.barrier_wait();
    }

    #[test]
    fn dispatch_visits_every_index_once() {
        let pool = WorkerPool::new(4).unwrap();
        let hits: Vec<AtomicUsize> = (0..103).map(|_| AtomicUsize::new(0)).collect();
        pool.dispatch(hits.len(), |start, end| {
            for hit in &hits[start..end] {
                hit.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn dispatch_mut_writes_disjoint_chunks() {
        let pool = WorkerPool::new(3).unwrap();
        let mut values = vec![0usize; 50];
        pool.dispatch_mut(&mut values, |start, chunk| {
            for (offset, value) in chunk.iter_mut().enumerate() {
                *value = start + offset;
            }
        });
        assert_eq!(values, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn batch_borrows_from_caller() {
        let pool = WorkerPool::new(2).unwrap();
        let mut left = vec![1, 2, 3];
        let mut right = vec![4, 5, 6];
        pool.batch(|batch| {
            let l = &mut left;
            let r = &mut right;
            batch.submit(move || l.iter_mut().for_each(|v| *v *= 10));
            batch.submit(move || r.iter_mut().for_each(|v| *v += 1));
        });
        assert_eq!(left, vec![10, 20, 30]);
        assert_eq!(right, vec![5, 6, 7]);
    }
}
