//! Scoped worker pool over a [`JobQueue`].

use std::io;
use std::sync::mpsc;
use std::thread;

use crate::config::ConfigError;
use crate::control::CancelToken;
use crate::job::Job;
use crate::queue::JobQueue;
use crate::worker::work;

/// The pool could not run at all. Per-job failures are never reported here.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start any worker thread")]
    Spawn(#[source] io::Error),
}

/// Everything the workers returned, plus how many of them panicked.
#[derive(Debug)]
pub struct PoolOutput<T> {
    /// Per-job results in completion order.
    pub results: Vec<T>,
    pub panics: usize,
}

/// Start up to `worker_count` threads (never more than there are jobs), each
/// running the worker loop with `f(worker, index, job)` per claimed job, and
/// join them all before returning.
///
/// A panicking worker is counted; the others keep draining the queue.
pub fn run_pool<T, F>(
    queue: &JobQueue,
    worker_count: usize,
    cancel: &CancelToken,
    f: F,
) -> Result<PoolOutput<T>, ScheduleError>
where
    T: Send,
    F: Fn(usize, usize, &Job) -> T + Sync,
{
    if worker_count < 1 {
        return Err(ConfigError::InvalidWorkerCount(worker_count).into());
    }
    let threads = worker_count.min(queue.len());
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        let f = &f;
        let mut handles = Vec::with_capacity(threads);
        let mut spawn_error = None;
        for worker in 0..threads {
            let tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("mfc-worker-{}", worker))
                .spawn_scoped(s, move || {
                    work(worker, queue, cancel, |index, job| {
                        let _ = tx.send(f(worker, index, job));
                    })
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(worker, error = %e, "could not spawn worker thread");
                    spawn_error.get_or_insert(e);
                }
            }
        }
        drop(tx);
        if handles.is_empty() {
            if let Some(e) = spawn_error {
                return Err(ScheduleError::Spawn(e));
            }
        }

        // Results arrive as jobs finish; the channel closes once every worker has exited.
        let results: Vec<T> = rx.iter().collect();
        let mut panics = 0;
        for handle in handles {
            if handle.join().is_err() {
                panics += 1;
                tracing::error!("worker thread panicked");
            }
        }
        Ok(PoolOutput { results, panics })
    })
}
