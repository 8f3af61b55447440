//! Job scheduler.
//!
//! Fans a job list out to a fixed pool of worker threads. Distribution is
//! dynamic: an idle worker claims the next job from the shared queue, so fast
//! workers end up running more jobs than slow ones. Threads are created fresh
//! per run inside a scope and all are joined before the run returns.

mod pool;
mod summary;

pub use pool::{run_pool, PoolOutput, ScheduleError};
pub use summary::RunSummary;

use std::io::Write;
use std::time::Instant;

use crate::job::Job;
use crate::queue::JobQueue;
use crate::worker::{execute, RunContext};

/// Run `jobs` on `worker_count` threads and block until every worker has exited.
///
/// `worker_count` of zero is rejected before any job starts. Per-job
/// failures are logged and recorded in the summary; they never stop the run.
pub fn spawn<W: Write + Send>(
    jobs: Vec<Job>,
    worker_count: usize,
    ctx: &RunContext<'_, W>,
) -> Result<RunSummary, ScheduleError> {
    let total = jobs.len();
    let queue = JobQueue::new(jobs);
    tracing::info!(
        jobs = total,
        workers = worker_count,
        backend = ctx.backend.name(),
        chunk_size = ctx.chunk_size,
        "run starting"
    );

    let started = Instant::now();
    let pool = run_pool(&queue, worker_count, &ctx.cancel, |worker, index, job| {
        execute(index, job, worker, ctx)
    })?;
    let elapsed = started.elapsed();

    if pool.panics > 0 {
        ctx.logger
            .error(&format!("{} worker thread(s) panicked", pool.panics));
    }

    let mut reports = pool.results;
    reports.sort_by_key(|r| r.index);
    let summary = RunSummary {
        total,
        reports,
        worker_panics: pool.panics,
        elapsed,
    };
    tracing::info!(
        completed = summary.completed(),
        failed = summary.failed(),
        unclaimed = summary.unclaimed(),
        elapsed_ms = summary.elapsed_ms(),
        "run finished"
    );
    Ok(summary)
}
