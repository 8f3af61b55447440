//! Worker: claim jobs from the queue and run each through a private codec session.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::codec::{CodecBackend, CodecError, CodecSession, SessionError};
use crate::config::{MfcConfig, DEFAULT_CHUNK_SIZE};
use crate::control::CancelToken;
use crate::job::Job;
use crate::logger::Logger;
use crate::queue::JobQueue;
use crate::storage::OutputFile;

/// Everything a worker needs besides the queue. Shared read-only by all workers of a run.
pub struct RunContext<'a, W: Write> {
    pub backend: &'a dyn CodecBackend,
    pub logger: &'a Logger<W>,
    /// Codec input/output chunk size in bytes.
    pub chunk_size: usize,
    /// fsync each destination before renaming it into place.
    pub sync_output: bool,
    pub cancel: CancelToken,
}

impl<'a, W: Write> RunContext<'a, W> {
    pub fn new(backend: &'a dyn CodecBackend, logger: &'a Logger<W>) -> Self {
        Self {
            backend,
            logger,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sync_output: false,
            cancel: CancelToken::new(),
        }
    }

    /// Take chunk size and sync policy from the loaded config.
    pub fn with_config(mut self, cfg: &MfcConfig) -> Self {
        self.chunk_size = cfg.chunk_size_bytes;
        self.sync_output = cfg.sync_output;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Per-job failure. Recovered inside the worker; never stops other jobs.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Error opening input file: {}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error opening output file: {}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error during compression/decompression of {}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    #[error("Error reading {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error finalizing {}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cancelled: {}", .path.display())]
    Cancelled { path: PathBuf },
}

/// Coarse classification of a [`JobError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source unreadable or destination unwritable.
    Open,
    /// The codec rejected the data or stalled.
    Codec,
    /// Read/write/rename failed mid-job.
    Io,
    Cancelled,
}

impl JobError {
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::OpenInput { .. } | JobError::OpenOutput { .. } => FailureKind::Open,
            JobError::Codec { .. } => FailureKind::Codec,
            JobError::Read { .. } | JobError::Write { .. } | JobError::Finalize { .. } => FailureKind::Io,
            JobError::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    fn from_session(err: SessionError, job: &Job) -> Self {
        match err {
            SessionError::Codec(source) => JobError::Codec {
                path: job.source().to_path_buf(),
                source,
            },
            SessionError::Read(source) => JobError::Read {
                path: job.source().to_path_buf(),
                source,
            },
            SessionError::Write(source) => JobError::Write {
                path: job.destination().to_path_buf(),
                source,
            },
            SessionError::Cancelled => JobError::Cancelled {
                path: job.source().to_path_buf(),
            },
        }
    }
}

/// Render an error with its source chain, as `anyhow` prints it with `{:#}`.
pub fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    anyhow::Chain::new(err)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// Byte counts and timing for a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub elapsed: Duration,
}

/// Outcome of one claimed job.
#[derive(Debug)]
pub struct JobReport {
    /// Position in the queue.
    pub index: usize,
    /// Worker that ran it.
    pub worker: usize,
    pub job: Job,
    pub outcome: Result<JobStats, JobError>,
}

impl JobReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Worker loop: claim jobs until the queue is empty or the run is cancelled,
/// calling `f` for each. Returns how many jobs this worker ran.
pub fn work<F>(worker: usize, queue: &JobQueue, cancel: &CancelToken, mut f: F) -> usize
where
    F: FnMut(usize, &Job),
{
    let mut ran = 0;
    loop {
        if cancel.is_cancelled() {
            tracing::debug!(worker, "cancelled, leaving queue");
            break;
        }
        let Some((index, job)) = queue.try_pop() else {
            break;
        };
        f(index, job);
        ran += 1;
    }
    tracing::debug!(worker, jobs = ran, "worker finished");
    ran
}

/// Run one job and report it through the logger.
pub fn execute<W: Write>(index: usize, job: &Job, worker: usize, ctx: &RunContext<'_, W>) -> JobReport {
    let outcome = run_job(job, ctx);
    match &outcome {
        Ok(stats) => {
            tracing::debug!(
                index,
                worker,
                bytes_in = stats.bytes_in,
                bytes_out = stats.bytes_out,
                elapsed_ms = stats.elapsed.as_millis() as u64,
                "job complete"
            );
            ctx.logger.info(&format!(
                "Processed: {} -> {}",
                job.source().display(),
                job.destination().display()
            ));
        }
        Err(e) => ctx.logger.error(&describe(e)),
    }
    JobReport {
        index,
        worker,
        job: job.clone(),
        outcome,
    }
}

/// Open source and destination, pump the source through a fresh codec
/// session, and rename the destination into place once fully written.
pub fn run_job<W: Write>(job: &Job, ctx: &RunContext<'_, W>) -> Result<JobStats, JobError> {
    let started = Instant::now();
    if ctx.cancel.is_cancelled() {
        return Err(JobError::Cancelled {
            path: job.source().to_path_buf(),
        });
    }

    let mut input = File::open(job.source()).map_err(|source| JobError::OpenInput {
        path: job.source().to_path_buf(),
        source,
    })?;
    let mut output = open_output(job.destination(), ctx.chunk_size)?;
    let mut session = CodecSession::open(ctx.backend, job.mode(), ctx.chunk_size).map_err(|source| {
        JobError::Codec {
            path: job.source().to_path_buf(),
            source,
        }
    })?;

    session
        .pump(&mut input, &mut output, &ctx.cancel)
        .map_err(|e| JobError::from_session(e, job))?;
    let totals = session.close();
    drop(input);

    output
        .finalize(ctx.sync_output)
        .map_err(|source| JobError::Finalize {
            path: job.destination().to_path_buf(),
            source,
        })?;

    Ok(JobStats {
        bytes_in: totals.bytes_in,
        bytes_out: totals.bytes_out,
        elapsed: started.elapsed(),
    })
}

fn open_output(destination: &Path, buffer_size: usize) -> Result<OutputFile, JobError> {
    OutputFile::create(destination, buffer_size).map_err(|source| JobError::OpenOutput {
        path: destination.to_path_buf(),
        source,
    })
}
