//! Run a planned job list on the scheduler and print the summary line.

use anyhow::{Context, Result};
use mfc_core::codec::Zlib;
use mfc_core::config::{ConfigError, MfcConfig};
use mfc_core::job::Job;
use mfc_core::logger::Logger;
use mfc_core::scheduler::{self, RunSummary};
use mfc_core::worker::RunContext;
use std::io::Write;
use std::path::Path;

/// Worker count from the command line, else from config; zero is rejected.
pub(super) fn resolve_workers(cfg: &MfcConfig, jobs: Option<usize>) -> Result<usize> {
    let workers = jobs.unwrap_or(cfg.workers);
    if workers < 1 {
        return Err(ConfigError::InvalidWorkerCount(workers).into());
    }
    Ok(workers)
}

pub(super) fn prepare_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))
}

/// Spawn the workers, wait, and log `"<noun> completed in <ms> ms"`.
pub(super) fn run_jobs<W: Write + Send>(
    cfg: &MfcConfig,
    logger: &Logger<W>,
    jobs: Vec<Job>,
    workers: usize,
    noun: &str,
) -> Result<RunSummary> {
    if jobs.is_empty() {
        logger.info("No files to process.");
    }
    let ctx = RunContext::new(&Zlib, logger).with_config(cfg);
    let summary = scheduler::spawn(jobs, workers, &ctx)?;
    logger.info(&format!("{} completed in {} ms", noun, summary.elapsed_ms()));
    if summary.failed() > 0 {
        logger.info(&format!("{} job(s) failed", summary.failed()));
    }
    Ok(summary)
}

/// Turn per-job failures into a non-zero exit for the non-interactive commands.
pub fn ensure_all_succeeded(summary: &RunSummary) -> Result<()> {
    if !summary.all_succeeded() {
        anyhow::bail!(
            "{} of {} job(s) did not complete",
            summary.total - summary.completed(),
            summary.total
        );
    }
    Ok(())
}
