//! `mfc compress <input>` – compress a file or a directory's files.

use anyhow::Result;
use mfc_core::config::MfcConfig;
use mfc_core::job::{Level, Mode};
use mfc_core::logger::Logger;
use mfc_core::plan;
use mfc_core::scheduler::RunSummary;
use std::io::Write;
use std::path::Path;

use super::run::{prepare_output_dir, resolve_workers, run_jobs};

pub fn run_compress<W: Write + Send>(
    cfg: &MfcConfig,
    logger: &Logger<W>,
    input: &Path,
    output: &Path,
    jobs: Option<usize>,
    level: Option<u32>,
) -> Result<RunSummary> {
    let workers = resolve_workers(cfg, jobs)?;
    let level = Level::from_option(level.or(cfg.level))?;
    prepare_output_dir(output)?;
    let planned = plan::plan_compress(input, output, level)?;
    run_jobs(cfg, logger, planned, workers, Mode::Compress(level).noun())
}
