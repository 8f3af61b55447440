//! `mfc decompress <input>` – restore a `.gz` file or a directory of them.

use anyhow::Result;
use mfc_core::config::MfcConfig;
use mfc_core::job::Mode;
use mfc_core::logger::Logger;
use mfc_core::plan;
use mfc_core::scheduler::RunSummary;
use std::io::Write;
use std::path::Path;

use super::run::{prepare_output_dir, resolve_workers, run_jobs};

pub fn run_decompress<W: Write + Send>(
    cfg: &MfcConfig,
    logger: &Logger<W>,
    input: &Path,
    output: &Path,
    jobs: Option<usize>,
) -> Result<RunSummary> {
    let workers = resolve_workers(cfg, jobs)?;
    prepare_output_dir(output)?;
    let planned = plan::plan_decompress(input, output)?;
    run_jobs(cfg, logger, planned, workers, Mode::Decompress.noun())
}
