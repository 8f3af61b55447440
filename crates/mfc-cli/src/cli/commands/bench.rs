//! `mfc bench` – single worker vs N workers.

use anyhow::{Context, Result};
use mfc_core::bench::{self, BenchReport, BenchSettings};
use mfc_core::codec::Zlib;
use mfc_core::config::MfcConfig;
use mfc_core::logger::Logger;
use mfc_core::worker::RunContext;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BenchArgs {
    pub jobs: Option<usize>,
    pub size_mib: Option<u64>,
    pub dir: PathBuf,
    pub clean: bool,
}

fn print_bench_report<W: Write>(logger: &Logger<W>, report: &BenchReport) {
    logger.info("");
    logger.info("Benchmark Results:");
    logger.info(&format!("Single-threaded time: {} ms", report.single_ms()));
    logger.info(&format!("Multi-threaded time: {} ms", report.multi_ms()));
    logger.info(&format!(
        "Performance gain: {:.2}% faster",
        report.speedup_percent()
    ));
    logger.info(&format!(
        "(the multi-threaded run compressed {} copies, {}x the data of the single run)",
        report.workers, report.workers
    ));
    if report.single_failed + report.multi_failed > 0 {
        logger.info(&format!(
            "{} benchmark job(s) failed; timings are not comparable",
            report.single_failed + report.multi_failed
        ));
    }
}

pub fn run_bench<W: Write + Send>(cfg: &MfcConfig, logger: &Logger<W>, args: &BenchArgs) -> Result<BenchReport> {
    let mut settings = BenchSettings::from_config(cfg, &args.dir)?;
    if let Some(jobs) = args.jobs {
        settings.workers = jobs;
    }
    if let Some(mib) = args.size_mib {
        settings.payload_bytes = mib
            .checked_mul(1024 * 1024)
            .with_context(|| format!("benchmark size of {} MiB is too large", mib))?;
    }

    let ctx = RunContext::new(&Zlib, logger).with_config(cfg);
    let report = bench::run_bench(&settings, &ctx)?;
    print_bench_report(logger, &report);

    if args.clean {
        bench::clean(&settings)?;
    }
    Ok(report)
}
