//! Benchmark mode: one worker over one payload vs N workers over N copies.
//!
//! Generates a synthetic low-entropy payload (once), compresses it with a
//! single worker, then compresses N equal-size copies with N workers and
//! reports `1 - multi/single` as a percentage. The second run moves N times
//! the data of the first, so the figure measures aggregate throughput, not
//! strict scaling of identical work.

mod payload;

pub use payload::{ensure_copy, ensure_payload};

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{ConfigError, MfcConfig};
use crate::job::{Job, Level};
use crate::scheduler;
use crate::worker::RunContext;

/// Payload file created in the benchmark directory.
pub const PAYLOAD_NAME: &str = "large_test_file.bin";
/// Compressed artifact of the single-worker run; the parallel run appends the copy index.
pub const COMPRESSED_NAME: &str = "compressed_test.gz";

#[derive(Debug, Clone)]
pub struct BenchSettings {
    /// Where the payload, its copies and the compressed artifacts live.
    pub dir: PathBuf,
    pub payload_bytes: u64,
    /// Worker count and number of payload copies for the parallel run.
    pub workers: usize,
    pub level: Level,
}

impl BenchSettings {
    pub fn from_config(cfg: &MfcConfig, dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            dir: dir.into(),
            payload_bytes: cfg.bench.payload_bytes,
            workers: cfg.bench.workers,
            level: Level::from_option(cfg.level)?,
        })
    }

    pub fn payload_path(&self) -> PathBuf {
        self.dir.join(PAYLOAD_NAME)
    }

    /// Per-worker copy of the payload for the parallel run.
    pub fn copy_path(&self, i: usize) -> PathBuf {
        self.dir.join(format!("{}{}", PAYLOAD_NAME, i))
    }

    pub fn compressed_path(&self) -> PathBuf {
        self.dir.join(COMPRESSED_NAME)
    }

    pub fn compressed_copy_path(&self, i: usize) -> PathBuf {
        self.dir.join(format!("{}{}", COMPRESSED_NAME, i))
    }
}

/// Timings of both runs.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub payload_bytes: u64,
    pub workers: usize,
    pub single: Duration,
    pub multi: Duration,
    /// Jobs that did not complete in each run (should be zero).
    pub single_failed: usize,
    pub multi_failed: usize,
}

impl BenchReport {
    pub fn speedup_percent(&self) -> f64 {
        speedup_percent(self.single, self.multi)
    }

    pub fn single_ms(&self) -> u128 {
        self.single.as_millis()
    }

    pub fn multi_ms(&self) -> u128 {
        self.multi.as_millis()
    }
}

/// `(1 - multi / single) * 100`; 0 when the single run took no measurable time.
pub fn speedup_percent(single: Duration, multi: Duration) -> f64 {
    let single = single.as_secs_f64();
    if single <= 0.0 {
        return 0.0;
    }
    (1.0 - multi.as_secs_f64() / single) * 100.0
}

/// Run both benchmark passes. Progress lines go through `ctx.logger`.
pub fn run_bench<W: Write + Send>(settings: &BenchSettings, ctx: &RunContext<'_, W>) -> Result<BenchReport> {
    if settings.workers < 1 {
        return Err(ConfigError::InvalidWorkerCount(settings.workers).into());
    }
    let payload = settings.payload_path();
    if ensure_payload(&payload, settings.payload_bytes)? {
        ctx.logger.info(&format!(
            "Created test file ({}MB): {}",
            settings.payload_bytes / (1024 * 1024),
            payload.display()
        ));
    }

    ctx.logger.info("Running single-threaded test...");
    let single = scheduler::spawn(
        vec![Job::compress(&payload, settings.compressed_path(), settings.level)],
        1,
        ctx,
    )
    .context("single-threaded run")?;

    for i in 0..settings.workers {
        ensure_copy(&payload, &settings.copy_path(i), settings.payload_bytes)?;
    }
    let jobs = (0..settings.workers)
        .map(|i| Job::compress(settings.copy_path(i), settings.compressed_copy_path(i), settings.level))
        .collect();

    ctx.logger.info(&format!(
        "Running multi-threaded test ({} threads)...",
        settings.workers
    ));
    let multi = scheduler::spawn(jobs, settings.workers, ctx).context("multi-threaded run")?;

    let report = BenchReport {
        payload_bytes: settings.payload_bytes,
        workers: settings.workers,
        single: single.elapsed,
        multi: multi.elapsed,
        single_failed: single.total - single.completed(),
        multi_failed: multi.total - multi.completed(),
    };
    tracing::info!(
        single_ms = report.single_ms() as u64,
        multi_ms = report.multi_ms() as u64,
        workers = report.workers,
        speedup = report.speedup_percent(),
        "benchmark finished"
    );
    Ok(report)
}

/// Remove the payload, its copies and the compressed artifacts.
pub fn clean(settings: &BenchSettings) -> Result<()> {
    let mut paths = vec![settings.payload_path(), settings.compressed_path()];
    for i in 0..settings.workers {
        paths.push(settings.copy_path(i));
        paths.push(settings.compressed_copy_path(i));
    }
    for path in paths {
        remove_if_exists(&path)?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Zlib;
    use crate::logger::Logger;

    #[test]
    fn speedup_formula() {
        let pct = speedup_percent(Duration::from_millis(1000), Duration::from_millis(400));
        assert!((pct - 60.0).abs() < 1e-9);
        let slower = speedup_percent(Duration::from_millis(100), Duration::from_millis(150));
        assert!((slower + 50.0).abs() < 1e-9);
        assert_eq!(speedup_percent(Duration::ZERO, Duration::from_millis(5)), 0.0);
    }

    #[test]
    fn artifact_names() {
        let settings = BenchSettings {
            dir: PathBuf::from("/b"),
            payload_bytes: 1,
            workers: 2,
            level: Level::Default,
        };
        assert_eq!(settings.payload_path(), PathBuf::from("/b/large_test_file.bin"));
        assert_eq!(settings.copy_path(1), PathBuf::from("/b/large_test_file.bin1"));
        assert_eq!(settings.compressed_path(), PathBuf::from("/b/compressed_test.gz"));
        assert_eq!(settings.compressed_copy_path(0), PathBuf::from("/b/compressed_test.gz0"));
    }

    #[test]
    fn small_benchmark_runs_both_passes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BenchSettings {
            dir: dir.path().to_path_buf(),
            payload_bytes: 256 * 1024 + 17,
            workers: 3,
            level: Level::Explicit(1),
        };
        let logger = Logger::new(Vec::new());
        let ctx = RunContext::new(&Zlib, &logger).with_chunk_size(32 * 1024);

        let report = run_bench(&settings, &ctx).unwrap();
        assert_eq!(report.workers, 3);
        assert_eq!(report.single_failed, 0);
        assert_eq!(report.multi_failed, 0);

        assert_eq!(std::fs::metadata(settings.payload_path()).unwrap().len(), settings.payload_bytes);
        assert!(settings.compressed_path().exists());
        for i in 0..3 {
            assert_eq!(std::fs::metadata(settings.copy_path(i)).unwrap().len(), settings.payload_bytes);
            assert!(settings.compressed_copy_path(i).exists());
        }

        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert!(out.contains("Running single-threaded test..."));
        assert!(out.contains("Running multi-threaded test (3 threads)..."));
        assert_eq!(out.lines().filter(|l| l.starts_with("Processed: ")).count(), 4);

        clean(&settings).unwrap();
        assert!(!settings.payload_path().exists());
        assert!(!settings.compressed_copy_path(2).exists());
    }

    #[test]
    fn zero_workers_rejected_before_generating_payload() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BenchSettings {
            dir: dir.path().to_path_buf(),
            payload_bytes: 1024,
            workers: 0,
            level: Level::Default,
        };
        let logger = Logger::new(Vec::new());
        let ctx = RunContext::new(&Zlib, &logger);
        let err = run_bench(&settings, &ctx).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
        assert!(!settings.payload_path().exists());
    }
}
