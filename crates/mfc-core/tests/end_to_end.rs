//! End-to-end runs: plan jobs from a directory, compress on several workers,
//! decompress the results, compare with the originals.

mod common;

use common::fixtures;
use mfc_core::codec::Zlib;
use mfc_core::job::{Job, Level};
use mfc_core::logger::Logger;
use mfc_core::plan;
use mfc_core::scheduler;
use mfc_core::worker::{FailureKind, RunContext};
use tempfile::tempdir;

#[test]
fn ten_mib_low_entropy_two_workers() {
    let dir = tempdir().unwrap();
    let data = fixtures::low_entropy(10 * 1024 * 1024);
    let src = fixtures::write(dir.path(), "big.log", &data);
    let packed_dir = dir.path().join("packed");
    let restored_dir = dir.path().join("restored");
    std::fs::create_dir(&packed_dir).unwrap();
    std::fs::create_dir(&restored_dir).unwrap();

    let logger = Logger::new(Vec::new());
    let ctx = RunContext::new(&Zlib, &logger);

    let jobs = plan::plan_compress(&src, &packed_dir, Level::new(6).unwrap()).unwrap();
    let summary = scheduler::spawn(jobs, 2, &ctx).unwrap();
    assert!(summary.all_succeeded());

    let packed = packed_dir.join("big.log.gz");
    let packed_len = std::fs::metadata(&packed).unwrap().len();
    assert!(packed_len < data.len() as u64, "{} >= {}", packed_len, data.len());

    let jobs = plan::plan_decompress(&packed_dir, &restored_dir).unwrap();
    assert_eq!(jobs.len(), 1);
    let summary = scheduler::spawn(jobs, 2, &ctx).unwrap();
    assert!(summary.all_succeeded());
    assert_eq!(std::fs::read(restored_dir.join("big.log")).unwrap(), data);

    let out = String::from_utf8(logger.into_inner()).unwrap();
    assert_eq!(out.lines().count(), 2);
    assert!(out.lines().all(|l| l.starts_with("Processed: ")));
}

#[test]
fn directory_roundtrip_at_every_level() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    let originals = vec![
        ("empty.bin", Vec::new()),
        ("tiny.txt", b"x".to_vec()),
        ("text.txt", fixtures::low_entropy(300_000)),
        ("noise.bin", fixtures::noise(200_000, 7)),
        ("exact.bin", fixtures::noise(64 * 1024, 11)),
    ];
    for (name, data) in &originals {
        fixtures::write(&input, name, data);
    }
    std::fs::create_dir(input.join("subdir")).unwrap();

    for n in 0..=9 {
        let packed = dir.path().join(format!("packed-{}", n));
        let restored = dir.path().join(format!("restored-{}", n));
        std::fs::create_dir(&packed).unwrap();
        std::fs::create_dir(&restored).unwrap();

        let logger = Logger::new(Vec::new());
        // Chunk size equal to exact.bin's length exercises the exact-multiple boundary.
        let ctx = RunContext::new(&Zlib, &logger).with_chunk_size(64 * 1024);

        let jobs = plan::plan_compress(&input, &packed, Level::new(n).unwrap()).unwrap();
        assert_eq!(jobs.len(), originals.len());
        let summary = scheduler::spawn(jobs, 3, &ctx).unwrap();
        assert!(summary.all_succeeded(), "level {}", n);

        let jobs = plan::plan_decompress(&packed, &restored).unwrap();
        let summary = scheduler::spawn(jobs, 3, &ctx).unwrap();
        assert!(summary.all_succeeded(), "level {}", n);

        for (name, data) in &originals {
            assert_eq!(&std::fs::read(restored.join(name)).unwrap(), data, "{} at level {}", name, n);
        }
    }
}

#[test]
fn level_zero_is_still_a_valid_stream() {
    let dir = tempdir().unwrap();
    let data = fixtures::low_entropy(500_000);
    let src = fixtures::write(dir.path(), "plain.txt", &data);
    let packed = dir.path().join("plain.txt.gz");
    let restored = dir.path().join("plain.out");

    let logger = Logger::new(Vec::new());
    let ctx = RunContext::new(&Zlib, &logger).with_chunk_size(8 * 1024);
    let jobs = vec![Job::compress(&src, &packed, Level::new(0).unwrap())];
    assert!(scheduler::spawn(jobs, 1, &ctx).unwrap().all_succeeded());
    // Stored blocks: no smaller than the input.
    assert!(std::fs::metadata(&packed).unwrap().len() >= data.len() as u64);

    let jobs = vec![Job::decompress(&packed, &restored)];
    assert!(scheduler::spawn(jobs, 1, &ctx).unwrap().all_succeeded());
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn mixed_failures_are_isolated() {
    let dir = tempdir().unwrap();
    let good = fixtures::write(dir.path(), "good.txt", &fixtures::low_entropy(50_000));
    let bogus = fixtures::write(dir.path(), "bogus.gz", b"not compressed at all");

    let logger = Logger::new(Vec::new());
    let ctx = RunContext::new(&Zlib, &logger);
    let jobs = vec![
        Job::compress(dir.path().join("missing.txt"), dir.path().join("missing.txt.gz"), Level::Default),
        Job::decompress(&bogus, dir.path().join("bogus")),
        Job::compress(&good, dir.path().join("good.txt.gz"), Level::Default),
    ];
    let summary = scheduler::spawn(jobs, 2, &ctx).unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.failed(), 2);
    let kinds: Vec<Option<FailureKind>> = summary
        .reports
        .iter()
        .map(|r| r.outcome.as_ref().err().map(|e| e.kind()))
        .collect();
    assert_eq!(kinds, vec![Some(FailureKind::Open), Some(FailureKind::Codec), None]);
    assert!(dir.path().join("good.txt.gz").exists());
    assert!(!dir.path().join("bogus").exists());
    assert!(!dir.path().join("bogus.part").exists());

    let out = String::from_utf8(logger.into_inner()).unwrap();
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn many_jobs_few_workers_each_output_once() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();
    std::fs::create_dir(&output).unwrap();
    for i in 0..40 {
        fixtures::write(&input, &format!("part-{:02}.dat", i), &fixtures::noise(10_000 + i * 100, i as u64));
    }

    let logger = Logger::new(Vec::new());
    let ctx = RunContext::new(&Zlib, &logger).with_chunk_size(4096);
    let jobs = plan::plan_compress(&input, &output, Level::Default).unwrap();
    let summary = scheduler::spawn(jobs, 5, &ctx).unwrap();
    assert_eq!(summary.completed(), 40);

    let mut indices: Vec<usize> = summary.reports.iter().map(|r| r.index).collect();
    indices.dedup();
    assert_eq!(indices, (0..40).collect::<Vec<_>>());

    let out = String::from_utf8(logger.into_inner()).unwrap();
    let mut lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 40);
    lines.sort_unstable();
    lines.dedup();
    assert_eq!(lines.len(), 40, "every job logged exactly once");
    assert_eq!(std::fs::read_dir(&output).unwrap().count(), 40);
}
