//! Job planning: turn an input path and an output directory into jobs.
//!
//! A directory is scanned non-recursively; only regular files (or symlinks
//! to them) become jobs. Results are sorted by path so queue order is stable.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::job::{Job, Level};

/// Extension written by compression and required by directory decompression.
pub const COMPRESSED_EXTENSION: &str = "gz";

/// `{output_dir}/{file_name}.gz`
pub fn compressed_destination(source: &Path, output_dir: &Path) -> PathBuf {
    let mut name: OsString = source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    output_dir.join(name)
}

/// `{output_dir}/{file_name without its last extension}`
pub fn decompressed_destination(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    output_dir.join(stem)
}

/// True when the path's extension is exactly `gz`.
pub fn has_compressed_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == COMPRESSED_EXTENSION)
        .unwrap_or(false)
}

/// Regular files directly inside `dir`, sorted by path. Subdirectories are skipped.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory {}", dir.display()))?;
        let path = entry.path();
        // Follows symlinks; dangling links are skipped.
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry"),
        }
    }
    files.sort();
    Ok(files)
}

/// One compress job per regular file (or the single input file).
pub fn plan_compress(input: &Path, output_dir: &Path, level: Level) -> Result<Vec<Job>> {
    let sources = if input.is_dir() {
        scan_dir(input)?
    } else {
        vec![input.to_path_buf()]
    };
    let jobs: Vec<Job> = sources
        .into_iter()
        .map(|src| {
            let dst = compressed_destination(&src, output_dir);
            Job::compress(src, dst, level)
        })
        .collect();
    tracing::debug!(input = %input.display(), jobs = jobs.len(), %level, "planned compression");
    Ok(jobs)
}

/// One decompress job per `.gz` file in a directory, or the single input file as given.
pub fn plan_decompress(input: &Path, output_dir: &Path) -> Result<Vec<Job>> {
    let sources = if input.is_dir() {
        scan_dir(input)?
            .into_iter()
            .filter(|p| has_compressed_extension(p))
            .collect()
    } else {
        vec![input.to_path_buf()]
    };
    let jobs: Vec<Job> = sources
        .into_iter()
        .map(|src| {
            let dst = decompressed_destination(&src, output_dir);
            Job::decompress(src, dst)
        })
        .collect();
    tracing::debug!(input = %input.display(), jobs = jobs.len(), "planned decompression");
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Mode;

    #[test]
    fn destination_names() {
        let out = Path::new("/out");
        assert_eq!(
            compressed_destination(Path::new("/data/report.txt"), out),
            PathBuf::from("/out/report.txt.gz")
        );
        assert_eq!(
            decompressed_destination(Path::new("/data/report.txt.gz"), out),
            PathBuf::from("/out/report.txt")
        );
        assert!(has_compressed_extension(Path::new("a.gz")));
        assert!(!has_compressed_extension(Path::new("a.tgz")));
        assert!(!has_compressed_extension(Path::new("a.gz.bak")));
        assert!(!has_compressed_extension(Path::new("gz")));
    }

    #[test]
    fn directory_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.bin", "c.log"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("deep.txt"), b"x").unwrap();

        let out = Path::new("/out");
        let jobs = plan_compress(dir.path(), out, Level::Explicit(6)).unwrap();
        assert_eq!(jobs.len(), 3);
        let dests: Vec<PathBuf> = jobs.iter().map(|j| j.destination().to_path_buf()).collect();
        assert_eq!(
            dests,
            vec![
                PathBuf::from("/out/a.txt.gz"),
                PathBuf::from("/out/b.bin.gz"),
                PathBuf::from("/out/c.log.gz"),
            ]
        );
        assert!(jobs.iter().all(|j| j.mode() == Mode::Compress(Level::Explicit(6))));
    }

    #[test]
    fn decompress_scan_takes_only_gz() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["one.gz", "two.txt.gz", "three.txt", "four.tgz"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.gz")).unwrap();

        let jobs = plan_decompress(dir.path(), Path::new("out")).unwrap();
        let dests: Vec<PathBuf> = jobs.iter().map(|j| j.destination().to_path_buf()).collect();
        assert_eq!(dests, vec![PathBuf::from("out/one"), PathBuf::from("out/two.txt")]);
        assert!(jobs.iter().all(|j| j.mode() == Mode::Decompress));
    }

    #[test]
    fn single_file_input_yields_one_job_even_if_missing() {
        let jobs = plan_compress(Path::new("/nope/missing.dat"), Path::new("o"), Level::Default).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].destination(), Path::new("o/missing.dat.gz"));

        let jobs = plan_decompress(Path::new("/nope/archive.bin"), Path::new("o")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].destination(), Path::new("o/archive"));
    }
}
