//! Synthetic payload generation for the benchmark.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const BLOCK_SIZE: usize = 1024 * 1024;

/// One 1 MiB block of numbered text lines: highly compressible but not all zeros.
fn pattern_block() -> Vec<u8> {
    let mut block = Vec::with_capacity(BLOCK_SIZE + 64);
    let mut line = 0u64;
    while block.len() < BLOCK_SIZE {
        let _ = writeln!(
            block,
            "{:08} the quick brown fox jumps over the lazy dog {}",
            line,
            line % 7
        );
        line += 1;
    }
    block.truncate(BLOCK_SIZE);
    block
}

fn file_len(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}

/// Create `path` with exactly `size` bytes unless it already has that size.
/// Returns true when the file was (re)generated.
pub fn ensure_payload(path: &Path, size: u64) -> Result<bool> {
    if file_len(path) == Some(size) {
        return Ok(false);
    }
    tracing::info!(path = %path.display(), size, "generating benchmark payload");
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let block = pattern_block();
    let mut remaining = size;
    while remaining > 0 {
        let n = remaining.min(block.len() as u64) as usize;
        out.write_all(&block[..n])
            .with_context(|| format!("write {}", path.display()))?;
        remaining -= n as u64;
    }
    out.flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

/// Copy `payload` to `copy` unless `copy` already has `size` bytes.
pub fn ensure_copy(payload: &Path, copy: &Path, size: u64) -> Result<bool> {
    if file_len(copy) == Some(size) {
        return Ok(false);
    }
    fs::copy(payload, copy)
        .with_context(|| format!("copy {} to {}", payload.display(), copy.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_has_requested_size_and_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let size = 3 * 1024 * 1024 + 5;
        assert!(ensure_payload(&path, size).unwrap());
        assert_eq!(fs::metadata(&path).unwrap().len(), size);
        assert!(!ensure_payload(&path, size).unwrap());
        // Wrong size is regenerated.
        assert!(ensure_payload(&path, 10).unwrap());
        assert_eq!(fs::metadata(&path).unwrap().len(), 10);
    }

    #[test]
    fn payload_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        ensure_payload(&a, 100_000).unwrap();
        ensure_payload(&b, 100_000).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn copy_matches_payload() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let c = dir.path().join("a0");
        ensure_payload(&a, 4096).unwrap();
        assert!(ensure_copy(&a, &c, 4096).unwrap());
        assert!(!ensure_copy(&a, &c, 4096).unwrap());
        assert_eq!(fs::read(&a).unwrap(), fs::read(&c).unwrap());
    }
}
