//! Destination file lifecycle.
//!
//! Output is written to `<destination>.part` through a buffered writer. On
//! success it is flushed (optionally fsynced) and atomically renamed to the
//! final name; if the job fails, the temp file is removed when the
//! `OutputFile` is dropped.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.gz` → `file.gz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

pub struct OutputFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl OutputFile {
    /// Create (or truncate) the temp file for `final_path`.
    pub fn create(final_path: &Path, buffer_size: usize) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            writer: Some(BufWriter::with_capacity(buffer_size.max(1), file)),
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, optionally fsync, close and rename into place. On failure the
    /// temp file is removed.
    pub fn finalize(mut self, sync: bool) -> io::Result<()> {
        let writer = match self.writer.take() {
            Some(w) => w,
            None => return Err(io::Error::other("output already finalized")),
        };
        let res = commit(writer, sync, &self.temp_path, &self.final_path);
        if res.is_err() {
            remove_temp(&self.temp_path);
        }
        res
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("output already finalized"))
    }
}

fn commit(writer: BufWriter<File>, sync: bool, temp_path: &Path, final_path: &Path) -> io::Result<()> {
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    if sync {
        file.sync_all()?;
    }
    drop(file);
    std::fs::rename(temp_path, final_path)
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        tracing::debug!(path = %temp_path.display(), error = %e, "could not remove partial output");
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            remove_temp(&self.temp_path);
        }
    }
}
