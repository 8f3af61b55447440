//! Serialized console sink for progress and error lines.
//!
//! Each call writes exactly one line while holding the sink's mutex, so lines
//! from concurrent workers never interleave. Every line is also emitted as a
//! `tracing` event so the diagnostics log carries the same history.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

pub struct Logger<W: Write = io::Stdout> {
    sink: Mutex<W>,
}

impl Logger<io::Stdout> {
    /// Logger writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Logger<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Append one line. The write and flush happen inside the critical section.
    pub fn log(&self, message: &str) {
        // A panic elsewhere while holding the lock leaves only whole lines behind.
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let res = writeln!(sink, "{}", message).and_then(|()| sink.flush());
        drop(sink);
        if let Err(e) = res {
            tracing::warn!(error = %e, "console write failed");
        }
    }

    /// Progress line (also recorded at INFO).
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.log(message);
    }

    /// Failure line (also recorded at ERROR).
    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.log(message);
    }

    /// Take the sink back (e.g. to inspect a captured buffer).
    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
