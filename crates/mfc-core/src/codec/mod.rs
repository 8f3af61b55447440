//! Streaming codec seam.
//!
//! A [`CodecBackend`] opens one [`StreamCodec`] per job. The codec exposes a
//! single process step in the shape of zlib's `deflate`/`inflate`: take what
//! input it can, fill what output it can, report whether the stream ended.
//! [`CodecSession`] owns the chunk buffers and drives that step through the
//! multi-flush loop, so workers and the scheduler never see the backend.

mod deflate;
mod error;
mod session;

pub use deflate::Zlib;
pub use error::CodecError;
pub use session::{CodecSession, SessionError, StreamTotals};

use crate::job::Mode;

/// Flush flag passed to each process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// More input will follow.
    None,
    /// Input is exhausted: emit everything buffered plus the trailer.
    Finish,
}

/// Outcome of one process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Step {
    /// Bytes taken from the input slice.
    pub consumed: usize,
    /// Bytes written to the front of the output slice.
    pub produced: usize,
    /// The codec reached the end of its stream (trailer written or end marker read).
    pub stream_end: bool,
}

/// Live algorithm state for one direction of one stream.
pub trait StreamCodec: Send {
    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, CodecError>;
}

/// Factory for codec instances. Shared by every worker of a run.
pub trait CodecBackend: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    fn open(&self, mode: Mode) -> Result<Box<dyn StreamCodec>, CodecError>;
}
