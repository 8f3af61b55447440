//! Deflate backend in the zlib container, via `flate2`'s raw stream API.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use super::{CodecBackend, CodecError, Flush, Step, StreamCodec};
use crate::config::ConfigError;
use crate::job::{Level, Mode};

const NAME: &str = "zlib";

/// zlib-wrapped deflate (RFC 1950), the format written by zlib's `deflateInit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zlib;

impl CodecBackend for Zlib {
    fn name(&self) -> &'static str {
        NAME
    }

    fn open(&self, mode: Mode) -> Result<Box<dyn StreamCodec>, CodecError> {
        Ok(match mode {
            Mode::Compress(level) => Box::new(Deflater {
                inner: Compress::new(compression(level)?, true),
            }),
            Mode::Decompress => Box::new(Inflater {
                inner: Decompress::new(true),
            }),
        })
    }
}

/// Rejects explicit levels above 9 that bypassed `Level::new`.
fn compression(level: Level) -> Result<Compression, CodecError> {
    match level {
        Level::Default => Ok(Compression::default()),
        Level::Explicit(n) if n <= Level::MAX => Ok(Compression::new(n)),
        Level::Explicit(n) => Err(CodecError::backend(NAME, ConfigError::InvalidLevel(n))),
    }
}

struct Deflater {
    inner: Compress,
}

impl StreamCodec for Deflater {
    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, CodecError> {
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let flush = match flush {
            Flush::None => FlushCompress::None,
            Flush::Finish => FlushCompress::Finish,
        };
        let status = self
            .inner
            .compress(input, output, flush)
            .map_err(|e| CodecError::backend(NAME, e))?;
        Ok(Step {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            stream_end: status == Status::StreamEnd,
        })
    }
}

struct Inflater {
    inner: Decompress,
}

impl StreamCodec for Inflater {
    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, CodecError> {
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let flush = match flush {
            Flush::None => FlushDecompress::None,
            Flush::Finish => FlushDecompress::Finish,
        };
        let status = self
            .inner
            .decompress(input, output, flush)
            .map_err(|e| CodecError::backend(NAME, e))?;
        Ok(Step {
            consumed: (self.inner.total_in() - before_in) as usize,
            produced: (self.inner.total_out() - before_out) as usize,
            stream_end: status == Status::StreamEnd,
        })
    }
}
