//! Codec session: one job's codec instance plus its chunk buffers.
//!
//! Each input chunk is pushed through the codec until it is consumed, writing
//! one output chunk per step and looping while the output buffer comes back
//! full. A single input chunk routinely yields several output chunks.

use std::io::{self, Read, Write};

use super::{CodecBackend, CodecError, Flush, StreamCodec};
use crate::control::CancelToken;
use crate::job::Mode;

/// Byte counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamTotals {
    /// Bytes handed to the codec.
    pub bytes_in: u64,
    /// Bytes written to the sink.
    pub bytes_out: u64,
}

/// Failure while driving a session over a reader/writer pair.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("read failed")]
    Read(#[source] io::Error),
    #[error("write failed")]
    Write(#[source] io::Error),
    #[error("cancelled")]
    Cancelled,
}

/// Result of pushing one slice through the codec.
#[derive(Debug, Clone, Copy)]
struct Drained {
    consumed: usize,
    written: u64,
    stream_end: bool,
}

pub struct CodecSession {
    mode: Mode,
    codec: Box<dyn StreamCodec>,
    input: Vec<u8>,
    output: Vec<u8>,
    stream_end: bool,
    totals: StreamTotals,
}

impl CodecSession {
    /// Open a codec for `mode` with input/output buffers of `chunk_size` bytes each.
    pub fn open(backend: &dyn CodecBackend, mode: Mode, chunk_size: usize) -> Result<Self, CodecError> {
        let chunk_size = chunk_size.max(1);
        Ok(Self {
            mode,
            codec: backend.open(mode)?,
            input: vec![0u8; chunk_size],
            output: vec![0u8; chunk_size],
            stream_end: false,
            totals: StreamTotals::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn totals(&self) -> StreamTotals {
        self.totals
    }

    /// True once the codec has reported the end of its stream.
    pub fn is_stream_end(&self) -> bool {
        self.stream_end
    }

    /// Push one input chunk through the codec, writing every output chunk it yields.
    /// Returns the number of bytes written to `sink`.
    pub fn feed<W: Write + ?Sized>(&mut self, input: &[u8], sink: &mut W) -> Result<u64, SessionError> {
        let drained = feed_parts(
            self.codec.as_mut(),
            &mut self.output,
            &mut self.stream_end,
            input,
            sink,
        )?;
        self.totals.bytes_in += drained.consumed as u64;
        self.totals.bytes_out += drained.written;
        Ok(drained.written)
    }

    /// Signal end of input. Compression flushes buffered state and writes the
    /// trailer; decompression only checks that the end marker was seen.
    pub fn finish<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64, SessionError> {
        if self.stream_end {
            return Ok(0);
        }
        match self.mode {
            Mode::Decompress => Err(CodecError::Truncated.into()),
            Mode::Compress(_) => {
                let drained = drain(self.codec.as_mut(), &mut self.output, &[], Flush::Finish, sink)?;
                self.stream_end = drained.stream_end;
                self.totals.bytes_out += drained.written;
                Ok(drained.written)
            }
        }
    }

    /// Release the codec and buffers.
    pub fn close(self) -> StreamTotals {
        self.totals
    }

    /// Run a whole pass: read `reader` in chunks, feed each, then finish.
    /// `cancel` is polled before every chunk.
    pub fn pump<R, W>(&mut self, reader: &mut R, writer: &mut W, cancel: &CancelToken) -> Result<StreamTotals, SessionError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            let n = read_chunk(reader, &mut self.input).map_err(SessionError::Read)?;
            if n == 0 {
                break;
            }
            let drained = feed_parts(
                self.codec.as_mut(),
                &mut self.output,
                &mut self.stream_end,
                &self.input[..n],
                writer,
            )?;
            self.totals.bytes_in += drained.consumed as u64;
            self.totals.bytes_out += drained.written;
            if self.stream_end {
                break;
            }
        }
        self.finish(writer)?;
        writer.flush().map_err(SessionError::Write)?;
        Ok(self.totals)
    }
}

/// Fill `buf` as far as the reader allows; 0 means end of input.
fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn feed_parts<W: Write + ?Sized>(
    codec: &mut dyn StreamCodec,
    output: &mut [u8],
    stream_end: &mut bool,
    input: &[u8],
    sink: &mut W,
) -> Result<Drained, SessionError> {
    if *stream_end {
        if !input.is_empty() {
            tracing::warn!(bytes = input.len(), "ignoring data after end of compressed stream");
        }
        return Ok(Drained {
            consumed: 0,
            written: 0,
            stream_end: true,
        });
    }
    if input.is_empty() {
        return Ok(Drained {
            consumed: 0,
            written: 0,
            stream_end: false,
        });
    }
    let drained = drain(codec, output, input, Flush::None, sink)?;
    if drained.stream_end {
        *stream_end = true;
        let trailing = input.len() - drained.consumed;
        if trailing > 0 {
            tracing::warn!(bytes = trailing, "ignoring data after end of compressed stream");
        }
    }
    Ok(drained)
}

/// The multi-flush loop. Keeps calling the codec while its output buffer
/// comes back full or input remains; with `Flush::Finish` keeps going until
/// the codec reports stream end.
fn drain<W: Write + ?Sized>(
    codec: &mut dyn StreamCodec,
    output: &mut [u8],
    input: &[u8],
    flush: Flush,
    sink: &mut W,
) -> Result<Drained, SessionError> {
    let mut consumed = 0usize;
    let mut written = 0u64;
    loop {
        let step = codec.process(&input[consumed..], output, flush)?;
        consumed += step.consumed;
        if step.produced > 0 {
            sink.write_all(&output[..step.produced])
                .map_err(SessionError::Write)?;
            written += step.produced as u64;
        }
        if step.stream_end {
            return Ok(Drained {
                consumed,
                written,
                stream_end: true,
            });
        }
        if step.produced == output.len() {
            continue;
        }
        if flush == Flush::None && consumed >= input.len() {
            return Ok(Drained {
                consumed,
                written,
                stream_end: false,
            });
        }
        if step.consumed == 0 && step.produced == 0 {
            return Err(CodecError::Stalled.into());
        }
    }
}
