//! Codec failure type.

/// Failure reported by a codec or by the session driving it. Aborts only the
/// job that owns the session.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The backend rejected its input or reported an internal inconsistency.
    #[error("{backend} codec error")]
    Backend {
        backend: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A process step neither consumed input nor produced output while work remained.
    #[error("codec made no progress")]
    Stalled,
    /// Input ended before the compressed stream's end marker.
    #[error("compressed stream is truncated (no end marker)")]
    Truncated,
}

impl CodecError {
    pub fn backend<E>(backend: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CodecError::Backend {
            backend,
            source: Box::new(source),
        }
    }
}
