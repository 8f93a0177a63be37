//! Error types for module serialization

use crate::{SampleFormat, Target};

/// Errors raised while preparing or writing a MAS song
#[derive(Debug, thiserror::Error)]
pub enum MasError {
    #[error("too many instruments: {0} (max 255)")]
    TooManyInstruments(usize),

    #[error("too many samples: {0} (max 255)")]
    TooManySamples(usize),

    #[error("too many patterns: {0} (max 255)")]
    TooManyPatterns(usize),

    #[error("envelope has {0} nodes (max 25)")]
    TooManyEnvelopeNodes(usize),

    #[error("sample '{name}' is {format:?}, which {target} hardware cannot play")]
    UnsupportedFormat {
        name: String,
        format: SampleFormat,
        target: Target,
    },
}
