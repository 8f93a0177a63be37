//! Error types for IT module loading

/// Errors that can occur when loading an IT module
#[derive(Debug, thiserror::Error)]
pub enum ItError {
    #[error("file too small to be a valid IT module")]
    TooSmall,

    #[error("invalid magic bytes (expected 'IMPM')")]
    InvalidMagic,

    #[error("unexpected end of file")]
    UnexpectedEof,

    /// Pattern data addresses a channel the sound engine does not have
    #[error("pattern uses channel {} (max 32)", *.0 as u16 + 1)]
    TooManyChannels(u8),

    #[error("pattern has {0} rows (expected 1-256)")]
    TooManyRows(u16),

    #[error("too many orders: {0} (max 256)")]
    TooManyOrders(u16),

    #[error("too many instruments: {0} (max 255)")]
    TooManyInstruments(u16),

    #[error("too many samples: {0} (max 255)")]
    TooManySamples(u16),

    #[error("too many patterns: {0} (max 255)")]
    TooManyPatterns(u16),

    /// Compressed sample stream switched to a width the codec does not define
    #[error("invalid bit width {0} in compressed sample")]
    InvalidBitWidth(u8),

    #[error("invalid sample offset: 0x{0:08X}")]
    InvalidSampleOffset(u32),

    #[error("compressed sample block is truncated")]
    TruncatedBlock,

    #[error("sample {0} has an unsupported header or format")]
    UnsupportedSample(u16),
}
