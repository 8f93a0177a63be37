//! Error types for S3M module loading

/// Errors that can occur when loading an S3M module
#[derive(Debug, thiserror::Error)]
pub enum S3mError {
    #[error("file too small to be a valid S3M module")]
    TooSmall,

    #[error("invalid magic bytes (expected 'SCRM')")]
    InvalidMagic,

    #[error("file type {0} is not a ScreamTracker 3 module")]
    InvalidFileType(u8),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("too many orders: {0} (max 256)")]
    TooManyOrders(u16),

    #[error("too many samples: {0} (max 255)")]
    TooManySamples(u16),

    #[error("too many patterns: {0} (max 255)")]
    TooManyPatterns(u16),

    /// Sample data is neither signed nor unsigned PCM
    #[error("unknown sample format {0}")]
    UnknownSampleFormat(u16),

    #[error("sample {0} is packed, stereo or has a bad header")]
    UnsupportedSample(u16),
}
