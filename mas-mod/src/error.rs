//! Error types for MOD loading

/// Errors that can occur when loading a MOD
#[derive(Debug, thiserror::Error)]
pub enum ModError {
    #[error("file too small to be a valid MOD")]
    TooSmall,

    #[error("unknown format tag {0:?}")]
    UnknownSignature([u8; 4]),

    #[error("too many channels: {0} (max 32)")]
    TooManyChannels(u8),

    #[error("too many patterns: {0} (max 255)")]
    TooManyPatterns(usize),

    #[error("unexpected end of file")]
    UnexpectedEof,
}
