//! Error types for XM module loading

/// Errors that can occur when loading an XM module
#[derive(Debug, thiserror::Error)]
pub enum XmError {
    #[error("file too small to contain an XM header")]
    TooSmall,

    #[error("invalid magic string (expected 'Extended Module: ')")]
    InvalidMagic,

    #[error("unsupported XM version: 0x{0:04X}")]
    UnsupportedVersion(u16),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("too many channels: {0} (max 32)")]
    TooManyChannels(u16),

    #[error("too many patterns: {0} (max 255)")]
    TooManyPatterns(u16),

    #[error("too many instruments: {0} (max 128)")]
    TooManyInstruments(u16),

    /// Samples of all instruments together exceed the song limit
    #[error("too many samples: {0} (max 255)")]
    TooManySamples(usize),

    #[error("pattern {0} has an invalid row count")]
    InvalidPattern(u16),

    /// Sample data packed with a codec the loader does not read
    #[error("sample {0} of instrument {1} uses unsupported packing")]
    UnsupportedSample(u16, u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            XmError::UnsupportedVersion(0x0103).to_string(),
            "unsupported XM version: 0x0103"
        );
        assert_eq!(
            XmError::TooManyChannels(64).to_string(),
            "too many channels: 64 (max 32)"
        );
        assert_eq!(
            XmError::UnsupportedSample(1, 2).to_string(),
            "sample 1 of instrument 2 uses unsupported packing"
        );
    }
}
