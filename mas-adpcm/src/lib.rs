//! mas-adpcm: IMA-ADPCM codec for Nintendo DS sound hardware
//!
//! The DS sound channels can play 4-bit IMA-ADPCM directly. This crate is a
//! pure codec: it turns signed 16-bit PCM into the hardware stream layout and
//! back. Loop bookkeeping and sample containers are handled by the caller.
//!
//! # Stream Format
//!
//! ```text
//! Header (4 bytes, little-endian u32):
//!   bits 0-15:  initial PCM16 predictor value
//!   bits 16-22: initial step table index (0..88)
//!   bits 23-31: zero
//!
//! Body (ceil(n / 2) bytes):
//!   one 4-bit code per frame, low nibble first
//!   bit 3 = sign, bits 0-2 = magnitude
//! ```
//!
//! The hardware clamps the predictor to `-0x7FFF..=0x7FFF`, so the encoder
//! clamps its input to the same range before encoding.
//!
//! # Usage
//!
//! ```
//! use mas_adpcm::{decode_adpcm, encode_adpcm, encoded_len};
//!
//! let samples: Vec<i16> = (0..64).map(|i| (i * 100) as i16).collect();
//! let adpcm = encode_adpcm(&samples);
//! assert_eq!(adpcm.len(), encoded_len(samples.len()));
//!
//! let decoded = decode_adpcm(&adpcm, samples.len()).unwrap();
//! assert_eq!(decoded.len(), samples.len());
//! ```

mod decode;
mod encode;

pub use decode::decode_adpcm;
pub use encode::{encode_adpcm, initial_step_index};

// =============================================================================
// Constants
// =============================================================================

/// Size of the stream header (predictor + step index)
pub const ADPCM_HEADER_SIZE: usize = 4;

/// Highest valid step table index
pub const ADPCM_MAX_INDEX: usize = 88;

/// Predictor range enforced by the hardware
pub const ADPCM_MIN_VALUE: i32 = -0x7FFF;
pub const ADPCM_MAX_VALUE: i32 = 0x7FFF;

/// Step index adjustment keyed by the 3-bit magnitude code
pub const ADPCM_INDEX_TABLE: [i32; 8] = [-1, -1, -1, -1, 2, 4, 6, 8];

/// Quantizer step sizes (89 entries)
pub const ADPCM_STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, 19, 21, 23, 25, 28, 31, 34, 37, 41, 45, 50, 55, 60, 66,
    73, 80, 88, 97, 107, 118, 130, 143, 157, 173, 190, 209, 230, 253, 279, 307, 337, 371, 408,
    449, 494, 544, 598, 658, 724, 796, 876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358, 5894, 6484, 7132, 7845, 8630,
    9493, 10442, 11487, 12635, 13899, 15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794,
    32767,
];

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur during ADPCM decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdpcmError {
    /// Stream is shorter than the 4-byte header
    MissingHeader,
    /// Stream ends before the requested number of frames
    TruncatedData,
}

impl core::fmt::Display for AdpcmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdpcmError::MissingHeader => write!(f, "ADPCM stream too small for header"),
            AdpcmError::TruncatedData => write!(f, "truncated ADPCM data"),
        }
    }
}

impl std::error::Error for AdpcmError {}

// =============================================================================
// Helper Functions
// =============================================================================

/// Encoded size in bytes for `frames` PCM frames
#[inline]
pub fn encoded_len(frames: usize) -> usize {
    frames.div_ceil(2) + ADPCM_HEADER_SIZE
}

/// Reconstructed difference for a 3-bit magnitude code at the given step
#[inline]
pub(crate) fn code_delta(code: u8, step: i32) -> i32 {
    let mut delta = step >> 3;
    if code & 4 != 0 {
        delta += step;
    }
    if code & 2 != 0 {
        delta += step >> 1;
    }
    if code & 1 != 0 {
        delta += step >> 2;
    }
    delta
}

/// Apply a 4-bit code to the predictor and step index
#[inline]
pub(crate) fn advance(predictor: i32, index: usize, code: u8) -> (i32, usize) {
    let delta = code_delta(code & 7, ADPCM_STEP_TABLE[index]);
    let predictor = if code & 8 != 0 {
        predictor - delta
    } else {
        predictor + delta
    };
    let index = (index as i32 + ADPCM_INDEX_TABLE[(code & 7) as usize])
        .clamp(0, ADPCM_MAX_INDEX as i32) as usize;
    (
        predictor.clamp(ADPCM_MIN_VALUE, ADPCM_MAX_VALUE),
        index,
    )
}

// =============================================================================
// Tests
// =============================================================================
