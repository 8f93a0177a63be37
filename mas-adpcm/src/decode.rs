//! ADPCM decoder
//!
//! Mirrors the hardware decoder. Used to verify encoder output.

use crate::{ADPCM_HEADER_SIZE, ADPCM_MAX_INDEX, AdpcmError, advance};

/// Decode `frames` frames from an ADPCM stream
pub fn decode_adpcm(data: &[u8], frames: usize) -> Result<Vec<i16>, AdpcmError> {
    if data.len() < ADPCM_HEADER_SIZE {
        return Err(AdpcmError::MissingHeader);
    }
    if data.len() < ADPCM_HEADER_SIZE + frames.div_ceil(2) {
        return Err(AdpcmError::TruncatedData);
    }

    let header = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let mut predictor = (header & 0xFFFF) as u16 as i16 as i32;
    let mut index = (((header >> 16) & 0x7F) as usize).min(ADPCM_MAX_INDEX);

    let mut output = Vec::with_capacity(frames);
    for i in 0..frames {
        let code = (data[ADPCM_HEADER_SIZE + i / 2] >> ((i & 1) * 4)) & 0x0F;
        (predictor, index) = advance(predictor, index, code);
        output.push(predictor as i16);
    }

    Ok(output)
}
