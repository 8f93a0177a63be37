//! ADPCM encoder
//!
//! Produces the 4-byte header followed by packed 4-bit codes. Input is signed
//! PCM16; 8-bit material is expected to be widened by the caller (`<< 8`).

use crate::{
    ADPCM_HEADER_SIZE, ADPCM_MAX_INDEX, ADPCM_MIN_VALUE, ADPCM_STEP_TABLE, advance, code_delta,
    encoded_len,
};

/// Quantize a non-negative difference against `step`
///
/// Returns the 3-bit magnitude code.
fn quantize(mut diff: i32, step: i32) -> u8 {
    let mut code = 0;
    if diff >= step {
        code |= 4;
        diff -= step;
    }
    if diff >= step >> 1 {
        code |= 2;
        diff -= step >> 1;
    }
    if diff >= step >> 2 {
        code |= 1;
    }
    code
}

/// Pick the step index that best reproduces the first frame-to-frame delta
///
/// Every candidate below the last table entry is tried; ties keep the lowest
/// index.
///
/// Encoders that always start at index 0 produce a different header; the
/// search here is intentional and the stream still decodes with any
/// standard IMA decoder.
pub fn initial_step_index(first_delta: i32) -> usize {
    let target = first_delta.abs();
    let mut best_index = 0;
    let mut best_error = i32::MAX;

    for (index, &step) in ADPCM_STEP_TABLE.iter().enumerate().take(ADPCM_MAX_INDEX) {
        let error = (code_delta(quantize(target, step), step) - target).abs();
        if error < best_error {
            best_error = error;
            best_index = index;
        }
    }

    best_index
}

/// Encode signed PCM16 frames to an ADPCM stream
///
/// The result is exactly [`encoded_len`]`(samples.len())` bytes long.
pub fn encode_adpcm(samples: &[i16]) -> Vec<u8> {
    let mut output = vec![0u8; encoded_len(samples.len())];

    let read = |i: usize| (samples[i] as i32).max(ADPCM_MIN_VALUE);

    let (mut predictor, mut index) = match samples.len() {
        0 => (0, 0),
        1 => (read(0), 0),
        _ => (read(0), initial_step_index(read(1) - read(0))),
    };

    let header = (predictor as u16 as u32) | ((index as u32) << 16);
    output[..ADPCM_HEADER_SIZE].copy_from_slice(&header.to_le_bytes());

    for i in 0..samples.len() {
        let diff = read(i) - predictor;
        let sign = if diff < 0 { 8 } else { 0 };
        let code = sign | quantize(diff.abs(), ADPCM_STEP_TABLE[index]);

        (predictor, index) = advance(predictor, index, code);

        output[ADPCM_HEADER_SIZE + i / 2] |= code << ((i & 1) * 4);
    }

    output
}
