//! Sample header parsing and sample data loading

use std::io::Cursor;

use mas_module::{LoopKind, Sample, SampleData};

use crate::SAMPLE_MAGIC;
use crate::error::S3mError;

use super::helpers::{read_bytes, read_string, read_u8, read_u16, read_u32, skip};

/// Header type byte of a PCM sample; other types carry no data
const TYPE_SAMPLE: u8 = 1;

const FLAG_LOOP: u8 = 0x01;
const FLAG_STEREO: u8 = 0x02;
const FLAG_16BIT: u8 = 0x04;

/// Parse a sample header at the cursor and load its data from `file`
///
/// `signed` comes from the song header and applies to every sample.
pub(crate) fn parse_sample(
    file: &[u8],
    cursor: &mut Cursor<&[u8]>,
    index: u16,
    signed: bool,
) -> Result<Sample, S3mError> {
    let kind = read_u8(cursor)?;
    let filename = read_string(&read_bytes::<12>(cursor)?);

    let segment_high = read_u8(cursor)? as u32;
    let segment_low = read_u16(cursor)? as u32;
    let data_offset = ((segment_high << 16) | segment_low) * 16;

    let length = read_u32(cursor)?;
    let loop_start = read_u32(cursor)?;
    let loop_end = read_u32(cursor)?;
    let default_volume = read_u8(cursor)?.min(64);
    // Reserved
    skip(cursor, 1)?;
    let packing = read_u8(cursor)?;
    let flags = read_u8(cursor)?;
    let frequency = read_u32(cursor)?;
    // Unused, then player internals
    skip(cursor, 12)?;
    let name = read_string(&read_bytes::<28>(cursor)?);

    if kind != TYPE_SAMPLE {
        return Ok(Sample {
            name,
            filename,
            ..Sample::default()
        });
    }

    if &read_bytes::<4>(cursor)? != SAMPLE_MAGIC
        || packing != 0
        || flags & FLAG_STEREO != 0
    {
        return Err(S3mError::UnsupportedSample(index));
    }

    let loop_kind = if flags & FLAG_LOOP != 0 && length > 0 && loop_end > loop_start {
        LoopKind::Forward
    } else {
        LoopKind::None
    };

    let data = load_sample_data(
        file,
        data_offset,
        length as usize,
        flags & FLAG_16BIT != 0,
        signed,
    )?;

    Ok(Sample {
        name,
        filename,
        default_volume,
        frequency,
        loop_start: if loop_kind == LoopKind::None { 0 } else { loop_start },
        loop_end: if loop_kind == LoopKind::None { 0 } else { loop_end.min(length) },
        loop_kind,
        data,
        ..Sample::default()
    })
}

/// Read `frames` frames at `offset`, producing unsigned data
fn load_sample_data(
    file: &[u8],
    offset: u32,
    frames: usize,
    sixteen_bit: bool,
    signed: bool,
) -> Result<SampleData, S3mError> {
    let data = file.get(offset as usize..).unwrap_or_default();

    if sixteen_bit {
        let bytes = data.get(..frames * 2).ok_or(S3mError::UnexpectedEof)?;
        let bias = if signed { 0x8000 } else { 0 };
        Ok(SampleData::Sixteen(
            bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) ^ bias)
                .collect(),
        ))
    } else {
        let bytes = data.get(..frames).ok_or(S3mError::UnexpectedEof)?;
        let bias = if signed { 0x80 } else { 0 };
        Ok(SampleData::Eight(bytes.iter().map(|&b| b ^ bias).collect()))
    }
}
