//! Sample header parsing and sample data loading

use std::io::Cursor;

use mas_module::{AutoVibrato, LoopKind, Sample, SampleData};

use crate::compression::{decompress_8bit, decompress_16bit};
use crate::error::ItError;
use crate::SAMPLE_MAGIC;

use super::helpers::{read_bytes, read_string, read_u8, read_u32, skip};

const FLAG_16BIT: u8 = 0x02;
const FLAG_STEREO: u8 = 0x04;
const FLAG_COMPRESSED: u8 = 0x08;
const FLAG_LOOP: u8 = 0x10;
const FLAG_PINGPONG: u8 = 0x40;

const CVT_SIGNED: u8 = 0x01;

/// Parse an `IMPS` sample header and load its data from `file`
///
/// `index` is the 0-based sample number used in errors. Data is converted
/// to the unsigned origin; compressed data uses the IT 2.15 integrator
/// when `it215` is set.
pub(crate) fn parse_sample(
    file: &[u8],
    cursor: &mut Cursor<&[u8]>,
    index: u16,
    it215: bool,
) -> Result<Sample, ItError> {
    if &read_bytes::<4>(cursor)? != SAMPLE_MAGIC {
        return Err(ItError::UnsupportedSample(index));
    }

    let filename = read_string(&read_bytes::<12>(cursor)?);
    if read_u8(cursor)? != 0 {
        return Err(ItError::UnsupportedSample(index));
    }

    let global_volume = read_u8(cursor)?;
    let flags = read_u8(cursor)?;
    let default_volume = read_u8(cursor)?;
    let name = read_string(&read_bytes::<26>(cursor)?);
    let cvt = read_u8(cursor)?;
    let default_panning = convert_panning(read_u8(cursor)?);

    let length = read_u32(cursor)?;
    let loop_start = read_u32(cursor)?;
    let loop_end = read_u32(cursor)?;
    let frequency = read_u32(cursor)?;

    // Sustain loop
    skip(cursor, 8)?;

    let data_offset = read_u32(cursor)?;
    let vibrato = AutoVibrato {
        speed: read_u8(cursor)?,
        depth: read_u8(cursor)?,
        rate: read_u8(cursor)? as u16,
        waveform: read_u8(cursor)?,
    };

    if flags & FLAG_STEREO != 0 && length > 0 {
        return Err(ItError::UnsupportedSample(index));
    }

    let loop_kind = match (flags & FLAG_LOOP != 0, flags & FLAG_PINGPONG != 0) {
        _ if length == 0 => LoopKind::None,
        (false, _) => LoopKind::None,
        (true, false) => LoopKind::Forward,
        (true, true) => LoopKind::PingPong,
    };

    let data = load_sample_data(
        file,
        data_offset,
        length as usize,
        flags & FLAG_16BIT != 0,
        flags & FLAG_COMPRESSED != 0,
        cvt & CVT_SIGNED != 0,
        it215,
    )?;

    Ok(Sample {
        name,
        filename,
        global_volume,
        default_volume,
        default_panning,
        frequency,
        loop_start,
        loop_end,
        loop_kind,
        data,
        signed: false,
        compress: false,
        vibrato,
        bank_index: None,
    })
}

/// IT default pan (bit 7 = used, 0-64) to engine default pan (bit 7 = used, 0-127)
fn convert_panning(dfp: u8) -> u8 {
    let position = if dfp & 0x7F == 64 {
        127
    } else {
        (dfp as u32) << 1
    };
    (position | (dfp & 0x80) as u32) as u8
}

/// Read `frames` frames at `offset`, producing unsigned data
fn load_sample_data(
    file: &[u8],
    offset: u32,
    frames: usize,
    sixteen_bit: bool,
    compressed: bool,
    signed: bool,
    it215: bool,
) -> Result<SampleData, ItError> {
    if frames == 0 {
        return Ok(if sixteen_bit {
            SampleData::Sixteen(Vec::new())
        } else {
            SampleData::Eight(Vec::new())
        });
    }

    let data = file
        .get(offset as usize..)
        .filter(|_| offset != 0)
        .ok_or(ItError::InvalidSampleOffset(offset))?;

    if compressed {
        return Ok(if sixteen_bit {
            SampleData::Sixteen(decompress_16bit(data, frames, it215)?.0)
        } else {
            SampleData::Eight(decompress_8bit(data, frames, it215)?.0)
        });
    }

    if sixteen_bit {
        let bytes = data.get(..frames * 2).ok_or(ItError::UnexpectedEof)?;
        let bias = if signed { 0x8000 } else { 0 };
        Ok(SampleData::Sixteen(
            bytes
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) ^ bias)
                .collect(),
        ))
    } else {
        let bytes = data.get(..frames).ok_or(ItError::UnexpectedEof)?;
        let bias = if signed { 0x80 } else { 0 };
        Ok(SampleData::Eight(bytes.iter().map(|&b| b ^ bias).collect()))
    }
}
