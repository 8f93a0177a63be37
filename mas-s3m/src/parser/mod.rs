//! S3M file parser

use std::io::Cursor;

use mas_module::{
    Instrument, MAX_CHANNELS, MAX_ITEMS, MAX_ORDERS, MasFlags, Module, Pattern,
};

use crate::error::S3mError;
use crate::{S3M_FILE_TYPE, S3M_MAGIC};

mod helpers;
mod pattern;
mod sample;
#[cfg(test)]
mod tests;

use helpers::{read_bytes, read_string, read_u8, read_u16, skip};
use pattern::parse_pattern;
use sample::parse_sample;

/// Fixed header size, up to the order list
const HEADER_SIZE: usize = 0x60;

/// Offset of the "SCRM" magic
const MAGIC_OFFSET: usize = 0x2C;

/// Master volume bit selecting stereo playback
const MASTER_STEREO: u8 = 0x80;

/// Default-pan byte announcing a channel panning table
const PANNING_TABLE: u8 = 252;

/// Panning table entry bit: the low nibble holds a position
const PAN_PRESENT: u8 = 0x20;

/// Sample format field
const FFI_SIGNED: u16 = 1;
const FFI_UNSIGNED: u16 = 2;

/// Rows of every S3M pattern
pub(crate) const PATTERN_ROWS: usize = 64;

/// Parse an S3M file into a [`Module`]
///
/// Samples are loaded unsigned and each non-empty sample gets an
/// instrument that plays it across the whole keyboard.
pub fn parse_s3m(data: &[u8]) -> Result<Module, S3mError> {
    if data.len() < HEADER_SIZE {
        return Err(S3mError::TooSmall);
    }
    if &data[MAGIC_OFFSET..MAGIC_OFFSET + 4] != S3M_MAGIC {
        return Err(S3mError::InvalidMagic);
    }

    let mut cursor = Cursor::new(data);
    let title = read_string(&read_bytes::<28>(&mut cursor)?);

    // 0x1A marker
    skip(&mut cursor, 1)?;
    let file_type = read_u8(&mut cursor)?;
    if file_type != S3M_FILE_TYPE {
        return Err(S3mError::InvalidFileType(file_type));
    }
    skip(&mut cursor, 2)?;

    let num_orders = read_u16(&mut cursor)?;
    if num_orders as usize > MAX_ORDERS {
        return Err(S3mError::TooManyOrders(num_orders));
    }
    let num_samples = read_u16(&mut cursor)?;
    if num_samples as usize > MAX_ITEMS {
        return Err(S3mError::TooManySamples(num_samples));
    }
    let num_patterns = read_u16(&mut cursor)?;
    if num_patterns as usize > MAX_ITEMS {
        return Err(S3mError::TooManyPatterns(num_patterns));
    }

    // Song flags
    skip(&mut cursor, 2)?;
    let created_with = read_u16(&mut cursor)?;
    let sample_format = read_u16(&mut cursor)?;
    let signed = match sample_format {
        FFI_SIGNED => true,
        FFI_UNSIGNED => false,
        other => return Err(S3mError::UnknownSampleFormat(other)),
    };

    // Magic
    skip(&mut cursor, 4)?;
    let global_volume = (read_u8(&mut cursor)? as u16 * 2).min(128) as u8;
    let initial_speed = read_u8(&mut cursor)?;
    let initial_tempo = read_u8(&mut cursor)?;
    let stereo = read_u8(&mut cursor)? & MASTER_STEREO != 0;
    // Ultra click removal
    skip(&mut cursor, 1)?;
    let default_pan = read_u8(&mut cursor)?;
    skip(&mut cursor, 10)?;

    let channel_settings = read_bytes::<32>(&mut cursor)?;
    let mut channel_panning = [128u8; MAX_CHANNELS];
    if stereo {
        for (pan, &setting) in channel_panning.iter_mut().zip(&channel_settings) {
            *pan = if setting & 0x7F < 8 { 64 } else { 192 };
        }
    }

    let mut orders = vec![0u8; num_orders as usize];
    for order in &mut orders {
        *order = read_u8(&mut cursor)?;
    }

    let sample_offsets = read_parapointers(&mut cursor, num_samples)?;
    let pattern_offsets = read_parapointers(&mut cursor, num_patterns)?;

    if default_pan == PANNING_TABLE {
        let table = read_bytes::<32>(&mut cursor)?;
        for (pan, &entry) in channel_panning.iter_mut().zip(&table) {
            if entry & PAN_PRESENT != 0 {
                *pan = (entry & 0x0F) * 16;
            }
        }
    }

    let mut samples = Vec::with_capacity(sample_offsets.len());
    for (index, &offset) in sample_offsets.iter().enumerate() {
        cursor.set_position(offset);
        samples.push(parse_sample(data, &mut cursor, index as u16, signed)?);
    }

    let instruments = samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            if sample.is_empty() {
                Instrument::default()
            } else {
                Instrument::for_sample(index as u8 + 1)
            }
        })
        .collect();

    let mut patterns = Vec::with_capacity(pattern_offsets.len());
    for &offset in &pattern_offsets {
        if offset == 0 {
            patterns.push(Pattern::new(PATTERN_ROWS));
            continue;
        }
        cursor.set_position(offset);
        patterns.push(parse_pattern(&mut cursor)?);
    }

    tracing::debug!(
        "S3M '{}' (cwt 0x{:04X}): {} orders, {} samples, {} patterns",
        title,
        created_with,
        orders.len(),
        samples.len(),
        patterns.len()
    );

    Ok(Module {
        title,
        orders,
        instruments,
        samples,
        patterns,
        channel_panning,
        global_volume,
        initial_speed,
        initial_tempo,
        stereo,
        instrument_mode: false,
        flags: MasFlags::OLD_EFFECTS | MasFlags::OLD_MODE,
        ..Module::default()
    })
}

/// Parapointers count 16-byte paragraphs from the start of the file
fn read_parapointers(cursor: &mut Cursor<&[u8]>, count: u16) -> Result<Vec<u64>, S3mError> {
    (0..count)
        .map(|_| read_u16(cursor).map(|para| para as u64 * 16))
        .collect()
}
