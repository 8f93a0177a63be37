//! XM file parser

use std::io::Cursor;

use mas_module::{MAX_CHANNELS, MAX_ITEMS, MasFlags, Module};

use crate::error::XmError;
use crate::{MAX_INSTRUMENTS, XM_MAGIC, XM_VERSION};

mod helpers;
mod instrument;
mod pattern;

use helpers::{read_bytes, read_string, read_u16, read_u32, seek, skip};
use instrument::parse_instrument;
use pattern::parse_pattern;

/// Header flag: linear frequency table
const FLAG_LINEAR_FREQ: u16 = 0x01;

/// Offset of the header size field, which the header length counts from
const HEADER_SIZE_OFFSET: u64 = 60;

/// Parse an XM file into a [`Module`]
///
/// Every instrument's samples are appended to the module's sample list in
/// instrument order and the notemaps point into that list. Sample data is
/// loaded unsigned; nothing is adapted to a hardware target yet.
pub fn parse_xm(data: &[u8]) -> Result<Module, XmError> {
    if data.len() < HEADER_SIZE_OFFSET as usize {
        return Err(XmError::TooSmall);
    }
    if &data[0..17] != XM_MAGIC {
        return Err(XmError::InvalidMagic);
    }

    let mut cursor = Cursor::new(data);
    skip(&mut cursor, 17)?;

    let title = read_string(&read_bytes::<20>(&mut cursor)?);

    // 0x1A marker and tracker name
    skip(&mut cursor, 21)?;

    let version = read_u16(&mut cursor)?;
    if version != XM_VERSION {
        return Err(XmError::UnsupportedVersion(version));
    }

    let header_size = read_u32(&mut cursor)?;
    let song_length = read_u16(&mut cursor)?;
    let restart_position = read_u16(&mut cursor)?;

    let num_channels = read_u16(&mut cursor)?;
    if num_channels as usize > MAX_CHANNELS {
        return Err(XmError::TooManyChannels(num_channels));
    }
    let num_patterns = read_u16(&mut cursor)?;
    if num_patterns as usize > MAX_ITEMS {
        return Err(XmError::TooManyPatterns(num_patterns));
    }
    let num_instruments = read_u16(&mut cursor)?;
    if num_instruments > MAX_INSTRUMENTS {
        return Err(XmError::TooManyInstruments(num_instruments));
    }

    let header_flags = read_u16(&mut cursor)?;
    let initial_speed = read_u16(&mut cursor)?.min(255) as u8;
    let initial_tempo = read_u16(&mut cursor)?.min(255) as u8;

    let order_table = read_bytes::<256>(&mut cursor)?;
    let orders = order_table[..(song_length as usize).min(256)].to_vec();

    seek(&mut cursor, HEADER_SIZE_OFFSET + header_size as u64)?;

    let mut patterns = Vec::with_capacity(num_patterns as usize);
    for index in 0..num_patterns {
        patterns.push(parse_pattern(&mut cursor, index, num_channels as usize)?);
    }

    let mut instruments = Vec::with_capacity(num_instruments as usize);
    let mut samples = Vec::new();
    for index in 0..num_instruments {
        let (instrument, instrument_samples) =
            parse_instrument(&mut cursor, index, samples.len())?;
        samples.extend(instrument_samples);
        if samples.len() > MAX_ITEMS {
            return Err(XmError::TooManySamples(samples.len()));
        }
        instruments.push(instrument);
    }

    let mut flags = MasFlags::XM_MODE | MasFlags::OLD_EFFECTS;
    flags.set(MasFlags::LINEAR_FREQ, header_flags & FLAG_LINEAR_FREQ != 0);

    tracing::debug!(
        "XM '{}': {} channels, {} orders, {} patterns, {} instruments, {} samples",
        title,
        num_channels,
        orders.len(),
        patterns.len(),
        instruments.len(),
        samples.len()
    );

    Ok(Module {
        title,
        restart_position: if restart_position < song_length {
            restart_position as u8
        } else {
            0
        },
        orders,
        instruments,
        samples,
        patterns,
        initial_speed,
        initial_tempo,
        stereo: true,
        instrument_mode: true,
        flags,
        ..Module::default()
    })
}
