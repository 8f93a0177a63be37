//! IT file parser

use std::io::Cursor;

use mas_module::{
    Instrument, MAX_CHANNELS, MAX_ITEMS, MAX_ORDERS, MasFlags, Module, Pattern,
};

use crate::IT_MAGIC;
use crate::error::ItError;

mod helpers;
mod instrument;
mod pattern;
mod sample;

use helpers::{read_bytes, read_string, read_u8, read_u16, read_u32, skip};
use instrument::parse_instrument;
use pattern::parse_pattern;
use sample::parse_sample;

pub use pattern::unpack_pattern;

/// Header flag bits
const FLAG_STEREO: u16 = 0x01;
const FLAG_INSTRUMENTS: u16 = 0x04;
const FLAG_LINEAR_SLIDES: u16 = 0x08;
const FLAG_OLD_EFFECTS: u16 = 0x10;
const FLAG_LINK_GXX: u16 = 0x20;

/// Compatible-with version that selects the IT 2.15 sample integrator
const CMWT_IT215: u16 = 0x215;

/// Rows of the pattern substituted for a null parapointer
const EMPTY_PATTERN_ROWS: usize = 64;

/// Parse an IT file into a [`Module`]
///
/// Patterns are unpacked into the dense grid and sample data is loaded
/// unsigned; nothing is adapted to a hardware target yet. Songs without
/// instruments get one instrument per sample.
pub fn parse_it(data: &[u8]) -> Result<Module, ItError> {
    // Fixed header up to the channel tables
    if data.len() < 192 {
        return Err(ItError::TooSmall);
    }
    if &data[0..4] != IT_MAGIC {
        return Err(ItError::InvalidMagic);
    }

    let mut cursor = Cursor::new(data);
    skip(&mut cursor, 4)?;

    let title = read_string(&read_bytes::<26>(&mut cursor)?);

    // Pattern row highlight
    skip(&mut cursor, 2)?;

    let num_orders = read_u16(&mut cursor)?;
    if num_orders as usize > MAX_ORDERS {
        return Err(ItError::TooManyOrders(num_orders));
    }
    let num_instruments = read_u16(&mut cursor)?;
    if num_instruments as usize > MAX_ITEMS {
        return Err(ItError::TooManyInstruments(num_instruments));
    }
    let num_samples = read_u16(&mut cursor)?;
    if num_samples as usize > MAX_ITEMS {
        return Err(ItError::TooManySamples(num_samples));
    }
    let num_patterns = read_u16(&mut cursor)?;
    if num_patterns as usize > MAX_ITEMS {
        return Err(ItError::TooManyPatterns(num_patterns));
    }

    let created_with = read_u16(&mut cursor)?;
    let compatible_with = read_u16(&mut cursor)?;
    let header_flags = read_u16(&mut cursor)?;

    // Special
    skip(&mut cursor, 2)?;
    let global_volume = read_u8(&mut cursor)?;
    // Mix volume
    skip(&mut cursor, 1)?;
    let initial_speed = read_u8(&mut cursor)?;
    let initial_tempo = read_u8(&mut cursor)?;
    // Separation, pitch wheel depth, message length/offset, reserved
    skip(&mut cursor, 12)?;

    let channel_pan = read_bytes::<64>(&mut cursor)?;
    let channel_vol = read_bytes::<64>(&mut cursor)?;

    let mut channel_panning = [0u8; MAX_CHANNELS];
    let mut channel_volume = [0u8; MAX_CHANNELS];
    for channel in 0..MAX_CHANNELS {
        channel_panning[channel] = (channel_pan[channel] as u16 * 4).min(255) as u8;
        channel_volume[channel] = channel_vol[channel];
    }

    let mut orders = vec![0u8; num_orders as usize];
    for order in &mut orders {
        *order = read_u8(&mut cursor)?;
    }

    let instrument_offsets = read_offsets(&mut cursor, num_instruments)?;
    let sample_offsets = read_offsets(&mut cursor, num_samples)?;
    let pattern_offsets = read_offsets(&mut cursor, num_patterns)?;

    let instrument_mode = header_flags & FLAG_INSTRUMENTS != 0;
    let it215 = compatible_with == CMWT_IT215;

    let mut samples = Vec::with_capacity(sample_offsets.len());
    for (index, &offset) in sample_offsets.iter().enumerate() {
        cursor.set_position(offset as u64);
        samples.push(parse_sample(data, &mut cursor, index as u16, it215)?);
    }

    let instruments = if instrument_mode {
        let mut instruments = Vec::with_capacity(instrument_offsets.len());
        for &offset in &instrument_offsets {
            cursor.set_position(offset as u64);
            instruments.push(parse_instrument(&mut cursor)?);
        }
        instruments
    } else {
        samples
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                if sample.is_empty() {
                    Instrument::default()
                } else {
                    Instrument::for_sample(index as u8 + 1)
                }
            })
            .collect()
    };

    let mut patterns = Vec::with_capacity(pattern_offsets.len());
    for &offset in &pattern_offsets {
        if offset == 0 {
            patterns.push(Pattern::new(EMPTY_PATTERN_ROWS));
            continue;
        }
        cursor.set_position(offset as u64);
        patterns.push(parse_pattern(&mut cursor)?);
    }

    let mut flags = MasFlags::empty();
    flags.set(MasFlags::LINEAR_FREQ, header_flags & FLAG_LINEAR_SLIDES != 0);
    flags.set(MasFlags::OLD_EFFECTS, header_flags & FLAG_OLD_EFFECTS != 0);
    flags.set(MasFlags::LINK_GXX, header_flags & FLAG_LINK_GXX != 0);

    tracing::debug!(
        "IT '{}' (cwt 0x{:04X}, cmwt 0x{:04X}): {} orders, {} instruments, {} samples, {} patterns",
        title,
        created_with,
        compatible_with,
        orders.len(),
        instruments.len(),
        samples.len(),
        patterns.len()
    );

    Ok(Module {
        title,
        orders,
        instruments,
        samples,
        patterns,
        channel_volume,
        channel_panning,
        global_volume,
        initial_speed,
        initial_tempo,
        restart_position: 0,
        stereo: header_flags & FLAG_STEREO != 0,
        instrument_mode,
        flags,
    })
}

fn read_offsets(cursor: &mut Cursor<&[u8]>, count: u16) -> Result<Vec<u32>, ItError> {
    (0..count).map(|_| read_u32(cursor)).collect()
}
