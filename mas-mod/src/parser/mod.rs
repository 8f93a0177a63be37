//! MOD file parser

use std::io::Cursor;

use mas_module::{Instrument, MAX_CHANNELS, MAX_ITEMS, MasFlags, Module};

use crate::error::ModError;
use crate::{NUM_SAMPLES, SIGNATURE_OFFSET};

mod helpers;
mod pattern;
mod sample;

use helpers::{read_bytes, read_string, read_u8};
use pattern::parse_pattern;
use sample::{load_sample, parse_sample_header};

pub use pattern::period_to_note;

/// Entries in the order table, whatever the song length
const ORDER_TABLE_SIZE: usize = 128;

/// Restart bytes from here up are tracker IDs, not positions
const RESTART_LIMIT: u8 = 127;

/// Hard-panned channel positions
const PAN_LEFT: u8 = 64;
const PAN_RIGHT: u8 = 192;

/// Channel count from the format tag at 0x438
///
/// Accepts `M.K.`, `M!K!`, `FLT4`, `FLT8`, `xCHN` and `xxCH`.
pub fn channel_count(signature: &[u8; 4]) -> Result<u8, ModError> {
    let channels = match signature {
        b"M.K." | b"M!K!" | b"FLT4" => 4,
        b"FLT8" => 8,
        [digit @ b'1'..=b'9', b'C', b'H', b'N'] => digit - b'0',
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9', b'C', b'H'] => {
            let count = (tens - b'0') * 10 + (ones - b'0');
            if count as usize > MAX_CHANNELS {
                return Err(ModError::TooManyChannels(count));
            }
            count
        }
        _ => 0,
    };

    if channels == 0 {
        return Err(ModError::UnknownSignature(*signature));
    }
    Ok(channels)
}

/// Parse a 31-sample MOD into a [`Module`]
///
/// Only samples up to the highest one the patterns play are kept; each
/// gets an instrument that plays it across the whole keyboard.
pub fn parse_mod(data: &[u8]) -> Result<Module, ModError> {
    if data.len() < SIGNATURE_OFFSET + 4 {
        return Err(ModError::TooSmall);
    }

    let mut signature = [0u8; 4];
    signature.copy_from_slice(&data[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 4]);
    let channels = channel_count(&signature)?;

    let mut cursor = Cursor::new(data);
    let title = read_string(&read_bytes::<20>(&mut cursor)?);

    let mut headers = Vec::with_capacity(NUM_SAMPLES);
    for _ in 0..NUM_SAMPLES {
        headers.push(parse_sample_header(&mut cursor)?);
    }

    let song_length = (read_u8(&mut cursor)? as usize).min(ORDER_TABLE_SIZE);
    let restart = read_u8(&mut cursor)?;
    let order_table = read_bytes::<ORDER_TABLE_SIZE>(&mut cursor)?;
    // Format tag
    read_bytes::<4>(&mut cursor)?;

    let num_patterns = order_table.iter().max().map_or(0, |&max| max as usize + 1);
    if num_patterns > MAX_ITEMS {
        return Err(ModError::TooManyPatterns(num_patterns));
    }
    let mut patterns = Vec::with_capacity(num_patterns);
    let mut highest_sample = 0;
    for _ in 0..num_patterns {
        let (pattern, highest) = parse_pattern(&mut cursor, channels as usize)?;
        highest_sample = highest_sample.max(highest);
        patterns.push(pattern);
    }

    let mut samples: Vec<_> = headers
        .into_iter()
        .enumerate()
        .map(|(index, header)| load_sample(&mut cursor, header, index))
        .collect();
    samples.truncate((highest_sample as usize).min(NUM_SAMPLES));

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

    let mut channel_panning = [PAN_LEFT; MAX_CHANNELS];
    for (channel, pan) in channel_panning.iter_mut().enumerate() {
        if matches!(channel & 3, 1 | 2) {
            *pan = PAN_RIGHT;
        }
    }

    tracing::debug!(
        "MOD '{}' ({}): {} channels, {} orders, {} patterns, {} samples",
        title,
        String::from_utf8_lossy(&signature),
        channels,
        song_length,
        patterns.len(),
        samples.len()
    );

    Ok(Module {
        title,
        orders: order_table[..song_length].to_vec(),
        instruments,
        samples,
        patterns,
        channel_panning,
        global_volume: 64,
        restart_position: if restart < RESTART_LIMIT && (restart as usize) < song_length {
            restart
        } else {
            0
        },
        stereo: true,
        instrument_mode: false,
        flags: MasFlags::XM_MODE | MasFlags::OLD_EFFECTS | MasFlags::OLD_MODE,
        ..Module::default()
    })
}
