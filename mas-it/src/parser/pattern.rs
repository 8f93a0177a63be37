//! Pattern parsing

use std::io::Cursor;

use mas_module::{MAX_CHANNELS, MAX_ROWS, Pattern};

use crate::error::ItError;

use super::helpers::{read_u8, read_u16, skip};

/// Parse a pattern record at the cursor: u16 packed length, u16 rows,
/// 4 reserved bytes, then the packed rows
pub(crate) fn parse_pattern(cursor: &mut Cursor<&[u8]>) -> Result<Pattern, ItError> {
    let _packed_length = read_u16(cursor)?;
    let num_rows = read_u16(cursor)?;
    if num_rows == 0 || num_rows as usize > MAX_ROWS {
        return Err(ItError::TooManyRows(num_rows));
    }
    skip(cursor, 4)?;

    unpack_rows(cursor, num_rows as usize)
}

/// Unpack IT-packed pattern rows into a dense grid
///
/// Every cell starts empty (note 250, volume 255). Each row is a list of
/// channel records closed by a zero byte; a record's mask selects which
/// fields are read fresh and which repeat the channel's last value.
pub fn unpack_pattern(data: &[u8], rows: usize) -> Result<Pattern, ItError> {
    if rows == 0 || rows > MAX_ROWS {
        return Err(ItError::TooManyRows(rows.min(u16::MAX as usize) as u16));
    }
    unpack_rows(&mut Cursor::new(data), rows)
}

fn unpack_rows(cursor: &mut Cursor<&[u8]>, rows: usize) -> Result<Pattern, ItError> {
    let mut pattern = Pattern::new(rows);

    let mut prev_mask = [0u8; MAX_CHANNELS];
    let mut prev_note = [0u8; MAX_CHANNELS];
    let mut prev_instrument = [0u8; MAX_CHANNELS];
    let mut prev_volume = [0u8; MAX_CHANNELS];
    let mut prev_effect = [0u8; MAX_CHANNELS];
    let mut prev_param = [0u8; MAX_CHANNELS];

    for row in 0..rows {
        loop {
            let channel_marker = read_u8(cursor)?;
            if channel_marker == 0 {
                break;
            }

            let channel = (channel_marker.wrapping_sub(1) & 63) as usize;
            if channel >= MAX_CHANNELS {
                return Err(ItError::TooManyChannels(channel as u8));
            }

            if channel_marker & 0x80 != 0 {
                prev_mask[channel] = read_u8(cursor)?;
            }
            let mask = prev_mask[channel];

            if mask & 0x01 != 0 {
                prev_note[channel] = read_u8(cursor)?;
            }
            if mask & 0x02 != 0 {
                prev_instrument[channel] = read_u8(cursor)?;
            }
            if mask & 0x04 != 0 {
                prev_volume[channel] = read_u8(cursor)?;
            }
            if mask & 0x08 != 0 {
                prev_effect[channel] = read_u8(cursor)?;
                prev_param[channel] = read_u8(cursor)?;
            }

            let cell = pattern.cell_mut(row, channel);
            if mask & 0x11 != 0 {
                cell.note = prev_note[channel];
            }
            if mask & 0x22 != 0 {
                cell.instrument = prev_instrument[channel];
            }
            if mask & 0x44 != 0 {
                cell.volume = prev_volume[channel];
            }
            if mask & 0x88 != 0 {
                cell.effect = prev_effect[channel];
                cell.param = prev_param[channel];
            }
        }
    }

    Ok(pattern)
}
