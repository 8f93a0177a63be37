//! Pattern parsing

use std::io::Cursor;

use mas_module::{NOTE_EMPTY, NOTEMAP_SIZE, Pattern, PatternCell};
use mas_xm::apply_effect;

use crate::error::ModError;

use super::helpers::read_bytes;

/// Rows of every MOD pattern
pub(crate) const PATTERN_ROWS: usize = 64;

/// Period of the lowest C the note numbering is anchored to
const BASE_PERIOD: f64 = 856.0;

/// Engine note played at [`BASE_PERIOD`]
const BASE_NOTE: i32 = 48;

/// Amiga period to an engine note; 0 and out-of-range periods are empty
pub fn period_to_note(period: u16) -> u8 {
    if period == 0 {
        return NOTE_EMPTY;
    }
    let note = (12.0 * (BASE_PERIOD / period as f64).log2()).round() as i32 + BASE_NOTE;
    if (0..NOTEMAP_SIZE as i32).contains(&note) {
        note as u8
    } else {
        NOTE_EMPTY
    }
}

/// Parse one pattern of 64 rows with `channels` four-byte cells each
///
/// Also returns the highest sample number the pattern plays.
pub(crate) fn parse_pattern(
    cursor: &mut Cursor<&[u8]>,
    channels: usize,
) -> Result<(Pattern, u8), ModError> {
    let mut pattern = Pattern::with_empty_volume(PATTERN_ROWS, 0);
    let mut highest = 0;

    for row in 0..PATTERN_ROWS {
        for channel in 0..channels {
            let bytes = read_bytes::<4>(cursor)?;
            let cell = pattern.cell_mut(row, channel);
            convert_cell(cell, bytes);
            highest = highest.max(cell.instrument);
        }
    }

    Ok((pattern, highest))
}

/// Decode `sssspppp pppppppp ssssEEEE PPPPPPPP` into `cell`
fn convert_cell(cell: &mut PatternCell, [a, b, c, d]: [u8; 4]) {
    let period = ((a & 0x0F) as u16) << 8 | b as u16;
    cell.note = period_to_note(period);
    cell.instrument = (a & 0xF0) | (c >> 4);
    apply_effect(cell, c & 0x0F, d);
}
