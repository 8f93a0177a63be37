//! Pattern parsing

use std::io::Cursor;

use mas_module::{NOTE_CUT, NOTE_EMPTY, Pattern};

use crate::error::S3mError;

use super::PATTERN_ROWS;
use super::helpers::{read_u8, read_u16};

const WHAT_CHANNEL: u8 = 0x1F;
const WHAT_NOTE: u8 = 0x20;
const WHAT_VOLUME: u8 = 0x40;
const WHAT_EFFECT: u8 = 0x80;

/// S3M note bytes: high nibble octave, low nibble semitone
const S3M_NOTE_EMPTY: u8 = 255;
const S3M_NOTE_CUT: u8 = 254;

/// IT command numbers that need their parameter rewritten
const EFFECT_BREAK: u8 = b'C' - b'@';
const EFFECT_GLOBAL_VOLUME: u8 = b'V' - b'@';
const EFFECT_PANNING: u8 = b'X' - b'@';

/// Parse a pattern record: u16 packed length, then 64 rows of channel
/// records, each row closed by a zero byte
pub(crate) fn parse_pattern(cursor: &mut Cursor<&[u8]>) -> Result<Pattern, S3mError> {
    let _packed_length = read_u16(cursor)?;
    let mut pattern = Pattern::new(PATTERN_ROWS);

    for row in 0..PATTERN_ROWS {
        loop {
            let what = read_u8(cursor)?;
            if what == 0 {
                break;
            }

            let cell = pattern.cell_mut(row, (what & WHAT_CHANNEL) as usize);
            if what & WHAT_NOTE != 0 {
                cell.note = convert_note(read_u8(cursor)?);
                cell.instrument = read_u8(cursor)?;
            }
            if what & WHAT_VOLUME != 0 {
                cell.volume = read_u8(cursor)?.min(64);
            }
            if what & WHAT_EFFECT != 0 {
                let effect = read_u8(cursor)?;
                let param = read_u8(cursor)?;
                (cell.effect, cell.param) = convert_effect(effect, param);
            }
        }
    }

    Ok(pattern)
}

/// Octave/semitone byte to an engine note
fn convert_note(note: u8) -> u8 {
    match note {
        S3M_NOTE_EMPTY => NOTE_EMPTY,
        S3M_NOTE_CUT => NOTE_CUT,
        _ if note & 0x0F > 11 => NOTE_EMPTY,
        _ => {
            let value = (note >> 4) as u16 * 12 + (note & 0x0F) as u16 + 12;
            if value < 120 { value as u8 } else { NOTE_EMPTY }
        }
    }
}

/// Adjust the few parameters the engine reads differently
///
/// Pattern break is stored in BCD. Panning covers 0-0x80 and global volume
/// 0-64, both doubled to the engine range; surround panning plays centered.
fn convert_effect(effect: u8, param: u8) -> (u8, u8) {
    match effect {
        255 => (0, 0),
        EFFECT_BREAK => (effect, (param >> 4) * 10 + (param & 0x0F)),
        EFFECT_PANNING if param > 0x80 => (effect, 0x80),
        EFFECT_PANNING => (effect, (param as u16 * 2).min(255) as u8),
        EFFECT_GLOBAL_VOLUME => (effect, param.min(64) * 2),
        _ => (effect, param),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_module::PatternCell;

    /// Packed length prefix, the given records, then closes every row
    fn pattern_bytes(records: &[u8], closed_rows: usize) -> Vec<u8> {
        let mut data = vec![0, 0];
        data.extend_from_slice(records);
        data.resize(data.len() + PATTERN_ROWS - closed_rows, 0);
        data
    }

    #[test]
    fn test_parse_rows() {
        let data = pattern_bytes(
            &[
                // Row 0: channel 2 C-4 inst 3 vol 40 A06
                0x20 | 0x40 | 0x80 | 2, 0x40, 3, 40, 1, 6, 0,
                // Row 1: channel 0 note cut
                0x20, 254, 0, 0,
            ],
            2,
        );
        let pattern = parse_pattern(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(pattern.num_rows(), PATTERN_ROWS);
        assert_eq!(
            *pattern.cell(0, 2),
            PatternCell {
                note: 60,
                instrument: 3,
                volume: 40,
                effect: 1,
                param: 6
            }
        );
        assert_eq!(pattern.cell(1, 0).note, NOTE_CUT);
        assert!(pattern.cell(0, 0).is_empty(255));
        assert!(pattern.cell(63, 31).is_empty(255));
    }

    #[test]
    fn test_truncated_pattern() {
        let data = [0, 0, 0x20, 0x40];
        assert!(matches!(
            parse_pattern(&mut Cursor::new(&data[..])),
            Err(S3mError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_convert_note() {
        assert_eq!(convert_note(0x00), 12);
        assert_eq!(convert_note(0x4B), 71);
        assert_eq!(convert_note(0x8B), 119);
        assert_eq!(convert_note(0x90), NOTE_EMPTY);
        assert_eq!(convert_note(0x4C), NOTE_EMPTY);
        assert_eq!(convert_note(255), NOTE_EMPTY);
        assert_eq!(convert_note(254), NOTE_CUT);
    }

    #[test]
    fn test_convert_effect() {
        assert_eq!(convert_effect(255, 0x12), (0, 0));
        assert_eq!(convert_effect(EFFECT_BREAK, 0x32), (3, 32));
        assert_eq!(convert_effect(EFFECT_PANNING, 0x40), (24, 0x80));
        assert_eq!(convert_effect(EFFECT_PANNING, 0x80), (24, 0xFF));
        assert_eq!(convert_effect(EFFECT_PANNING, 0xA4), (24, 0x80));
        assert_eq!(convert_effect(EFFECT_GLOBAL_VOLUME, 0x30), (22, 0x60));
        assert_eq!(convert_effect(4, 0x0F), (4, 0x0F));
    }
}
