//! Pattern parsing and note unpacking

use std::io::Cursor;

use mas_module::{MAX_ROWS, NOTE_EMPTY, NOTE_OFF, Pattern, PatternCell};

use crate::convert::apply_effect;
use crate::error::XmError;
use crate::{NOTE_KEY_OFF, NOTE_MAX};

use super::helpers::{read_u8, read_u16, read_u32, seek};

/// Packed note: bit 7 set, bits 0-4 select the fields that follow
const PACKED: u8 = 0x80;
const PACKED_NOTE: u8 = 0x01;
const PACKED_INSTRUMENT: u8 = 0x02;
const PACKED_VOLUME: u8 = 0x04;
const PACKED_EFFECT: u8 = 0x08;
const PACKED_PARAM: u8 = 0x10;

/// One note slot as stored in the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct XmNote {
    pub note: u8,
    pub instrument: u8,
    pub volume: u8,
    pub effect: u8,
    pub param: u8,
}

/// Parse one pattern header and its packed data
///
/// The header length counts from the start of its own length field. A
/// pattern with no packed data is all empty rows.
pub(crate) fn parse_pattern(
    cursor: &mut Cursor<&[u8]>,
    index: u16,
    num_channels: usize,
) -> Result<Pattern, XmError> {
    let header_start = cursor.position();
    let header_length = read_u32(cursor)?;

    // Packing type, always 0
    read_u8(cursor)?;

    let num_rows = read_u16(cursor)?;
    if num_rows == 0 || num_rows as usize > MAX_ROWS {
        return Err(XmError::InvalidPattern(index));
    }
    let packed_size = read_u16(cursor)?;

    seek(cursor, header_start + header_length as u64)?;
    let data_start = cursor.position();

    let mut pattern = Pattern::with_empty_volume(num_rows as usize, 0);
    if packed_size > 0 {
        for row in 0..num_rows as usize {
            for channel in 0..num_channels {
                *pattern.cell_mut(row, channel) = convert_note(unpack_note(cursor)?);
            }
        }
    }

    seek(cursor, data_start + packed_size as u64)?;
    Ok(pattern)
}

/// Unpack a single note, packed or as five raw bytes
pub(crate) fn unpack_note(cursor: &mut Cursor<&[u8]>) -> Result<XmNote, XmError> {
    let first = read_u8(cursor)?;

    if first & PACKED == 0 {
        return Ok(XmNote {
            note: first,
            instrument: read_u8(cursor)?,
            volume: read_u8(cursor)?,
            effect: read_u8(cursor)?,
            param: read_u8(cursor)?,
        });
    }

    let mut note = XmNote::default();
    if first & PACKED_NOTE != 0 {
        note.note = read_u8(cursor)?;
    }
    if first & PACKED_INSTRUMENT != 0 {
        note.instrument = read_u8(cursor)?;
    }
    if first & PACKED_VOLUME != 0 {
        note.volume = read_u8(cursor)?;
    }
    if first & PACKED_EFFECT != 0 {
        note.effect = read_u8(cursor)?;
    }
    if first & PACKED_PARAM != 0 {
        note.param = read_u8(cursor)?;
    }
    Ok(note)
}

/// XM note slot to an engine cell
///
/// XM C-0 (1) is IT note 12; the volume column is kept as written.
pub(crate) fn convert_note(raw: XmNote) -> PatternCell {
    let note = match raw.note {
        1..=NOTE_MAX => raw.note + 11,
        NOTE_KEY_OFF => NOTE_OFF,
        _ => NOTE_EMPTY,
    };

    let mut cell = PatternCell {
        note,
        instrument: raw.instrument,
        volume: raw.volume,
        effect: 0,
        param: 0,
    };
    apply_effect(&mut cell, raw.effect, raw.param);
    cell
}
