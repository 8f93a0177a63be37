//! MAS pattern compression
//!
//! Rows are packed IT-style. Each non-empty cell becomes a record:
//!
//! ```text
//! u8 channel + 1        bit 7 set when a new mask byte follows
//! [u8 mask]             only when the mask changed for this channel
//! [u8 note] [u8 inst] [u8 vol] [u8 fx, u8 param]
//! ```
//!
//! A zero byte ends each row. Mask bits 0-3 mean "read a new value",
//! bits 4-7 mean "the field is present" (reuse the last value when the
//! low bit is clear).

use crate::{MAX_CHANNELS, NOTE_CUT, NOTE_EMPTY, NOTE_OFF, Pattern};

const MASK_NOTE: u8 = 0x01;
const MASK_INSTRUMENT: u8 = 0x02;
const MASK_VOLUME: u8 = 0x04;
const MASK_EFFECT: u8 = 0x08;
const HAS_NOTE: u8 = 0x10;
const HAS_INSTRUMENT: u8 = 0x20;
const HAS_VOLUME: u8 = 0x40;
const HAS_EFFECT: u8 = 0x80;

const CHANNEL_NEW_MASK: u8 = 0x80;

/// Value the per-channel memory holds when it must not match anything
const UNSET: u16 = 256;

/// Per-channel memory of the last written fields
#[derive(Clone, Copy)]
struct ChannelMemory {
    mask: u16,
    note: u16,
    instrument: u16,
    volume: u16,
    effect: u16,
    param: u16,
}

/// Note cut and note off end the channel's note
fn releases_note(note: u8) -> bool {
    note == NOTE_CUT || note == NOTE_OFF
}

impl ChannelMemory {
    const RESET: Self = Self {
        mask: UNSET,
        note: UNSET,
        instrument: UNSET,
        volume: UNSET,
        effect: UNSET,
        param: UNSET,
    };
}

/// Pack a pattern, starting with its `rows - 1` byte
///
/// Row 0 and every marked row reset the channel memory, so playback can
/// start decoding at any of them.
pub fn pack_pattern(pattern: &Pattern, empty_volume: u8) -> Vec<u8> {
    let mut output = Vec::new();
    output.push((pattern.num_rows() - 1) as u8);

    let mut memory = [ChannelMemory::RESET; MAX_CHANNELS];

    for (row_index, row) in pattern.rows().enumerate() {
        let marked = row_index == 0 || pattern.marks.get(row_index).copied().unwrap_or(false);
        if marked {
            memory = [ChannelMemory::RESET; MAX_CHANNELS];
        }

        for (channel, cell) in row.iter().enumerate() {
            if cell.is_empty(empty_volume) {
                continue;
            }

            let last = &mut memory[channel];
            let mut mask = 0u8;

            if cell.note != NOTE_EMPTY {
                mask |= MASK_NOTE | HAS_NOTE;
            }
            if cell.instrument != 0 {
                mask |= MASK_INSTRUMENT | HAS_INSTRUMENT;
            }
            // Note off and cut never carry an instrument
            if releases_note(cell.note) {
                mask &= !(HAS_NOTE | HAS_INSTRUMENT);
            }
            if cell.volume != empty_volume {
                mask |= MASK_VOLUME | HAS_VOLUME;
            }
            if cell.has_effect() {
                mask |= MASK_EFFECT | HAS_EFFECT;
            }

            if mask & MASK_NOTE != 0 {
                if cell.note as u16 == last.note {
                    mask &= !MASK_NOTE;
                } else if releases_note(cell.note) {
                    last.note = UNSET;
                } else {
                    last.note = cell.note as u16;
                }
            }
            if mask & MASK_INSTRUMENT != 0 {
                if cell.instrument as u16 == last.instrument {
                    mask &= !MASK_INSTRUMENT;
                } else {
                    last.instrument = cell.instrument as u16;
                }
            }
            if mask & MASK_VOLUME != 0 {
                if cell.volume as u16 == last.volume {
                    mask &= !MASK_VOLUME;
                } else {
                    last.volume = cell.volume as u16;
                }
            }
            if mask & MASK_EFFECT != 0 {
                if cell.effect as u16 == last.effect && cell.param as u16 == last.param {
                    mask &= !MASK_EFFECT;
                } else {
                    last.effect = cell.effect as u16;
                    last.param = cell.param as u16;
                }
            }

            let mut chanvar = channel as u8 + 1;
            if mask as u16 != last.mask {
                chanvar |= CHANNEL_NEW_MASK;
                last.mask = mask as u16;
            }

            output.push(chanvar);
            if chanvar & CHANNEL_NEW_MASK != 0 {
                output.push(mask);
            }
            if mask & MASK_NOTE != 0 {
                output.push(cell.note);
            }
            if mask & MASK_INSTRUMENT != 0 {
                output.push(cell.instrument);
            }
            if mask & MASK_VOLUME != 0 {
                output.push(cell.volume);
            }
            if mask & MASK_EFFECT != 0 {
                output.push(cell.effect);
                output.push(cell.param);
            }
        }

        output.push(0);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NOTE_OFF, PatternCell, VOLUME_EMPTY};

    fn note(note: u8, instrument: u8) -> PatternCell {
        PatternCell {
            note,
            instrument,
            ..PatternCell::EMPTY
        }
    }

    #[test]
    fn test_empty_pattern() {
        let pattern = Pattern::new(4);
        assert_eq!(pack_pattern(&pattern, VOLUME_EMPTY), vec![3, 0, 0, 0, 0]);
    }

    #[test]
    fn test_repeated_note_reuses_mask_and_value() {
        let mut pattern = Pattern::new(2);
        *pattern.cell_mut(0, 0) = note(60, 1);
        *pattern.cell_mut(1, 0) = note(60, 1);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(
            packed,
            vec![
                1,
                // row 0: new mask, note and instrument
                0x81, 0x33, 60, 1, 0,
                // row 1: mask changes to "present, reuse"
                0x81, 0x30, 0,
            ]
        );
    }

    #[test]
    fn test_same_mask_omits_mask_byte() {
        let mut pattern = Pattern::new(2);
        *pattern.cell_mut(0, 2) = note(60, 1);
        *pattern.cell_mut(1, 2) = note(62, 2);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![1, 0x83, 0x33, 60, 1, 0, 0x03, 62, 2, 0]);
    }

    #[test]
    fn test_marked_row_resets_memory() {
        let mut pattern = Pattern::new(2);
        *pattern.cell_mut(0, 0) = note(60, 1);
        *pattern.cell_mut(1, 0) = note(60, 1);
        pattern.mark_row(1);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![1, 0x81, 0x33, 60, 1, 0, 0x81, 0x33, 60, 1, 0]);
    }

    #[test]
    fn test_note_off_is_never_reused() {
        let mut pattern = Pattern::new(2);
        *pattern.cell_mut(0, 0) = note(NOTE_OFF, 0);
        *pattern.cell_mut(1, 0) = note(NOTE_OFF, 0);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![1, 0x81, 0x01, NOTE_OFF, 0, 0x01, NOTE_OFF, 0]);
    }

    #[test]
    fn test_unused_note_values_keep_memory() {
        let mut pattern = Pattern::new(2);
        *pattern.cell_mut(0, 0) = note(252, 1);
        *pattern.cell_mut(1, 0) = note(252, 1);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![1, 0x81, 0x33, 252, 1, 0, 0x81, 0x30, 0]);
    }

    #[test]
    fn test_note_cut_drops_instrument() {
        let mut pattern = Pattern::new(1);
        *pattern.cell_mut(0, 0) = note(NOTE_CUT, 3);

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![0, 0x81, 0x03, NOTE_CUT, 3, 0]);
    }

    #[test]
    fn test_volume_and_effect_bits() {
        let mut pattern = Pattern::new(1);
        *pattern.cell_mut(0, 0) = PatternCell {
            volume: 32,
            effect: 1,
            param: 6,
            ..PatternCell::EMPTY
        };

        let packed = pack_pattern(&pattern, VOLUME_EMPTY);
        assert_eq!(packed, vec![0, 0x81, 0xCC, 32, 1, 6, 0]);
    }

    #[test]
    fn test_xm_empty_volume() {
        let mut pattern = Pattern::new(1);
        pattern.cell_mut(0, 0).volume = 0;

        assert_eq!(pack_pattern(&pattern, 0), vec![0, 0]);
        assert_eq!(pack_pattern(&pattern, VOLUME_EMPTY), vec![0, 0x81, 0x44, 0, 0]);
    }
}
