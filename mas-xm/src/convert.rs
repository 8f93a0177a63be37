//! FastTracker effects to the IT command set
//!
//! The sound engine plays IT commands (A = 1 ... Z = 26). Most XM effects
//! have a direct counterpart; parameters are rewritten where the IT command
//! reads them differently.

use mas_module::{NOTE_EMPTY, NOTE_OFF, PatternCell};

use crate::effects;

/// IT command number for a letter
const fn it(letter: u8) -> u8 {
    letter - b'@'
}

/// XM volume column "set volume 0"
const VOLUME_SET_BASE: u8 = 0x10;

/// A slide that gives both nibbles keeps only the upward one
fn single_slide(param: u8) -> u8 {
    if param & 0xF0 != 0 { param & 0xF0 } else { param }
}

/// Translate one XM effect column to an IT `(command, parameter)` pair
///
/// Effects the engine cannot express become `(0, 0)`. Set volume and key
/// off are cell-level and handled by [`apply_effect`].
pub fn convert_effect(effect: u8, param: u8) -> (u8, u8) {
    match effect {
        effects::ARPEGGIO if param == 0 => (0, 0),
        effects::ARPEGGIO => (it(b'J'), param),
        // Parameters from E0 up select fine slides in IT
        effects::PORTA_UP => (it(b'F'), param.min(0xDF)),
        effects::PORTA_DOWN => (it(b'E'), param.min(0xDF)),
        effects::TONE_PORTA => (it(b'G'), param),
        effects::VIBRATO => (it(b'H'), param),
        effects::TONE_PORTA_VOL_SLIDE => (it(b'L'), single_slide(param)),
        effects::VIBRATO_VOL_SLIDE => (it(b'K'), single_slide(param)),
        effects::TREMOLO => (it(b'R'), param),
        effects::SET_PANNING => (it(b'X'), param),
        effects::SAMPLE_OFFSET => (it(b'O'), param),
        effects::VOLUME_SLIDE => (it(b'D'), single_slide(param)),
        effects::POSITION_JUMP => (it(b'B'), param),
        effects::PATTERN_BREAK => (it(b'C'), (param >> 4) * 10 + (param & 0x0F)),
        effects::EXTENDED => convert_extended(param),
        effects::SET_SPEED_TEMPO if param == 0 => (0, 0),
        effects::SET_SPEED_TEMPO if param < 0x20 => (it(b'A'), param),
        effects::SET_SPEED_TEMPO => (it(b'T'), param),
        effects::SET_GLOBAL_VOLUME => (it(b'V'), param.min(64) * 2),
        effects::GLOBAL_VOLUME_SLIDE => (it(b'W'), single_slide(param)),
        // IT slides right on the low nibble
        effects::PANNING_SLIDE => (it(b'P'), param.rotate_left(4)),
        effects::MULTI_RETRIG => (it(b'Q'), param),
        effects::TREMOR => (it(b'I'), param),
        effects::EXTRA_FINE_PORTA => match param >> 4 {
            1 => (it(b'F'), 0xE0 | (param & 0x0F)),
            2 => (it(b'E'), 0xE0 | (param & 0x0F)),
            _ => (0, 0),
        },
        _ => (0, 0),
    }
}

/// Exy sub-commands
fn convert_extended(param: u8) -> (u8, u8) {
    let value = param & 0x0F;
    match param >> 4 {
        0x1 => (it(b'F'), 0xF0 | value),
        0x2 => (it(b'E'), 0xF0 | value),
        0x3 => (it(b'S'), 0x10 | value),
        0x4 => (it(b'S'), 0x30 | value),
        0x5 => (it(b'S'), 0x20 | value),
        0x6 => (it(b'S'), 0xB0 | value),
        0x7 => (it(b'S'), 0x40 | value),
        0x8 => (it(b'X'), value * 17),
        0x9 => (it(b'Q'), value),
        0xA => (it(b'D'), (value << 4) | 0x0F),
        0xB => (it(b'D'), 0xF0 | value),
        0xC => (it(b'S'), 0xC0 | value),
        0xD => (it(b'S'), 0xD0 | value),
        0xE => (it(b'S'), 0xE0 | value),
        _ => (0, 0),
    }
}

/// Store an XM effect in `cell`, whose note and volume are already set
///
/// Cxx moves into the volume column unless that column holds a volume
/// command. Kxx on an empty note becomes a note off, delayed by SDx when
/// the parameter is non-zero.
pub fn apply_effect(cell: &mut PatternCell, effect: u8, param: u8) {
    let (effect, param) = match effect {
        effects::SET_VOLUME => {
            if cell.volume == 0 || (VOLUME_SET_BASE..=VOLUME_SET_BASE + 64).contains(&cell.volume)
            {
                cell.volume = VOLUME_SET_BASE + param.min(64);
            }
            (0, 0)
        }
        effects::KEY_OFF if cell.note == NOTE_EMPTY => {
            cell.note = NOTE_OFF;
            if param == 0 {
                (0, 0)
            } else {
                (it(b'S'), 0xD0 | param.min(0x0F))
            }
        }
        effects::KEY_OFF | effects::SET_ENVELOPE_POS => (0, 0),
        _ => convert_effect(effect, param),
    };

    cell.effect = effect;
    cell.param = param;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(volume: u8) -> PatternCell {
        PatternCell {
            volume,
            ..PatternCell::EMPTY
        }
    }

    #[test]
    fn test_direct_commands() {
        assert_eq!(convert_effect(effects::ARPEGGIO, 0), (0, 0));
        assert_eq!(convert_effect(effects::ARPEGGIO, 0x37), (10, 0x37));
        assert_eq!(convert_effect(effects::PORTA_UP, 0xF0), (6, 0xDF));
        assert_eq!(convert_effect(effects::PORTA_DOWN, 0x10), (5, 0x10));
        assert_eq!(convert_effect(effects::SAMPLE_OFFSET, 0x20), (15, 0x20));
        assert_eq!(convert_effect(effects::SET_PANNING, 0x80), (24, 0x80));
        assert_eq!(convert_effect(effects::TREMOR, 0x21), (9, 0x21));
    }

    #[test]
    fn test_pattern_break_is_decimal() {
        assert_eq!(convert_effect(effects::PATTERN_BREAK, 0x32), (3, 32));
        assert_eq!(convert_effect(effects::PATTERN_BREAK, 0x00), (3, 0));
    }

    #[test]
    fn test_speed_and_tempo() {
        assert_eq!(convert_effect(effects::SET_SPEED_TEMPO, 0), (0, 0));
        assert_eq!(convert_effect(effects::SET_SPEED_TEMPO, 0x06), (1, 6));
        assert_eq!(convert_effect(effects::SET_SPEED_TEMPO, 0x7D), (20, 0x7D));
    }

    #[test]
    fn test_slides() {
        assert_eq!(convert_effect(effects::VOLUME_SLIDE, 0x4F), (4, 0x40));
        assert_eq!(convert_effect(effects::VOLUME_SLIDE, 0x0F), (4, 0x0F));
        assert_eq!(convert_effect(effects::VIBRATO_VOL_SLIDE, 0x21), (11, 0x20));
        assert_eq!(convert_effect(effects::PANNING_SLIDE, 0x30), (16, 0x03));
        assert_eq!(convert_effect(effects::SET_GLOBAL_VOLUME, 0x50), (22, 128));
        assert_eq!(convert_effect(effects::EXTRA_FINE_PORTA, 0x13), (6, 0xE3));
        assert_eq!(convert_effect(effects::EXTRA_FINE_PORTA, 0x33), (0, 0));
    }

    #[test]
    fn test_extended() {
        assert_eq!(convert_effect(effects::EXTENDED, 0x12), (6, 0xF2));
        assert_eq!(convert_effect(effects::EXTENDED, 0x63), (19, 0xB3));
        assert_eq!(convert_effect(effects::EXTENDED, 0x8F), (24, 255));
        assert_eq!(convert_effect(effects::EXTENDED, 0xA2), (4, 0x2F));
        assert_eq!(convert_effect(effects::EXTENDED, 0xB2), (4, 0xF2));
        assert_eq!(convert_effect(effects::EXTENDED, 0xD3), (19, 0xD3));
        assert_eq!(convert_effect(effects::EXTENDED, 0xF1), (0, 0));
    }

    #[test]
    fn test_set_volume_uses_volume_column() {
        let mut target = cell(0);
        apply_effect(&mut target, effects::SET_VOLUME, 0x20);
        assert_eq!((target.volume, target.effect, target.param), (0x30, 0, 0));

        let mut target = cell(0x40);
        apply_effect(&mut target, effects::SET_VOLUME, 0x99);
        assert_eq!(target.volume, 0x50);

        // A volume slide in the column is kept
        let mut target = cell(0x62);
        apply_effect(&mut target, effects::SET_VOLUME, 0x20);
        assert_eq!(target.volume, 0x62);
    }

    #[test]
    fn test_key_off() {
        let mut target = cell(0);
        apply_effect(&mut target, effects::KEY_OFF, 0);
        assert_eq!((target.note, target.effect), (NOTE_OFF, 0));

        let mut target = cell(0);
        apply_effect(&mut target, effects::KEY_OFF, 3);
        assert_eq!((target.note, target.effect, target.param), (NOTE_OFF, 19, 0xD3));

        let mut target = PatternCell {
            note: 60,
            ..cell(0)
        };
        apply_effect(&mut target, effects::KEY_OFF, 3);
        assert_eq!((target.note, target.effect), (60, 0));
    }
}
