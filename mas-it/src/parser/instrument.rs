//! Instrument and envelope parsing

use std::io::Cursor;

use mas_module::{
    DuplicateCheckAction, DuplicateCheckType, Envelope, EnvelopeNode, Instrument,
    MAX_ENVELOPE_NODES, NOTEMAP_SIZE, NewNoteAction,
};

use crate::error::ItError;

use super::helpers::{read_bytes, read_string, read_u8, read_u16, skip};

const ENV_ENABLED: u8 = 0x01;
const ENV_LOOP: u8 = 0x02;
const ENV_SUSTAIN: u8 = 0x04;
const ENV_FILTER: u8 = 0x80;

/// Parse an `IMPI` instrument record
pub(crate) fn parse_instrument(cursor: &mut Cursor<&[u8]>) -> Result<Instrument, ItError> {
    // Magic, DOS filename, reserved byte
    skip(cursor, 17)?;

    let nna = NewNoteAction::from_u8(read_u8(cursor)?);
    let dct = DuplicateCheckType::from_u8(read_u8(cursor)?);
    let dca = DuplicateCheckAction::from_u8(read_u8(cursor)?);
    let fadeout = read_u16(cursor)?.min(255) as u8;

    // Pitch-pan separation and center
    skip(cursor, 2)?;

    let global_volume = read_u8(cursor)?;
    let setpan = convert_panning(read_u8(cursor)?);
    let random_volume = read_u8(cursor)?;

    // Random pan, tracker version, sample count, reserved
    skip(cursor, 5)?;

    let name = read_string(&read_bytes::<26>(cursor)?);

    // Filter cutoff/resonance, MIDI channel/program/bank
    skip(cursor, 6)?;

    let mut notemap = [0u16; NOTEMAP_SIZE];
    for entry in &mut notemap {
        *entry = read_u16(cursor)?;
    }

    let volume_envelope = parse_envelope(cursor, false)?;
    let panning_envelope = parse_envelope(cursor, true)?;
    let pitch_envelope = parse_envelope(cursor, true)?;

    Ok(Instrument {
        name,
        global_volume,
        fadeout,
        random_volume,
        nna,
        dct,
        dca,
        setpan,
        notemap,
        // A disabled volume envelope with nodes still exists
        volume_envelope: Some(volume_envelope).filter(|env| !env.nodes.is_empty()),
        panning_envelope: Some(panning_envelope).filter(|env| env.enabled),
        pitch_envelope: Some(pitch_envelope).filter(|env| env.enabled),
    })
}

/// IT default pan (bit 7 set = used, 0-64) to engine setpan (bit 7 clear = used, 0-127)
fn convert_panning(dfp: u8) -> u8 {
    let position = ((dfp & 0x7F) as u16 * 2).min(127) as u8;
    ((dfp & 0x80) | position) ^ 0x80
}

/// Parse one 82-byte envelope block
///
/// Pan and pitch envelopes store values centered on zero; `centered`
/// shifts them up by 32 unless the envelope drives the filter.
fn parse_envelope(cursor: &mut Cursor<&[u8]>, centered: bool) -> Result<Envelope, ItError> {
    let flags = read_u8(cursor)?;
    let node_count = (read_u8(cursor)? as usize).min(MAX_ENVELOPE_NODES);
    let loop_start = read_u8(cursor)?;
    let loop_end = read_u8(cursor)?;
    let sustain_start = read_u8(cursor)?;
    let sustain_end = read_u8(cursor)?;

    let filter = flags & ENV_FILTER != 0;
    let offset = if centered && !filter { 32 } else { 0 };

    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..MAX_ENVELOPE_NODES {
        let value = read_u8(cursor)?.wrapping_add(offset);
        let tick = read_u16(cursor)?;
        if nodes.len() < node_count {
            nodes.push(EnvelopeNode { tick, value });
        }
    }

    // Reserved
    skip(cursor, 1)?;

    Ok(Envelope {
        nodes,
        loop_range: (flags & ENV_LOOP != 0).then_some((loop_start, loop_end)),
        sustain_range: (flags & ENV_SUSTAIN != 0).then_some((sustain_start, sustain_end)),
        enabled: flags & ENV_ENABLED != 0,
        filter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_block(flags: u8, points: &[(u8, u16)]) -> Vec<u8> {
        let mut block = vec![flags, points.len() as u8, 0, 1, 1, 1];
        for i in 0..MAX_ENVELOPE_NODES {
            let (value, tick) = points.get(i).copied().unwrap_or((0, 0));
            block.push(value);
            block.extend_from_slice(&tick.to_le_bytes());
        }
        block.push(0);
        block
    }

    #[test]
    fn test_convert_panning() {
        assert_eq!(convert_panning(0x80 | 32), 64);
        assert_eq!(convert_panning(0x80 | 64), 127);
        assert_eq!(convert_panning(32), 0x80 | 64);
        assert_eq!(convert_panning(0), 0x80);
    }

    #[test]
    fn test_envelope_flags_and_ranges() {
        let block = envelope_block(
            ENV_ENABLED | ENV_SUSTAIN,
            &[(64, 0), (32, 10), (0, 20)],
        );
        let env = parse_envelope(&mut Cursor::new(&block[..]), false).unwrap();

        assert!(env.enabled);
        assert!(!env.filter);
        assert_eq!(env.loop_range, None);
        assert_eq!(env.sustain_range, Some((1, 1)));
        assert_eq!(env.nodes.len(), 3);
        assert_eq!(env.nodes[1], EnvelopeNode { tick: 10, value: 32 });
    }

    #[test]
    fn test_centered_envelope_offset() {
        let block = envelope_block(ENV_ENABLED, &[(0xE0, 0), (32, 4)]);
        let env = parse_envelope(&mut Cursor::new(&block[..]), true).unwrap();
        assert_eq!(env.nodes[0].value, 0);
        assert_eq!(env.nodes[1].value, 64);

        let block = envelope_block(ENV_ENABLED | ENV_FILTER, &[(10, 0)]);
        let env = parse_envelope(&mut Cursor::new(&block[..]), true).unwrap();
        assert!(env.filter);
        assert_eq!(env.nodes[0].value, 10);
    }

    #[test]
    fn test_parse_instrument_record() {
        let mut record = b"IMPI".to_vec();
        record.extend_from_slice(&[0; 13]);
        record.extend_from_slice(&[1, 2, 1]);
        record.extend_from_slice(&1000u16.to_le_bytes());
        record.extend_from_slice(&[0, 0, 100, 0x80 | 16, 25]);
        record.extend_from_slice(&[0; 5]);
        let mut name = [0u8; 26];
        name[..4].copy_from_slice(b"bass");
        record.extend_from_slice(&name);
        record.extend_from_slice(&[0; 6]);
        for note in 0..NOTEMAP_SIZE as u16 {
            record.extend_from_slice(&(note | (3 << 8)).to_le_bytes());
        }
        record.extend(envelope_block(0, &[(64, 0), (0, 8)]));
        record.extend(envelope_block(0, &[(0, 0)]));
        record.extend(envelope_block(ENV_ENABLED, &[(0, 0)]));

        let inst = parse_instrument(&mut Cursor::new(&record[..])).unwrap();

        assert_eq!(inst.name, "bass");
        assert_eq!(inst.nna, NewNoteAction::Continue);
        assert_eq!(inst.dct, DuplicateCheckType::Sample);
        assert_eq!(inst.dca, DuplicateCheckAction::NoteOff);
        assert_eq!(inst.fadeout, 255);
        assert_eq!(inst.global_volume, 100);
        assert_eq!(inst.setpan, 32);
        assert_eq!(inst.random_volume, 25);
        assert_eq!(inst.uniform_sample(), Some(3));

        // Disabled volume envelope with nodes is kept, disabled pan is dropped
        let volume = inst.volume_envelope.as_ref().unwrap();
        assert!(!volume.enabled);
        assert!(inst.panning_envelope.is_none());
        assert_eq!(inst.pitch_envelope.as_ref().unwrap().nodes[0].value, 32);
        assert_eq!(
            inst.envelope_flags(),
            Instrument::FLAG_VOLUME_EXISTS | Instrument::FLAG_PITCH_EXISTS
        );
    }
}
