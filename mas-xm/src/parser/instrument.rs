//! Instrument, envelope, and sample parsing

use std::io::Cursor;

use mas_module::{
    AutoVibrato, Envelope, EnvelopeNode, Instrument, LoopKind, NOTEMAP_SIZE, Sample, SampleData,
};

use crate::NOTE_MAX;
use crate::error::XmError;

use super::helpers::{read_bytes, read_string, read_u8, read_u16, read_u32, seek, skip};

/// Envelope points stored per envelope
const ENVELOPE_POINTS: usize = 12;

const ENV_ENABLED: u8 = 0x01;
const ENV_SUSTAIN: u8 = 0x02;
const ENV_LOOP: u8 = 0x04;

const SAMPLE_LOOP_MASK: u8 = 0x03;
const SAMPLE_16BIT: u8 = 0x10;

/// Sample header size in version 0x0104 files
const SAMPLE_HEADER_SIZE: u32 = 40;

/// Reserved byte value of ModPlug ADPCM-packed samples
const PACKING_ADPCM: u8 = 0xAD;

/// Base rate of an untransposed sample
const BASE_RATE: f64 = 8363.0;

/// Sample header fields kept until the data is read
struct SampleHeader {
    sample: Sample,
    byte_len: u32,
    sixteen_bit: bool,
}

/// Envelope block as stored in the instrument header
struct RawEnvelope {
    points: [(u16, u16); ENVELOPE_POINTS],
    count: u8,
    sustain: u8,
    loop_start: u8,
    loop_end: u8,
    kind: u8,
}

/// Parse one instrument and its samples
///
/// `first_sample` is the module sample count before this instrument;
/// notemap entries point past it. Returns the instrument and its samples
/// in file order.
pub(crate) fn parse_instrument(
    cursor: &mut Cursor<&[u8]>,
    index: u16,
    first_sample: usize,
) -> Result<(Instrument, Vec<Sample>), XmError> {
    let header_start = cursor.position();
    let header_size = read_u32(cursor)?;

    let name = read_string(&read_bytes::<22>(cursor)?);
    // Instrument type
    read_u8(cursor)?;
    let num_samples = read_u16(cursor)?;

    if num_samples == 0 {
        seek(cursor, header_start + header_size as u64)?;
        return Ok((
            Instrument {
                name,
                global_volume: 128,
                ..Instrument::default()
            },
            Vec::new(),
        ));
    }

    let sample_header_size = read_u32(cursor)?;
    let keymap = read_bytes::<{ NOTE_MAX as usize }>(cursor)?;

    let mut volume = RawEnvelope::read_points(cursor)?;
    let mut panning = RawEnvelope::read_points(cursor)?;
    volume.count = read_u8(cursor)?;
    panning.count = read_u8(cursor)?;
    volume.sustain = read_u8(cursor)?;
    volume.loop_start = read_u8(cursor)?;
    volume.loop_end = read_u8(cursor)?;
    panning.sustain = read_u8(cursor)?;
    panning.loop_start = read_u8(cursor)?;
    panning.loop_end = read_u8(cursor)?;
    volume.kind = read_u8(cursor)?;
    panning.kind = read_u8(cursor)?;

    let vibrato_type = read_u8(cursor)?;
    let vibrato_sweep = read_u8(cursor)?;
    let vibrato_depth = read_u8(cursor)?;
    let vibrato_rate = read_u8(cursor)?;
    let fadeout = read_u16(cursor)?;

    seek(cursor, header_start + header_size as u64)?;

    let vibrato = AutoVibrato {
        waveform: convert_waveform(vibrato_type),
        depth: vibrato_depth,
        speed: vibrato_rate,
        rate: sweep_rate(vibrato_depth, vibrato_sweep),
    };

    let mut headers = Vec::with_capacity(num_samples as usize);
    for sample_index in 0..num_samples {
        let header = parse_sample_header(cursor, vibrato)
            .and_then(|header| header.ok_or(XmError::UnsupportedSample(sample_index, index)))?;
        headers.push(header);
        skip(
            cursor,
            sample_header_size.saturating_sub(SAMPLE_HEADER_SIZE) as u64,
        )?;
    }

    let mut samples = Vec::with_capacity(headers.len());
    for header in headers {
        samples.push(load_sample_data(cursor, header)?);
    }

    let mut notemap = [0u16; NOTEMAP_SIZE];
    for (note, entry) in notemap.iter_mut().enumerate() {
        let key = keymap[note.saturating_sub(12).min(NOTE_MAX as usize - 1)] as usize;
        let sample = if key < samples.len() {
            (first_sample + key + 1) as u16
        } else {
            0
        };
        *entry = note as u16 | (sample << 8);
    }

    let instrument = Instrument {
        name,
        global_volume: 128,
        fadeout: ((fadeout as u32 + 16) / 32).min(255) as u8,
        notemap,
        volume_envelope: volume.to_envelope(),
        panning_envelope: panning.to_envelope().filter(|env| env.enabled),
        ..Instrument::default()
    };

    Ok((instrument, samples))
}

impl RawEnvelope {
    fn read_points(cursor: &mut Cursor<&[u8]>) -> Result<Self, XmError> {
        let mut points = [(0u16, 0u16); ENVELOPE_POINTS];
        for point in &mut points {
            *point = (read_u16(cursor)?, read_u16(cursor)?);
        }
        Ok(Self {
            points,
            count: 0,
            sustain: 0,
            loop_start: 0,
            loop_end: 0,
            kind: 0,
        })
    }

    /// Envelope with at least one node, or `None`
    ///
    /// Values (0-64) are used as is; pan envelopes are already centered on
    /// 32. Sustain and loop points past the last node are dropped.
    fn to_envelope(&self) -> Option<Envelope> {
        let count = (self.count as usize).min(ENVELOPE_POINTS);
        if count == 0 {
            return None;
        }

        let nodes = self.points[..count]
            .iter()
            .map(|&(tick, value)| EnvelopeNode {
                tick,
                value: value.min(64) as u8,
            })
            .collect();

        let in_range = |point: u8| (point as usize) < count;
        let sustain_range = (self.kind & ENV_SUSTAIN != 0 && in_range(self.sustain))
            .then_some((self.sustain, self.sustain));
        let loop_range = (self.kind & ENV_LOOP != 0
            && in_range(self.loop_end)
            && self.loop_start <= self.loop_end)
            .then_some((self.loop_start, self.loop_end));

        Some(Envelope {
            nodes,
            loop_range,
            sustain_range,
            enabled: self.kind & ENV_ENABLED != 0,
            filter: false,
        })
    }
}

/// XM vibrato type (sine, square, ramp down, ramp up) to the IT waveform
/// (sine, ramp down, square, random); ramp up has no counterpart
fn convert_waveform(kind: u8) -> u8 {
    match kind {
        1 => 2,
        2 | 3 => 1,
        _ => 0,
    }
}

/// Per-tick depth increase that reaches full depth after `sweep` ticks
fn sweep_rate(depth: u8, sweep: u8) -> u16 {
    let full = (depth as u32) << 8;
    if sweep == 0 {
        full as u16
    } else {
        (full / sweep as u32) as u16
    }
}

/// Rate of middle C for a relative note and finetune (1/128 semitone)
fn sample_rate(relative_note: i8, finetune: i8) -> u32 {
    let semitones = relative_note as f64 + finetune as f64 / 128.0;
    let rate = BASE_RATE * 2.0_f64.powf(semitones / 12.0);
    rate.round() as u32
}

/// Parse one 40-byte sample header; `None` for packed sample data
fn parse_sample_header(
    cursor: &mut Cursor<&[u8]>,
    vibrato: AutoVibrato,
) -> Result<Option<SampleHeader>, XmError> {
    let byte_len = read_u32(cursor)?;
    let loop_start = read_u32(cursor)?;
    let loop_length = read_u32(cursor)?;
    let default_volume = read_u8(cursor)?.min(64);
    let finetune = read_u8(cursor)? as i8;
    let kind = read_u8(cursor)?;
    let panning = read_u8(cursor)?;
    let relative_note = read_u8(cursor)? as i8;
    let packing = read_u8(cursor)?;
    let name = read_string(&read_bytes::<22>(cursor)?);

    if packing == PACKING_ADPCM {
        return Ok(None);
    }

    let sixteen_bit = kind & SAMPLE_16BIT != 0;
    let frame = if sixteen_bit { 2 } else { 1 };
    let loop_start = loop_start / frame;
    let loop_length = loop_length / frame;

    let loop_kind = match kind & SAMPLE_LOOP_MASK {
        _ if loop_length == 0 => LoopKind::None,
        0 => LoopKind::None,
        1 => LoopKind::Forward,
        _ => LoopKind::PingPong,
    };
    let (loop_start, loop_end) = if loop_kind == LoopKind::None {
        (0, 0)
    } else {
        (loop_start, loop_start + loop_length)
    };

    Ok(Some(SampleHeader {
        sample: Sample {
            name,
            default_volume,
            default_panning: 0x80 | (panning >> 1),
            frequency: sample_rate(relative_note, finetune),
            loop_start,
            loop_end,
            loop_kind,
            vibrato,
            ..Sample::default()
        },
        byte_len,
        sixteen_bit,
    }))
}

/// Read delta-coded sample data, producing unsigned frames
fn load_sample_data(cursor: &mut Cursor<&[u8]>, header: SampleHeader) -> Result<Sample, XmError> {
    let start = cursor.position() as usize;
    let end = start + header.byte_len as usize;
    let bytes = cursor
        .get_ref()
        .get(start..end)
        .ok_or(XmError::UnexpectedEof)?;

    let data = if header.sixteen_bit {
        let mut old = 0i16;
        SampleData::Sixteen(
            bytes
                .chunks_exact(2)
                .map(|b| {
                    old = old.wrapping_add(i16::from_le_bytes([b[0], b[1]]));
                    old as u16 ^ 0x8000
                })
                .collect(),
        )
    } else {
        let mut old = 0i8;
        SampleData::Eight(
            bytes
                .iter()
                .map(|&b| {
                    old = old.wrapping_add(b as i8);
                    old as u8 ^ 0x80
                })
                .collect(),
        )
    };

    cursor.set_position(end as u64);
    Ok(Sample {
        data,
        ..header.sample
    })
}
