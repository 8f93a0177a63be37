//! Sample records and sample data blocks

use crate::{FILLER, MAS_VERSION, MasError, Sample, SampleData, SampleFormat, Target, TargetConfig};

use super::ByteWriter;

/// Bank index written for samples stored inline
const INLINE_SAMPLE: u16 = 0xFFFF;

/// Guard frames appended after the payload, in bytes
const PAYLOAD_PAD: u32 = 4;

const NDS_REPEAT_FORWARD: u8 = 1;
const NDS_REPEAT_OFF: u8 = 2;

/// Write the hardware sample header followed by the payload
///
/// The payload is followed by a copy of the first frames of the loop (or
/// silence) so the mixer can interpolate past the end.
pub fn write_sample_data(
    w: &mut ByteWriter,
    sample: &Sample,
    config: &TargetConfig,
) -> Result<(), MasError> {
    let format = sample.format();
    let unsupported = || MasError::UnsupportedFormat {
        name: sample.name.clone(),
        format,
        target: config.target,
    };

    match config.target {
        Target::Gba => {
            if format != SampleFormat::Unsigned8 {
                return Err(unsupported());
            }
            w.write_u32(sample.len());
            w.write_u32(if sample.is_looped() {
                sample.loop_len()
            } else {
                0xFFFF_FFFF
            });
            w.write_u8(0);
            w.write_u8(FILLER);
            w.write_u16(((sample.frequency as u64 * 1024 + 7884) / 15768) as u16);
        }
        Target::Nds => {
            let code = format.nds_code().ok_or_else(unsupported)?;
            let unit = if sample.data.is_sixteen_bit() { 2 } else { 4 };
            if sample.is_looped() {
                w.write_u32(sample.loop_start / unit);
                w.write_u32(sample.loop_len() / unit);
            } else {
                w.write_u32(0);
                w.write_u32(sample.len() / unit);
            }
            w.write_u8(code);
            w.write_u8(if sample.is_looped() {
                NDS_REPEAT_FORWARD
            } else {
                NDS_REPEAT_OFF
            });
            w.write_u16(((sample.frequency as u64 * 1024 + 16384) / 32768) as u16);
            w.write_u32(0);
        }
    }

    let loop_start = sample.loop_start as usize;
    match &sample.data {
        SampleData::Sixteen(data) => {
            for &value in data {
                w.write_u16(value);
            }
            let guard = data
                .get(loop_start..loop_start + 2)
                .filter(|_| sample.is_looped());
            match guard {
                Some(frames) => frames.iter().for_each(|&v| w.write_u16(v)),
                None => w.fill(0, PAYLOAD_PAD as usize),
            }
        }
        SampleData::Eight(data) | SampleData::Adpcm(data) => {
            w.write_bytes(data);
            let guard = data
                .get(loop_start..loop_start + PAYLOAD_PAD as usize)
                .filter(|_| sample.is_looped());
            match guard {
                Some(bytes) => w.write_bytes(bytes),
                None => {
                    let silence = match config.target {
                        Target::Gba => 128,
                        Target::Nds => 0,
                    };
                    w.fill(silence, PAYLOAD_PAD as usize);
                }
            }
        }
    }

    Ok(())
}

/// Serialize a sample as a standalone soundbank blob
///
/// `sfx` marks samples that were loaded as sound effects rather than
/// taken from a song.
pub fn write_sample_blob(
    sample: &Sample,
    config: &TargetConfig,
    sfx: bool,
) -> Result<Vec<u8>, MasError> {
    let mut w = ByteWriter::new();
    w.write_u32(
        sample.data.byte_len() as u32 + config.target.sample_header_size() + PAYLOAD_PAD,
    );
    w.write_u8(config.target.sample_blob_type());
    w.write_u8(MAS_VERSION);
    w.write_u8(sfx as u8);
    w.write_u8(FILLER);
    write_sample_data(&mut w, sample, config)?;
    Ok(w.into_inner())
}

/// Sample record inside a MAS song; without a bank index the data is inline
pub(crate) fn write_sample_record(
    w: &mut ByteWriter,
    sample: &Sample,
    bank_index: Option<u16>,
    config: &TargetConfig,
) -> Result<(), MasError> {
    w.write_u8(sample.default_volume);
    w.write_u8(sample.default_panning);
    w.write_u16((sample.frequency / 4) as u16);
    w.write_u8(sample.vibrato.waveform);
    w.write_u8(sample.vibrato.depth);
    w.write_u8(sample.vibrato.speed);
    w.write_u8(sample.global_volume);
    w.write_u16(sample.vibrato.rate);

    match bank_index {
        Some(index) => w.write_u16(index),
        None => {
            w.write_u16(INLINE_SAMPLE);
            write_sample_data(w, sample, config)?;
        }
    }

    Ok(())
}
