//! Sample headers and sample data

use std::io::Cursor;

use mas_module::{LoopKind, Sample, SampleData};

use crate::error::ModError;

use super::helpers::{read_bytes, read_string, read_u8, read_u16_be};

/// Base rate of an untuned sample
const BASE_FREQUENCY: f64 = 8363.0;

/// Loops of two bytes or fewer are the "no loop" marker
const MIN_LOOP_LENGTH: u32 = 2;

/// A sample header; its data follows the patterns
#[derive(Debug, Clone)]
pub(crate) struct SampleHeader {
    pub sample: Sample,
    pub length: u32,
    pub loop_start: u32,
    pub loop_length: u32,
}

/// Parse one 30-byte sample header
pub(crate) fn parse_sample_header(cursor: &mut Cursor<&[u8]>) -> Result<SampleHeader, ModError> {
    let name = read_bytes::<22>(cursor)?;
    let length = read_u16_be(cursor)? as u32 * 2;
    let finetune = read_u8(cursor)?;
    let default_volume = read_u8(cursor)?.min(64);
    let loop_start = read_u16_be(cursor)? as u32 * 2;
    let loop_length = read_u16_be(cursor)? as u32 * 2;

    Ok(SampleHeader {
        sample: Sample {
            name: read_string(&name),
            filename: read_string(&name[..12]),
            default_volume,
            frequency: finetune_frequency(finetune),
            ..Sample::default()
        },
        length,
        loop_start,
        loop_length,
    })
}

/// Middle C rate for a finetune nibble (signed, eighths of a semitone)
pub(crate) fn finetune_frequency(finetune: u8) -> u32 {
    let steps = ((finetune & 0x0F) as i8) << 4 >> 4;
    (BASE_FREQUENCY * 2f64.powf(steps as f64 / 96.0)).round() as u32
}

/// Read the header's signed 8-bit data and attach it unsigned
///
/// A file that ends early keeps the bytes that are there.
pub(crate) fn load_sample(
    cursor: &mut Cursor<&[u8]>,
    header: SampleHeader,
    index: usize,
) -> Sample {
    let file = *cursor.get_ref();
    let start = (cursor.position() as usize).min(file.len());
    let end = (start + header.length as usize).min(file.len());
    if end - start < header.length as usize {
        tracing::warn!(
            "sample {} truncated: {} of {} bytes",
            index + 1,
            end - start,
            header.length
        );
    }
    cursor.set_position(end as u64);

    let data: Vec<u8> = file[start..end].iter().map(|&b| b ^ 0x80).collect();
    let length = data.len() as u32;
    let loop_end = (header.loop_start + header.loop_length).min(length);

    let mut sample = header.sample;
    if header.loop_length > MIN_LOOP_LENGTH && loop_end > header.loop_start + MIN_LOOP_LENGTH {
        sample.loop_kind = LoopKind::Forward;
        sample.loop_start = header.loop_start;
        sample.loop_end = loop_end;
    }
    sample.data = SampleData::Eight(data);
    sample
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(length_words: u16, finetune: u8, loop_start: u16, loop_words: u16) -> Vec<u8> {
        let mut data = b"snare drum long name!!".to_vec();
        data.extend_from_slice(&length_words.to_be_bytes());
        data.extend_from_slice(&[finetune, 70]);
        data.extend_from_slice(&loop_start.to_be_bytes());
        data.extend_from_slice(&loop_words.to_be_bytes());
        data
    }

    #[test]
    fn test_parse_header() {
        let data = header_bytes(4, 0x0F, 1, 2);
        let header = parse_sample_header(&mut Cursor::new(&data[..])).unwrap();

        assert_eq!(header.sample.name, "snare drum long name!!");
        assert_eq!(header.sample.filename, "snare drum l");
        assert_eq!(header.sample.default_volume, 64);
        assert_eq!(header.sample.frequency, 8303);
        assert_eq!((header.length, header.loop_start, header.loop_length), (8, 2, 4));
    }

    #[test]
    fn test_finetune_frequency() {
        assert_eq!(finetune_frequency(0), 8363);
        assert_eq!(finetune_frequency(7), 8797);
        assert_eq!(finetune_frequency(8), 7894);
        assert_eq!(finetune_frequency(0xF1), 8424);
    }

    #[test]
    fn test_load_sample_with_loop() {
        let data = header_bytes(4, 0, 1, 3);
        let header = parse_sample_header(&mut Cursor::new(&data[..])).unwrap();

        let body = [0u8, 0x7F, 0x80, 0xFF, 1, 2, 3, 4, 9];
        let mut cursor = Cursor::new(&body[..]);
        let sample = load_sample(&mut cursor, header, 0);

        assert_eq!(sample.len(), 8);
        assert_eq!(cursor.position(), 8);
        assert_eq!(
            sample.data,
            SampleData::Eight(vec![0x80, 0xFF, 0x00, 0x7F, 0x81, 0x82, 0x83, 0x84])
        );
        assert_eq!(sample.loop_kind, LoopKind::Forward);
        assert_eq!((sample.loop_start, sample.loop_end), (2, 8));
    }

    #[test]
    fn test_short_loop_disabled() {
        let data = header_bytes(4, 0, 0, 1);
        let header = parse_sample_header(&mut Cursor::new(&data[..])).unwrap();
        let sample = load_sample(&mut Cursor::new(&[0u8; 8][..]), header, 0);

        assert_eq!(sample.loop_kind, LoopKind::None);
        assert_eq!((sample.loop_start, sample.loop_end), (0, 0));
    }

    #[test]
    fn test_truncated_data_kept() {
        let data = header_bytes(4, 0, 0, 4);
        let header = parse_sample_header(&mut Cursor::new(&data[..])).unwrap();
        let sample = load_sample(&mut Cursor::new(&[0u8; 5][..]), header, 0);

        assert_eq!(sample.len(), 5);
        assert_eq!(sample.loop_kind, LoopKind::Forward);
        assert_eq!(sample.loop_end, 5);
    }
}
