use super::*;
use mas_module::{LoopKind, NOTE_CUT, PatternCell, SampleData};

use crate::SAMPLE_MAGIC;

/// Minimal S3M file builder
struct S3mBuilder {
    file_type: u8,
    sample_format: u16,
    stereo: bool,
    panning_table: bool,
    orders: Vec<u8>,
    /// Signed 8-bit bodies; `None` is an empty slot
    samples: Vec<Option<Vec<u8>>>,
    /// Packed rows after the length prefix; `None` is a null parapointer
    patterns: Vec<Option<Vec<u8>>>,
}

/// Append `bytes` on a paragraph boundary and return its parapointer
fn place(body: &mut Vec<u8>, base: usize, bytes: &[u8]) -> u16 {
    body.resize(body.len().next_multiple_of(16), 0);
    let para = ((base + body.len()) / 16) as u16;
    body.extend_from_slice(bytes);
    para
}

fn sample_header(data_para: u16, length: u32) -> Vec<u8> {
    let mut header = vec![if length > 0 { 1 } else { 0 }];
    header.extend_from_slice(b"BASS.SMP\0\0\0\0");
    header.push(0);
    header.extend_from_slice(&data_para.to_le_bytes());
    header.extend_from_slice(&length.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&length.to_le_bytes());
    header.extend_from_slice(&[48, 0, 0, 0x01]);
    header.extend_from_slice(&8363u32.to_le_bytes());
    header.extend_from_slice(&[0; 12]);
    let mut name = [0u8; 28];
    name[..4].copy_from_slice(b"bass");
    header.extend_from_slice(&name);
    header.extend_from_slice(SAMPLE_MAGIC);
    header
}

impl S3mBuilder {
    fn new() -> Self {
        Self {
            file_type: 16,
            sample_format: 1,
            stereo: true,
            panning_table: true,
            orders: vec![0, 1, 255],
            samples: Vec::new(),
            patterns: Vec::new(),
        }
    }

    fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[..6].copy_from_slice(b"s3song");
        out[0x1C] = 0x1A;
        out[0x1D] = self.file_type;
        out[0x20..0x22].copy_from_slice(&(self.orders.len() as u16).to_le_bytes());
        out[0x22..0x24].copy_from_slice(&(self.samples.len() as u16).to_le_bytes());
        out[0x24..0x26].copy_from_slice(&(self.patterns.len() as u16).to_le_bytes());
        out[0x28..0x2A].copy_from_slice(&0x1320u16.to_le_bytes());
        out[0x2A..0x2C].copy_from_slice(&self.sample_format.to_le_bytes());
        out[0x2C..0x30].copy_from_slice(S3M_MAGIC);
        out[0x30] = 48;
        out[0x31] = 4;
        out[0x32] = 150;
        out[0x33] = if self.stereo { 0x80 | 48 } else { 48 };
        out[0x35] = if self.panning_table { PANNING_TABLE } else { 0 };
        out[0x40..0x60].fill(255);
        out[0x40] = 0;
        out[0x41] = 8;

        let table_len = self.orders.len() + 2 * (self.samples.len() + self.patterns.len()) + 32;
        let base = (HEADER_SIZE + table_len).next_multiple_of(16);

        let mut body = Vec::new();
        let mut sample_paras = Vec::new();
        for sample in &self.samples {
            let header = match sample {
                Some(data) => {
                    let data_para = place(&mut body, base, data);
                    sample_header(data_para, data.len() as u32)
                }
                None => sample_header(0, 0),
            };
            sample_paras.push(place(&mut body, base, &header));
        }

        let mut pattern_paras = Vec::new();
        for pattern in &self.patterns {
            pattern_paras.push(match pattern {
                Some(rows) => {
                    let mut record = ((rows.len() + 2) as u16).to_le_bytes().to_vec();
                    record.extend_from_slice(rows);
                    place(&mut body, base, &record)
                }
                None => 0,
            });
        }

        out.extend_from_slice(&self.orders);
        for para in sample_paras.iter().chain(&pattern_paras) {
            out.extend_from_slice(&para.to_le_bytes());
        }
        let mut pan_table = [0u8; 32];
        pan_table[0] = PAN_PRESENT | 3;
        out.extend_from_slice(&pan_table);
        out.resize(base, 0);
        out.extend_from_slice(&body);
        out
    }
}

fn demo_song() -> S3mBuilder {
    let mut s3m = S3mBuilder::new();
    s3m.samples.push(Some(vec![0x00, 0x40, 0xC0, 0x7F]));
    s3m.samples.push(None);

    // Row 0: channel 1 C-5 inst 1 vol 32 T96; row 1: channel 0 note cut
    let mut rows = vec![
        0x20 | 0x40 | 0x80 | 1, 0x50, 1, 32, 20, 0x60, 0, //
        0x20, 254, 0, 0,
    ];
    rows.resize(rows.len() + 62, 0);
    s3m.patterns.push(Some(rows));
    s3m.patterns.push(None);
    s3m
}

#[test]
fn test_parse_song_header() {
    let module = parse_s3m(&demo_song().build()).unwrap();

    assert_eq!(module.title, "s3song");
    assert_eq!(module.orders, vec![0, 1, 255]);
    assert_eq!(module.global_volume, 96);
    assert_eq!((module.initial_speed, module.initial_tempo), (4, 150));
    assert!(module.stereo);
    assert!(!module.instrument_mode);
    assert_eq!(module.flags, MasFlags::OLD_EFFECTS | MasFlags::OLD_MODE);
    assert_eq!(module.empty_volume(), 255);
}

#[test]
fn test_channel_panning() {
    let module = parse_s3m(&demo_song().build()).unwrap();
    // Panning table entry for channel 0, channel settings for the rest
    assert_eq!(module.channel_panning[0], 48);
    assert_eq!(module.channel_panning[1], 192);
    assert_eq!(module.channel_panning[31], 192);

    let mut s3m = demo_song();
    s3m.panning_table = false;
    let module = parse_s3m(&s3m.build()).unwrap();
    assert_eq!(module.channel_panning[0], 64);

    s3m.stereo = false;
    let module = parse_s3m(&s3m.build()).unwrap();
    assert!(!module.stereo);
    assert!(module.channel_panning.iter().all(|&pan| pan == 128));
}

#[test]
fn test_samples_and_instruments() {
    let module = parse_s3m(&demo_song().build()).unwrap();
    assert_eq!(module.samples.len(), 2);
    assert_eq!(module.instruments.len(), 2);

    let bass = &module.samples[0];
    assert_eq!(bass.name, "bass");
    assert_eq!(bass.data, SampleData::Eight(vec![0x80, 0xC0, 0x40, 0xFF]));
    assert_eq!(bass.default_volume, 48);
    assert_eq!(bass.loop_kind, LoopKind::Forward);
    assert_eq!(bass.loop_end, 4);
    assert!(module.samples[1].is_empty());

    assert_eq!(module.instruments[0], Instrument::for_sample(1));
    assert_eq!(module.instruments[1], Instrument::default());
}

#[test]
fn test_unsigned_sample_format() {
    let mut s3m = demo_song();
    s3m.sample_format = 2;
    let module = parse_s3m(&s3m.build()).unwrap();
    assert_eq!(
        module.samples[0].data,
        SampleData::Eight(vec![0x00, 0x40, 0xC0, 0x7F])
    );
}

#[test]
fn test_parse_patterns() {
    let module = parse_s3m(&demo_song().build()).unwrap();
    assert_eq!(module.patterns.len(), 2);

    assert_eq!(
        *module.patterns[0].cell(0, 1),
        PatternCell {
            note: 72,
            instrument: 1,
            volume: 32,
            effect: 20,
            param: 0x60
        }
    );
    assert_eq!(module.patterns[0].cell(1, 0).note, NOTE_CUT);
    assert_eq!(module.patterns[1].num_rows(), PATTERN_ROWS);
    assert!(module.patterns[1].rows().flatten().all(|cell| cell.is_empty(255)));
}

#[test]
fn test_header_errors() {
    assert!(matches!(parse_s3m(&[0; 64]), Err(S3mError::TooSmall)));

    let mut data = demo_song().build();
    data[MAGIC_OFFSET] = b'X';
    assert!(matches!(parse_s3m(&data), Err(S3mError::InvalidMagic)));

    let mut s3m = demo_song();
    s3m.file_type = 17;
    assert!(matches!(
        parse_s3m(&s3m.build()),
        Err(S3mError::InvalidFileType(17))
    ));

    let mut s3m = demo_song();
    s3m.sample_format = 3;
    assert!(matches!(
        parse_s3m(&s3m.build()),
        Err(S3mError::UnknownSampleFormat(3))
    ));
}
