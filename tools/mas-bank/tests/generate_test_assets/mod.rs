//! Test input generators: WAV files through hound, tracker modules by hand

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// 16 frames of a signed 8-bit triangle
pub const TONE: [i8; 16] = [
    0, 32, 64, 96, 127, 96, 64, 32, 0, -32, -64, -96, -128, -96, -64, -32,
];

/// Mono 8-bit WAV holding `data`
pub fn write_wav_8bit(path: &Path, data: &[i8], sample_rate: u32) -> hound::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 8,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &v in data {
        writer.write_sample(v)?;
    }
    writer.finalize()
}

/// Stereo 16-bit WAV with a sawtooth of `frames` frames
pub fn write_wav_16bit(path: &Path, frames: usize) -> hound::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..frames {
        let v = ((i * 997) % 65536) as i32 - 32768;
        writer.write_sample(v as i16)?;
        writer.write_sample((v / 2) as i16)?;
    }
    writer.finalize()
}

/// Sample-mode IT module: one signed 8-bit sample, one pattern playing
/// C-5 on channel 1
pub fn it_module(title: &str, sample_name: &str, data: &[i8]) -> Vec<u8> {
    let mut out = b"IMPM".to_vec();
    out.extend_from_slice(&padded::<26>(title));
    out.extend_from_slice(&[0, 0]);
    // Orders, instruments, samples, patterns
    for count in [2u16, 0, 1, 1] {
        out.extend_from_slice(&count.to_le_bytes());
    }
    out.extend_from_slice(&0x0214u16.to_le_bytes());
    out.extend_from_slice(&0x0214u16.to_le_bytes());
    // Stereo, linear slides
    out.extend_from_slice(&0x0009u16.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&[128, 48, 6, 125]);
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&[32; 64]);
    out.extend_from_slice(&[64; 64]);
    out.extend_from_slice(&[0, 255]);

    let table = out.len();
    out.extend_from_slice(&[0; 8]);

    let sample = out.len();
    out.extend_from_slice(b"IMPS");
    out.extend_from_slice(&[0; 12]);
    out.push(0);
    // Global volume, flags (sample present), default volume
    out.extend_from_slice(&[64, 0x01, 64]);
    out.extend_from_slice(&padded::<26>(sample_name));
    // Signed data, default pan off
    out.extend_from_slice(&[0x01, 32]);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&8363u32.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&((sample + 80) as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend(data.iter().map(|&v| v as u8));

    let pattern = out.len();
    let packed = [0x81, 0x03, 60, 1, 0];
    out.extend_from_slice(&(packed.len() as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&packed);

    out[table..table + 4].copy_from_slice(&(sample as u32).to_le_bytes());
    out[table + 4..table + 8].copy_from_slice(&(pattern as u32).to_le_bytes());
    out
}

/// Four-channel `M.K.` module: one signed 8-bit sample, one pattern
/// playing period 428 on channel 1
pub fn mod_module(title: &str, sample_name: &str, data: &[i8]) -> Vec<u8> {
    let mut out = padded::<20>(title).to_vec();

    let mut header = [0u8; 30];
    header[..22].copy_from_slice(&padded::<22>(sample_name));
    header[22..24].copy_from_slice(&((data.len() / 2) as u16).to_be_bytes());
    header[25] = 64;
    header[28..30].copy_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&header);
    out.resize(20 + 31 * 30, 0);

    // Song length, restart, order table, format tag
    out.extend_from_slice(&[1, 127]);
    out.extend_from_slice(&[0; 128]);
    out.extend_from_slice(b"M.K.");

    let pattern = out.len();
    out.resize(pattern + 64 * 4 * 4, 0);
    out[pattern..pattern + 4].copy_from_slice(&[0x01, 0xAC, 0x10, 0x00]);

    out.extend(data.iter().map(|&v| v as u8));
    out
}

fn padded<const N: usize>(text: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let len = text.len().min(N - 1);
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
    field
}
