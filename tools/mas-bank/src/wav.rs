//! WAV loader (WAV -> unlooped [`Sample`])

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::{SampleFormat as WavFormat, WavReader};
use mas_module::{Sample, SampleData};

/// Load a WAV file as a sample named after the file stem
pub fn load_wav(path: &Path) -> Result<Sample> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open WAV: {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut sample = read_wav(std::io::BufReader::new(file), name)
        .with_context(|| format!("Failed to load WAV: {}", path.display()))?;
    sample.filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(sample)
}

/// Decode WAV data into unsigned-origin PCM
///
/// 8-bit input stays 8-bit; everything wider is reduced to 16 bits. Extra
/// channels are mixed down to mono.
pub fn read_wav<R: Read>(reader: R, name: &str) -> Result<Sample> {
    let mut reader = WavReader::new(reader).context("Invalid WAV header")?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV has no channels");
    }

    let eight_bit = spec.sample_format == WavFormat::Int && spec.bits_per_sample == 8;
    let pcm: Vec<i32> = match (spec.sample_format, spec.bits_per_sample) {
        (WavFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(i32::from))
            .collect::<Result<_, _>>()?,
        (WavFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(i32::from))
            .collect::<Result<_, _>>()?,
        (WavFormat::Int, bits @ 17..=32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v >> (bits - 16)))
            .collect::<Result<_, _>>()?,
        (WavFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0) as i32))
            .collect::<Result<_, _>>()?,
        (format, bits) => bail!("Unsupported WAV format: {:?} {}-bit", format, bits),
    };

    let mono: Vec<i32> = pcm
        .chunks(channels)
        .map(|frame| frame.iter().sum::<i32>() / frame.len() as i32)
        .collect();

    let data = if eight_bit {
        SampleData::Eight(mono.iter().map(|&v| (v as i8 as u8) ^ 0x80).collect())
    } else {
        SampleData::Sixteen(mono.iter().map(|&v| (v as i16 as u16) ^ 0x8000).collect())
    };

    tracing::debug!(
        "WAV '{}': {} Hz, {}-bit, {} channel(s), {} frames",
        name,
        spec.sample_rate,
        spec.bits_per_sample,
        channels,
        data.len()
    );

    Ok(Sample {
        name: name.to_string(),
        frequency: spec.sample_rate,
        data,
        ..Sample::default()
    })
}
