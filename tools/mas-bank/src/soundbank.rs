//! Soundbank assembly
//!
//! A soundbank is a table of contents followed by self-contained blobs:
//!
//! ```text
//! 0x00: sample count (u16), song count (u16)
//! 0x04: "*maxmod*"
//! 0x0C: file offset of each sample blob, then of each song blob (u32)
//! blobs, each starting on a 32-bit boundary
//! ```
//!
//! Samples are deduplicated on their serialized bytes, so a sample shared by
//! several songs (or a song and a sound effect) is stored once.

use std::path::Path;

use anyhow::{Context, Result, bail};
use mas_module::{
    ByteWriter, Module, Sample, TargetConfig, prepare_module, write_mas, write_sample_blob,
};

/// Magic following the counts in the soundbank header
pub const BANK_MAGIC: &[u8; 8] = b"*maxmod*";

/// Offset table placeholder until the blob is placed
const OFFSET_PLACEHOLDER: u8 = 0xAA;

/// Highest entry count; 0xFFFF is the "inline sample" index
const MAX_ENTRIES: usize = u16::MAX as usize;

/// Blob bytes that may differ between samples sharing one payload
const SFX_FLAG: usize = 6;
const FREQUENCY: std::ops::Range<usize> = 18..20;

/// Sample and song streams of one conversion run
#[derive(Debug)]
pub struct Soundbank {
    config: TargetConfig,
    samples: Vec<Vec<u8>>,
    songs: Vec<Vec<u8>>,
}

impl Soundbank {
    pub fn new(config: TargetConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
            songs: Vec::new(),
        }
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Add a sample that has already been through [`mas_module::fix_sample`]
    ///
    /// Returns the index of an existing blob with the same content, or the
    /// index of the newly appended one.
    pub fn add_sample(&mut self, sample: &Sample, sfx: bool) -> Result<u16> {
        let blob = write_sample_blob(sample, &self.config, sfx)
            .with_context(|| format!("Failed to serialize sample '{}'", sample.name))?;

        let existing = self.samples.iter().position(|other| same_sample(other, &blob));
        if let Some(index) = existing {
            tracing::debug!("sample '{}' reuses soundbank entry {}", sample.name, index);
            return Ok(index as u16);
        }

        if self.samples.len() >= MAX_ENTRIES {
            bail!("Soundbank is full ({} samples)", MAX_ENTRIES);
        }
        self.samples.push(blob);
        Ok((self.samples.len() - 1) as u16)
    }

    /// Convert a module for the target and add it as a song
    ///
    /// Non-empty samples move into the sample stream and the song refers to
    /// them by index. Returns the song index. On error the sample stream is
    /// left as it was before the call.
    pub fn add_module(&mut self, module: &mut Module) -> Result<u16> {
        module
            .validate()
            .with_context(|| format!("Module '{}' exceeds MAS limits", module.title))?;

        if self.songs.len() >= MAX_ENTRIES {
            bail!("Soundbank is full ({} songs)", MAX_ENTRIES);
        }

        prepare_module(module, &self.config);

        let committed = self.samples.len();
        match self.write_song(module) {
            Ok(song) => {
                self.songs.push(song);
                Ok((self.songs.len() - 1) as u16)
            }
            Err(e) => {
                self.samples.truncate(committed);
                for sample in &mut module.samples {
                    sample.bank_index = None;
                }
                Err(e)
            }
        }
    }

    /// Move a prepared module's samples into the bank and serialize the song
    fn write_song(&mut self, module: &mut Module) -> Result<Vec<u8>> {
        for sample in &mut module.samples {
            sample.bank_index = None;
            if !sample.is_empty() {
                sample.bank_index = Some(self.add_sample(sample, false)?);
            }
        }

        write_mas(module, &self.config, true)
            .with_context(|| format!("Failed to write song '{}'", module.title))
    }

    /// Lay out the table of contents and all blobs
    pub fn export(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_u16(self.samples.len() as u16);
        w.write_u16(self.songs.len() as u16);
        w.write_bytes(BANK_MAGIC);

        let table = w.position();
        let blobs: Vec<&Vec<u8>> = self.samples.iter().chain(&self.songs).collect();
        w.fill(OFFSET_PLACEHOLDER, blobs.len() * 4);

        let mut offsets = Vec::with_capacity(blobs.len());
        for blob in blobs {
            w.align32();
            offsets.push(w.position() as u32);
            w.write_bytes(blob);
        }
        w.align32();

        for (i, offset) in offsets.into_iter().enumerate() {
            w.patch_u32(table + i * 4, offset);
        }
        w.into_inner()
    }

    /// Export to `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = self.export();
        std::fs::write(path, &data)
            .with_context(|| format!("Failed to write soundbank: {}", path.display()))?;
        tracing::info!(
            "Wrote {} ({} samples, {} songs, {} bytes)",
            path.display(),
            self.samples.len(),
            self.songs.len(),
            data.len()
        );
        Ok(())
    }
}

/// Blob equality ignoring the sound effect flag and the playback rate
fn same_sample(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() || a.len() < FREQUENCY.end {
        return a == b;
    }
    a.iter()
        .zip(b)
        .enumerate()
        .all(|(i, (x, y))| i == SFX_FLAG || FREQUENCY.contains(&i) || x == y)
}
