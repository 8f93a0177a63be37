//! Input dispatch and the bank/mas/raw conversions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mas_module::{
    Module, SampleData, Target, TargetConfig, fix_sample, prepare_module, write_mas,
};

use crate::soundbank::Soundbank;
use crate::wav::load_wav;

/// Input file kind, detected by extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Impulse Tracker module
    It,
    /// FastTracker II module
    Xm,
    /// ScreamTracker 3 module
    S3m,
    /// ProTracker module
    Mod,
    /// Sound effect sample
    Wav,
    Unknown(String),
}

impl InputKind {
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "it" => Self::It,
            "xm" => Self::Xm,
            "s3m" => Self::S3m,
            "mod" => Self::Mod,
            "wav" => Self::Wav,
            _ => Self::Unknown(ext),
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Self::It | Self::Xm | Self::S3m | Self::Mod)
    }
}

/// Load a tracker module of `kind` from disk
pub fn load_module(path: &Path, kind: &InputKind) -> Result<Module> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read module: {}", path.display()))?;

    let parsed = match kind {
        InputKind::It => mas_it::parse_it(&data).map_err(anyhow::Error::from),
        InputKind::Xm => mas_xm::parse_xm(&data).map_err(anyhow::Error::from),
        InputKind::S3m => mas_s3m::parse_s3m(&data).map_err(anyhow::Error::from),
        InputKind::Mod => mas_mod::parse_mod(&data).map_err(anyhow::Error::from),
        other => bail!("Not a module: {:?} ({:?})", path, other),
    };
    parsed.with_context(|| format!("Failed to parse module: {}", path.display()))
}

/// Add one input to the bank; returns false when it was skipped
pub fn add_input(bank: &mut Soundbank, path: &Path) -> Result<bool> {
    match InputKind::detect(path) {
        InputKind::Wav => {
            let mut sample = load_wav(path)?;
            fix_sample(&mut sample, bank.config());
            let index = bank.add_sample(&sample, true)?;
            tracing::info!("Sample {}: {} ({:?})", index, sample.name, path);
        }
        InputKind::Unknown(ext) => {
            tracing::warn!("Unknown file type '{}', skipping {:?}", ext, path);
            return Ok(false);
        }
        kind => {
            let mut module = load_module(path, &kind)?;
            let index = bank.add_module(&mut module)?;
            tracing::info!("Song {}: {} ({:?})", index, module.title, path);
        }
    }
    Ok(true)
}

/// Build a soundbank from `inputs` in order
///
/// A file that fails to load is reported and left out; the rest of the
/// bank is still built.
pub fn build_bank(inputs: &[PathBuf], config: TargetConfig) -> Soundbank {
    let mut bank = Soundbank::new(config);
    let mut skipped = 0;

    for input in inputs {
        match add_input(&mut bank, input) {
            Ok(true) => {}
            Ok(false) => skipped += 1,
            Err(e) => {
                tracing::error!("{:#}", e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("{} of {} inputs skipped", skipped, inputs.len());
    }
    bank
}

/// Convert one module into a standalone MAS song with inline samples
pub fn convert_mas(input: &Path, config: TargetConfig) -> Result<Vec<u8>> {
    let kind = InputKind::detect(input);
    if !kind.is_module() {
        bail!("Not a supported module: {:?} ({:?})", input, kind);
    }
    let mut module = load_module(input, &kind)?;

    prepare_module(&mut module, &config);
    let song = write_mas(&mut module, &config, false)
        .with_context(|| format!("Failed to write song '{}'", module.title))?;
    Ok(song)
}

/// Encode a WAV file as a bare NDS IMA-ADPCM stream
pub fn convert_raw(input: &Path) -> Result<Vec<u8>> {
    let mut sample = load_wav(input)?;
    sample.compress = true;
    fix_sample(&mut sample, &TargetConfig::new(Target::Nds));

    match sample.data {
        SampleData::Adpcm(data) => Ok(data),
        _ => bail!("Sample {:?} was not compressed", input),
    }
}
