//! mas-bank.toml build manifest
//!
//! ```toml
//! [bank]
//! output = "soundbank.bin"
//! target = "nds"
//! ignore_sample_flags = false
//! inputs = ["music/title.it", "sfx/jump.wav"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mas_module::{Target, TargetConfig};
use serde::Deserialize;

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "mas-bank.toml";

/// Manifest file structure
#[derive(Debug, Deserialize)]
pub struct BankManifest {
    pub bank: BankSection,
}

/// Soundbank build settings
#[derive(Debug, Deserialize)]
pub struct BankSection {
    /// Output soundbank path
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Hardware target: "gba" or "nds"
    /// Default: nds
    #[serde(default)]
    pub target: Target,

    /// Ignore %c/%o flags in sample names
    #[serde(default)]
    pub ignore_sample_flags: bool,

    /// Modules and WAV files, added in order
    pub inputs: Vec<PathBuf>,
}

fn default_output() -> PathBuf {
    PathBuf::from("soundbank.bin")
}

impl BankManifest {
    /// Load a manifest; relative paths are resolved against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest = Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new(""));
        Ok(manifest.resolve(base))
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse mas-bank.toml")
    }

    /// Make relative paths relative to `base`
    pub fn resolve(mut self, base: &Path) -> Self {
        let bank = &mut self.bank;
        bank.output = base.join(&bank.output);
        for input in &mut bank.inputs {
            *input = base.join(&*input);
        }
        self
    }

    pub fn config(&self) -> TargetConfig {
        TargetConfig::new(self.bank.target).with_ignore_sample_flags(self.bank.ignore_sample_flags)
    }
}
