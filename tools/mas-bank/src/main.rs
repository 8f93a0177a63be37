//! mas-bank - GBA/NDS soundbank builder
//!
//! Converts tracker modules and WAV samples into a soundbank, a standalone MAS
//! song, or a raw ADPCM stream.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mas_module::{Target, TargetConfig};
use std::path::{Path, PathBuf};

use mas_bank::convert;
use mas_bank::manifest::{BankManifest, DEFAULT_MANIFEST};

#[derive(Parser)]
#[command(name = "mas-bank")]
#[command(about = "GBA/NDS soundbank builder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a soundbank from modules and WAV files
    Bank {
        /// Input files (.it, .xm, .s3m, .mod, .wav)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output soundbank file
        #[arg(short, long, default_value = "soundbank.bin")]
        output: PathBuf,

        /// Hardware target (gba or nds)
        #[arg(short, long, default_value = "nds")]
        target: Target,

        /// Ignore %c/%o flags in sample names
        #[arg(long)]
        ignore_flags: bool,
    },

    /// Build a soundbank from a manifest file
    Build {
        /// Path to mas-bank.toml manifest
        #[arg(default_value = DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },

    /// Convert one module to a standalone MAS song
    Mas {
        /// Input module (.it, .xm, .s3m, .mod)
        input: PathBuf,

        /// Output .mas file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hardware target (gba or nds)
        #[arg(short, long, default_value = "nds")]
        target: Target,

        /// Ignore %c/%o flags in sample names
        #[arg(long)]
        ignore_flags: bool,
    },

    /// Encode one WAV file as a raw NDS ADPCM stream
    Raw {
        /// Input WAV file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Bank {
            inputs,
            output,
            target,
            ignore_flags,
        } => {
            let config = TargetConfig::new(target).with_ignore_sample_flags(ignore_flags);
            tracing::info!("Building {} soundbank from {} inputs", target, inputs.len());
            convert::build_bank(&inputs, config).write(&output)?;
        }

        Commands::Build { manifest } => {
            tracing::info!("Building soundbank from {:?}", manifest);
            let manifest = BankManifest::load(&manifest)?;
            convert::build_bank(&manifest.bank.inputs, manifest.config())
                .write(&manifest.bank.output)?;
        }

        Commands::Mas {
            input,
            output,
            target,
            ignore_flags,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("mas"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let config = TargetConfig::new(target).with_ignore_sample_flags(ignore_flags);
            write_output(&output, &convert::convert_mas(&input, config)?)?;
        }

        Commands::Raw { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("adpcm"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            write_output(&output, &convert::convert_raw(&input)?)?;
        }
    }

    Ok(())
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    tracing::info!("Wrote {} bytes", data.len());
    Ok(())
}
