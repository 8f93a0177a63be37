//! mas-it: Impulse Tracker module loader for GBA/NDS soundbanks
//!
//! Reads an IT file into a [`mas_module::Module`]: header fields, order
//! list, instruments with their envelopes, samples (including compressed
//! sample data), and patterns unpacked into a dense row/channel grid.
//!
//! # Usage
//!
//! ```ignore
//! use mas_it::parse_it;
//!
//! let data = std::fs::read("song.it")?;
//! let module = parse_it(&data)?;
//! println!("{}: {} patterns", module.title, module.patterns.len());
//! ```
//!
//! # Format Reference
//!
//! - Impulse Tracker Technical Specification (ITTECH.TXT)
//! - <https://github.com/schismtracker/schismtracker/wiki/ITTECH.TXT>

mod compression;
mod error;
mod parser;

pub use compression::{decompress_8bit, decompress_16bit};
pub use error::ItError;
pub use parser::{parse_it, unpack_pattern};

/// IT format magic string "IMPM"
pub const IT_MAGIC: &[u8; 4] = b"IMPM";

/// Sample magic string "IMPS"
pub const SAMPLE_MAGIC: &[u8; 4] = b"IMPS";
