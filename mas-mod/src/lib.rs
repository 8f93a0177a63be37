//! mas-mod: ProTracker module loader for GBA/NDS soundbanks
//!
//! Reads a 31-sample MOD into a [`mas_module::Module`]. Amiga periods
//! become notes and the effect column goes through the FastTracker
//! conversion, since MOD effects are the first sixteen XM effects.
//!
//! # Usage
//!
//! ```ignore
//! use mas_mod::parse_mod;
//!
//! let data = std::fs::read("song.mod")?;
//! let module = parse_mod(&data)?;
//! ```

mod error;
mod parser;

pub use error::ModError;
pub use parser::{channel_count, parse_mod, period_to_note};

/// Number of sample slots in a 31-sample MOD
pub const NUM_SAMPLES: usize = 31;

/// Offset of the four-byte format tag
pub const SIGNATURE_OFFSET: usize = 0x438;
