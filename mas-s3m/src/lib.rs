//! mas-s3m: ScreamTracker 3 module loader for GBA/NDS soundbanks
//!
//! Reads an S3M file into a [`mas_module::Module`]. S3M effects already use
//! the IT letter numbering, so patterns need only a few parameter fixes.
//! Songs have no instruments; each sample gets a synthesized one.
//!
//! # Usage
//!
//! ```ignore
//! use mas_s3m::parse_s3m;
//!
//! let data = std::fs::read("song.s3m")?;
//! let module = parse_s3m(&data)?;
//! ```
//!
//! # Format Reference
//!
//! - ScreamTracker 3 technical documentation (TECH.DOC)

mod error;
mod parser;

pub use error::S3mError;
pub use parser::parse_s3m;

/// Module magic "SCRM" at offset 0x2C
pub const S3M_MAGIC: &[u8; 4] = b"SCRM";

/// Sample header magic "SCRS"
pub const SAMPLE_MAGIC: &[u8; 4] = b"SCRS";

/// File type byte for ScreamTracker 3 modules
pub const S3M_FILE_TYPE: u8 = 16;
