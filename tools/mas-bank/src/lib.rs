//! mas-bank - GBA/NDS soundbank builder
//!
//! Converts IT, XM, S3M and MOD modules and WAV sound effects into a single
//! soundbank: songs as MAS blobs, samples deduplicated across all inputs.

pub mod convert;
pub mod manifest;
pub mod soundbank;
pub mod wav;

pub use soundbank::Soundbank;
