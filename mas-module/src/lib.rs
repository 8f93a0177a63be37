//! mas-module: tracker module model and MAS serialization for GBA/NDS sound engines
//!
//! Input loaders fill a [`Module`]; this crate reshapes its samples for the
//! chosen hardware target and serializes it as a MAS song.
//!
//! # Pipeline
//!
//! 1. A loader builds the [`Module`] (patterns already unpacked into a dense grid)
//! 2. [`prepare_module`] runs [`fix_sample`] over every sample for the target
//! 3. [`write_mas`] emits the song, re-packing patterns and envelopes
//!
//! Samples can be written inline, or referenced by index into a shared
//! soundbank sample table (see [`Sample::bank_index`]).
//!
//! # MAS Layout
//!
//! ```text
//! Prefix (8 bytes):
//!   0x00: size of everything after the prefix (u32)
//!   0x04: type (0 = song), version, 2 pad bytes
//!
//! Header (parapointers are relative to the end of the prefix):
//!   counts, flags, global volume, speed, tempo, restart
//!   channel volume[32], channel panning[32], orders[200]
//!   parapointers: instruments, samples, patterns (u32 each)
//!
//! Body (each record 32-bit aligned):
//!   instruments with delta-coded envelopes
//!   sample records (inline data or bank index)
//!   patterns (IT-style change-mask packing)
//! ```

mod error;
mod module;
mod target;
mod transform;
mod writer;

pub use error::MasError;
pub use module::{
    AutoVibrato, DuplicateCheckAction, DuplicateCheckType, Envelope, EnvelopeNode, Instrument,
    LoopKind, MasFlags, Module, NewNoteAction, Pattern, PatternCell, Sample, SampleData,
    SampleFormat,
};
pub use target::{Target, TargetConfig};
pub use transform::{fix_sample, prepare_module};
pub use writer::{
    ByteWriter, encode_envelope_nodes, mark_patterns, pack_pattern, write_mas,
    write_sample_blob, write_sample_data,
};

// =============================================================================
// Constants
// =============================================================================

/// Channels addressable by the sound engine
pub const MAX_CHANNELS: usize = 32;

/// Maximum rows per pattern
pub const MAX_ROWS: usize = 256;

/// Maximum entries in an input order list
pub const MAX_ORDERS: usize = 256;

/// Order list length stored in a MAS header
pub const MAS_ORDER_SLOTS: usize = 200;

/// Maximum instruments, samples, or patterns per song (stored as u8 counts)
pub const MAX_ITEMS: usize = 255;

/// Notes covered by an instrument notemap
pub const NOTEMAP_SIZE: usize = 120;

/// Maximum nodes per envelope
pub const MAX_ENVELOPE_NODES: usize = 25;

/// Empty note slot
pub const NOTE_EMPTY: u8 = 250;

/// Note cut (^^^)
pub const NOTE_CUT: u8 = 254;

/// Note off (===)
pub const NOTE_OFF: u8 = 255;

/// Empty volume column (IT-style modules)
pub const VOLUME_EMPTY: u8 = 255;

/// Order list "skip" marker (+++)
pub const ORDER_SKIP: u8 = 254;

/// Order list "end of song" marker (---)
pub const ORDER_END: u8 = 255;

/// MAS format version
pub const MAS_VERSION: u8 = 0x18;

/// Filler byte for reserved and backpatched fields
pub const FILLER: u8 = 0xBA;

/// Pattern effect numbers the row marker looks at
pub mod effects {
    /// Cxx - pattern break
    pub const PATTERN_BREAK: u8 = 3;
    /// Sxx - extended effects
    pub const EXTENDED: u8 = 19;
    /// SB0 - set pattern loop start
    pub const PARAM_LOOP_START: u8 = 0xB0;
}
