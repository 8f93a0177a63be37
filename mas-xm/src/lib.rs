//! mas-xm: FastTracker II (XM) module loader for GBA/NDS soundbanks
//!
//! Reads an XM file into a [`mas_module::Module`]. Packed patterns are
//! unpacked into the dense grid, effects are translated to the IT command
//! set the sound engine plays, delta-coded sample data is decoded, and each
//! instrument's samples are flattened into the module's sample list.
//!
//! The volume column is kept as written; the module carries
//! [`mas_module::MasFlags::XM_MODE`] so the engine reads it with FastTracker
//! semantics (0 = empty).
//!
//! # Usage
//!
//! ```ignore
//! use mas_xm::parse_xm;
//!
//! let data = std::fs::read("song.xm")?;
//! let module = parse_xm(&data)?;
//! println!("{}: {} instruments", module.title, module.instruments.len());
//! ```
//!
//! # Format Reference
//!
//! - FastTracker 2 XM format specification v0104
//! - <https://github.com/milkytracker/MilkyTracker/blob/master/resources/reference/xm-form.txt>

mod convert;
mod error;
mod parser;

pub use convert::{apply_effect, convert_effect};
pub use error::XmError;
pub use parser::parse_xm;

// =============================================================================
// Constants
// =============================================================================

/// XM format magic string
pub const XM_MAGIC: &[u8; 17] = b"Extended Module: ";

/// XM format version we support
pub const XM_VERSION: u16 = 0x0104;

/// Maximum instruments in an XM file
pub const MAX_INSTRUMENTS: u16 = 128;

/// Highest playable XM note (B-7)
pub const NOTE_MAX: u8 = 96;

/// XM "note off" (===)
pub const NOTE_KEY_OFF: u8 = 97;

/// XM effect commands
pub mod effects {
    /// 0xy - Arpeggio
    pub const ARPEGGIO: u8 = 0x00;
    /// 1xx - Portamento up
    pub const PORTA_UP: u8 = 0x01;
    /// 2xx - Portamento down
    pub const PORTA_DOWN: u8 = 0x02;
    /// 3xx - Tone portamento
    pub const TONE_PORTA: u8 = 0x03;
    /// 4xy - Vibrato
    pub const VIBRATO: u8 = 0x04;
    /// 5xy - Tone portamento + volume slide
    pub const TONE_PORTA_VOL_SLIDE: u8 = 0x05;
    /// 6xy - Vibrato + volume slide
    pub const VIBRATO_VOL_SLIDE: u8 = 0x06;
    /// 7xy - Tremolo
    pub const TREMOLO: u8 = 0x07;
    /// 8xx - Set panning
    pub const SET_PANNING: u8 = 0x08;
    /// 9xx - Sample offset
    pub const SAMPLE_OFFSET: u8 = 0x09;
    /// Axy - Volume slide
    pub const VOLUME_SLIDE: u8 = 0x0A;
    /// Bxx - Position jump
    pub const POSITION_JUMP: u8 = 0x0B;
    /// Cxx - Set volume
    pub const SET_VOLUME: u8 = 0x0C;
    /// Dxx - Pattern break (decimal parameter)
    pub const PATTERN_BREAK: u8 = 0x0D;
    /// Exy - Extended effects
    pub const EXTENDED: u8 = 0x0E;
    /// Fxx - Set speed/tempo
    pub const SET_SPEED_TEMPO: u8 = 0x0F;
    /// Gxx - Set global volume
    pub const SET_GLOBAL_VOLUME: u8 = 0x10;
    /// Hxy - Global volume slide
    pub const GLOBAL_VOLUME_SLIDE: u8 = 0x11;
    /// Kxx - Key off
    pub const KEY_OFF: u8 = 0x14;
    /// Lxx - Set envelope position
    pub const SET_ENVELOPE_POS: u8 = 0x15;
    /// Pxy - Panning slide
    pub const PANNING_SLIDE: u8 = 0x19;
    /// Rxy - Multi retrig note
    pub const MULTI_RETRIG: u8 = 0x1B;
    /// Txy - Tremor
    pub const TREMOR: u8 = 0x1D;
    /// X1x/X2x - Extra fine portamento
    pub const EXTRA_FINE_PORTA: u8 = 0x21;
}
