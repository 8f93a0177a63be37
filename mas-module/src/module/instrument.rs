//! Instruments and envelopes

use crate::NOTEMAP_SIZE;

/// New Note Action - what happens to a playing note when a new one starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NewNoteAction {
    /// Cut the previous note immediately
    #[default]
    Cut = 0,
    /// Continue playing the previous note in background
    Continue = 1,
    /// Release the previous note (key-off)
    NoteOff = 2,
    /// Fade out the previous note
    NoteFade = 3,
}

impl NewNoteAction {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Continue,
            2 => Self::NoteOff,
            3 => Self::NoteFade,
            _ => Self::Cut,
        }
    }
}

/// Duplicate Check Type - when a background note counts as a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DuplicateCheckType {
    #[default]
    Off = 0,
    Note = 1,
    Sample = 2,
    Instrument = 3,
}

impl DuplicateCheckType {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Note,
            2 => Self::Sample,
            3 => Self::Instrument,
            _ => Self::Off,
        }
    }
}

/// Duplicate Check Action - what happens to a detected duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DuplicateCheckAction {
    #[default]
    Cut = 0,
    NoteOff = 1,
    NoteFade = 2,
}

impl DuplicateCheckAction {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::NoteOff,
            2 => Self::NoteFade,
            _ => Self::Cut,
        }
    }
}

/// Envelope node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeNode {
    /// Position in ticks
    pub tick: u16,
    /// Value (0-64; pan and pitch are centered on 32)
    pub value: u8,
}

/// Volume, panning, or pitch envelope
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    pub nodes: Vec<EnvelopeNode>,
    /// Loop start/end node indices
    pub loop_range: Option<(u8, u8)>,
    /// Sustain loop start/end node indices
    pub sustain_range: Option<(u8, u8)>,
    pub enabled: bool,
    /// Pitch envelope drives the filter cutoff instead
    pub filter: bool,
}

/// Instrument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub name: String,
    /// Global volume (0-128)
    pub global_volume: u8,
    /// Fadeout speed, clamped to 255
    pub fadeout: u8,
    /// Random volume variation (0-100%)
    pub random_volume: u8,
    pub nna: NewNoteAction,
    pub dct: DuplicateCheckType,
    pub dca: DuplicateCheckAction,
    /// Initial panning (bit 7 clear = enabled)
    pub setpan: u8,
    /// Note-to-sample map: low byte = note to play, high byte = sample (1-based)
    pub notemap: [u16; NOTEMAP_SIZE],
    pub volume_envelope: Option<Envelope>,
    pub panning_envelope: Option<Envelope>,
    pub pitch_envelope: Option<Envelope>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            name: String::new(),
            global_volume: 0,
            fadeout: 0,
            random_volume: 0,
            nna: NewNoteAction::Cut,
            dct: DuplicateCheckType::Off,
            dca: DuplicateCheckAction::Cut,
            setpan: 0,
            notemap: [0; NOTEMAP_SIZE],
            volume_envelope: None,
            panning_envelope: None,
            pitch_envelope: None,
        }
    }
}

impl Instrument {
    pub const FLAG_VOLUME_EXISTS: u8 = 1 << 0;
    pub const FLAG_PANNING_EXISTS: u8 = 1 << 1;
    pub const FLAG_PITCH_EXISTS: u8 = 1 << 2;
    pub const FLAG_VOLUME_ENABLED: u8 = 1 << 3;

    /// Instrument that plays `sample` (1-based) across the whole keyboard
    pub fn for_sample(sample: u8) -> Self {
        let mut notemap = [0u16; NOTEMAP_SIZE];
        for (note, entry) in notemap.iter_mut().enumerate() {
            *entry = note as u16 | ((sample as u16) << 8);
        }

        Self {
            global_volume: 128,
            notemap,
            ..Self::default()
        }
    }

    /// Envelope presence bits as stored in the MAS instrument record
    pub fn envelope_flags(&self) -> u8 {
        let mut flags = 0;
        if let Some(env) = &self.volume_envelope {
            flags |= Self::FLAG_VOLUME_EXISTS;
            if env.enabled {
                flags |= Self::FLAG_VOLUME_ENABLED;
            }
        }
        if self.panning_envelope.is_some() {
            flags |= Self::FLAG_PANNING_EXISTS;
        }
        if self.pitch_envelope.is_some() {
            flags |= Self::FLAG_PITCH_EXISTS;
        }
        flags
    }

    /// Envelopes in serialization order
    pub fn envelopes(&self) -> impl Iterator<Item = &Envelope> {
        [
            &self.volume_envelope,
            &self.panning_envelope,
            &self.pitch_envelope,
        ]
        .into_iter()
        .flatten()
    }

    /// The single sample this instrument uses, if every note maps to itself
    pub fn uniform_sample(&self) -> Option<u8> {
        let sample = (self.notemap[0] >> 8) as u8;
        let uniform = self
            .notemap
            .iter()
            .enumerate()
            .all(|(note, &entry)| entry & 0xFF == note as u16 && (entry >> 8) as u8 == sample);
        uniform.then_some(sample)
    }
}
