//! Sample payloads and playback metadata

/// Loop behaviour of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopKind {
    /// Play once
    #[default]
    None,
    /// Jump from loop end back to loop start
    Forward,
    /// Bounce between loop start and loop end
    PingPong,
}

/// PCM payload
///
/// 8-bit and 16-bit data is stored as raw words; whether those words hold
/// unsigned (origin 128/32768) or two's complement values is tracked by
/// [`Sample::signed`]. Loaders produce unsigned data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleData {
    Eight(Vec<u8>),
    Sixteen(Vec<u16>),
    /// IMA-ADPCM stream including its 4-byte header
    Adpcm(Vec<u8>),
}

impl Default for SampleData {
    fn default() -> Self {
        Self::Eight(Vec::new())
    }
}

impl SampleData {
    /// Number of frames (bytes for ADPCM)
    pub fn len(&self) -> usize {
        match self {
            Self::Eight(data) | Self::Adpcm(data) => data.len(),
            Self::Sixteen(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sixteen_bit(&self) -> bool {
        matches!(self, Self::Sixteen(_))
    }

    /// Payload size in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Sixteen(data) => data.len() * 2,
            _ => self.len(),
        }
    }

    /// Little-endian byte image of the payload
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::Eight(data) | Self::Adpcm(data) => data.clone(),
            Self::Sixteen(data) => data.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }
}

/// Effective storage format of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Unsigned8,
    Signed8,
    Unsigned16,
    Signed16,
    Adpcm,
}

impl SampleFormat {
    /// Format code understood by the DS sound engine
    pub const fn nds_code(self) -> Option<u8> {
        match self {
            Self::Signed8 => Some(0),
            Self::Signed16 => Some(1),
            Self::Adpcm => Some(2),
            Self::Unsigned8 | Self::Unsigned16 => None,
        }
    }
}

/// Instrument-independent auto vibrato
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoVibrato {
    pub waveform: u8,
    pub depth: u8,
    pub speed: u8,
    pub rate: u16,
}

/// One sample slot of a module
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Display name; may carry `%c`/`%o` conversion flags
    pub name: String,
    pub filename: String,
    /// Sample global volume (0-64)
    pub global_volume: u8,
    /// Default note volume (0-64)
    pub default_volume: u8,
    /// Default panning: bits 0-6 position (0-127), bit 7 set when enabled
    pub default_panning: u8,
    /// Playback rate of middle C in Hz
    pub frequency: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub loop_kind: LoopKind,
    pub data: SampleData,
    /// Payload words are two's complement
    pub signed: bool,
    /// Request IMA-ADPCM output (NDS only)
    pub compress: bool,
    pub vibrato: AutoVibrato,
    /// Index of this sample's blob in a soundbank, if it is stored there
    pub bank_index: Option<u16>,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            name: String::new(),
            filename: String::new(),
            global_volume: 64,
            default_volume: 64,
            default_panning: 0,
            frequency: 8363,
            loop_start: 0,
            loop_end: 0,
            loop_kind: LoopKind::None,
            data: SampleData::default(),
            signed: false,
            compress: false,
            vibrato: AutoVibrato::default(),
            bank_index: None,
        }
    }
}

impl Sample {
    /// Length in frames (bytes for ADPCM)
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_looped(&self) -> bool {
        self.loop_kind != LoopKind::None
    }

    pub fn loop_len(&self) -> u32 {
        self.loop_end.saturating_sub(self.loop_start)
    }

    pub fn format(&self) -> SampleFormat {
        match (&self.data, self.signed) {
            (SampleData::Adpcm(_), _) => SampleFormat::Adpcm,
            (SampleData::Eight(_), false) => SampleFormat::Unsigned8,
            (SampleData::Eight(_), true) => SampleFormat::Signed8,
            (SampleData::Sixteen(_), false) => SampleFormat::Unsigned16,
            (SampleData::Sixteen(_), true) => SampleFormat::Signed16,
        }
    }

    /// Check for a conversion flag such as `%c` in the sample name
    pub fn has_name_flag(&self, flag: &str) -> bool {
        self.name.contains(flag)
    }
}
