//! Module data structures

mod instrument;
mod pattern;
mod sample;

pub use instrument::{
    DuplicateCheckAction, DuplicateCheckType, Envelope, EnvelopeNode, Instrument, NewNoteAction,
};
pub use pattern::{Pattern, PatternCell};
pub use sample::{AutoVibrato, LoopKind, Sample, SampleData, SampleFormat};

use crate::{MAS_ORDER_SLOTS, MAX_CHANNELS, MAX_ITEMS, MasError, ORDER_END, ORDER_SKIP};

/// A song, as filled in by an input loader
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub title: String,
    /// Pattern order list (254 = skip, 255 = end)
    pub orders: Vec<u8>,
    pub instruments: Vec<Instrument>,
    pub samples: Vec<Sample>,
    pub patterns: Vec<Pattern>,
    /// Per-channel default volume (0-64)
    pub channel_volume: [u8; MAX_CHANNELS],
    /// Per-channel default panning (0-255)
    pub channel_panning: [u8; MAX_CHANNELS],
    /// Global volume (0-128)
    pub global_volume: u8,
    pub initial_speed: u8,
    pub initial_tempo: u8,
    pub restart_position: u8,
    pub stereo: bool,
    /// False for sample-only songs that got synthesized instruments
    pub instrument_mode: bool,
    pub flags: MasFlags,
}

impl Default for Module {
    fn default() -> Self {
        Self {
            title: String::new(),
            orders: Vec::new(),
            instruments: Vec::new(),
            samples: Vec::new(),
            patterns: Vec::new(),
            channel_volume: [64; MAX_CHANNELS],
            channel_panning: [128; MAX_CHANNELS],
            global_volume: 128,
            initial_speed: 6,
            initial_tempo: 125,
            restart_position: 0,
            stereo: true,
            instrument_mode: true,
            flags: MasFlags::empty(),
        }
    }
}

impl Module {
    /// Volume column value that means "empty" for this module's effect semantics
    pub fn empty_volume(&self) -> u8 {
        if self.flags.contains(MasFlags::XM_MODE) {
            0
        } else {
            crate::VOLUME_EMPTY
        }
    }

    /// Pattern index at `order`, or `None` for skip/end/out-of-range entries
    pub fn pattern_at_order(&self, order: usize) -> Option<usize> {
        let pattern = *self.orders.get(order)?;
        (pattern < ORDER_SKIP && (pattern as usize) < self.patterns.len())
            .then_some(pattern as usize)
    }

    /// Order list entry, reading past the end as "end of song"
    pub(crate) fn order(&self, order: usize) -> u8 {
        self.orders.get(order).copied().unwrap_or(ORDER_END)
    }

    /// Fix up values the sound engine cannot represent
    ///
    /// Truncates the order list to the MAS slot count, drops notemap
    /// references to missing samples, and clamps channel volumes.
    pub fn sanitize(&mut self) {
        if self.orders.len() > MAS_ORDER_SLOTS {
            tracing::warn!(
                "order list has {} entries, truncating to {}",
                self.orders.len(),
                MAS_ORDER_SLOTS
            );
            self.orders.truncate(MAS_ORDER_SLOTS);
        }

        if self.restart_position as usize >= self.orders.len() {
            self.restart_position = 0;
        }

        for volume in &mut self.channel_volume {
            *volume = (*volume).min(64);
        }

        let sample_count = self.samples.len();
        for (index, inst) in self.instruments.iter_mut().enumerate() {
            for entry in &mut inst.notemap {
                let sample = (*entry >> 8) as usize;
                if sample > sample_count {
                    tracing::warn!(
                        "instrument {} references missing sample {}",
                        index + 1,
                        sample
                    );
                    *entry &= 0x00FF;
                }
            }
        }
    }

    /// Check the limits of the MAS header
    pub fn validate(&self) -> Result<(), MasError> {
        if self.instruments.len() > MAX_ITEMS {
            return Err(MasError::TooManyInstruments(self.instruments.len()));
        }
        if self.samples.len() > MAX_ITEMS {
            return Err(MasError::TooManySamples(self.samples.len()));
        }
        if self.patterns.len() > MAX_ITEMS {
            return Err(MasError::TooManyPatterns(self.patterns.len()));
        }
        for inst in &self.instruments {
            for env in inst.envelopes() {
                if env.nodes.len() > crate::MAX_ENVELOPE_NODES {
                    return Err(MasError::TooManyEnvelopeNodes(env.nodes.len()));
                }
            }
        }
        Ok(())
    }
}

/// Mode flags stored in the MAS header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasFlags(u8);

impl MasFlags {
    /// Gxx shares memory with Exx/Fxx
    pub const LINK_GXX: Self = Self(0x01);
    /// IT "old effects" (S3M compatible vibrato and retrigger)
    pub const OLD_EFFECTS: Self = Self(0x02);
    /// Linear frequency slides (clear = Amiga periods)
    pub const LINEAR_FREQ: Self = Self(0x04);
    /// FastTracker II effect and volume column semantics
    pub const XM_MODE: Self = Self(0x08);
    /// Samples are stored in the soundbank, not inline
    pub const MSL_DEP: Self = Self(0x10);
    /// ProTracker/ScreamTracker 3 compatibility
    pub const OLD_MODE: Self = Self(0x20);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl std::ops::BitOr for MasFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mut flags = MasFlags::LINK_GXX | MasFlags::LINEAR_FREQ;
        assert_eq!(flags.bits(), 0x05);
        assert!(flags.contains(MasFlags::LINEAR_FREQ));
        assert!(!flags.contains(MasFlags::XM_MODE));

        flags.set(MasFlags::LINK_GXX, false);
        flags.set(MasFlags::MSL_DEP, true);
        assert_eq!(flags, MasFlags::from_bits(0x14));
    }

    #[test]
    fn test_sanitize_truncates_orders() {
        let mut module = Module {
            orders: vec![0; 230],
            restart_position: 220,
            ..Module::default()
        };
        module.channel_volume[3] = 200;
        module.sanitize();

        assert_eq!(module.orders.len(), MAS_ORDER_SLOTS);
        assert_eq!(module.restart_position, 0);
        assert_eq!(module.channel_volume[3], 64);
    }

    #[test]
    fn test_sanitize_drops_missing_samples() {
        let mut module = Module::default();
        module.samples.push(Sample::default());
        module.instruments.push(Instrument::for_sample(1));
        module.instruments[0].notemap[5] = 5 | (9 << 8);
        module.sanitize();

        assert_eq!(module.instruments[0].notemap[5], 5);
        assert_eq!(module.instruments[0].notemap[6], 6 | (1 << 8));
    }

    #[test]
    fn test_validate_limits() {
        let module = Module {
            patterns: vec![Pattern::new(1); 256],
            ..Module::default()
        };
        assert!(matches!(
            module.validate(),
            Err(MasError::TooManyPatterns(256))
        ));
        assert!(Module::default().validate().is_ok());
    }

    #[test]
    fn test_pattern_at_order() {
        let module = Module {
            orders: vec![0, 254, 1, 7, 255],
            patterns: vec![Pattern::default(), Pattern::default()],
            ..Module::default()
        };
        assert_eq!(module.pattern_at_order(0), Some(0));
        assert_eq!(module.pattern_at_order(1), None);
        assert_eq!(module.pattern_at_order(2), Some(1));
        assert_eq!(module.pattern_at_order(3), None);
        assert_eq!(module.pattern_at_order(9), None);
        assert_eq!(module.order(9), ORDER_END);
    }
}
