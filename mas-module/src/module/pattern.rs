//! Pattern grid

use crate::{MAX_CHANNELS, MAX_ROWS, NOTE_EMPTY, VOLUME_EMPTY};

/// One (row, channel) slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternCell {
    /// 0-119 = note, 250 = empty, 254 = cut, 255 = off
    pub note: u8,
    /// 1-based instrument, 0 = none
    pub instrument: u8,
    /// Volume column, 255 = empty
    pub volume: u8,
    pub effect: u8,
    pub param: u8,
}

impl PatternCell {
    pub const EMPTY: Self = Self {
        note: NOTE_EMPTY,
        instrument: 0,
        volume: VOLUME_EMPTY,
        effect: 0,
        param: 0,
    };

    /// Cell carries no data, given the module's empty volume value
    pub fn is_empty(&self, empty_volume: u8) -> bool {
        self.note == NOTE_EMPTY
            && self.instrument == 0
            && self.volume == empty_volume
            && self.effect == 0
            && self.param == 0
    }

    pub fn has_effect(&self) -> bool {
        self.effect != 0 || self.param != 0
    }
}

impl Default for PatternCell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Dense pattern: `rows x MAX_CHANNELS` cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    rows: Vec<[PatternCell; MAX_CHANNELS]>,
    /// Rows that are jump targets; the packer resets its channel memory there
    pub marks: Vec<bool>,
}

impl Pattern {
    /// Empty pattern; `rows` is clamped to `1..=MAX_ROWS`
    pub fn new(rows: usize) -> Self {
        let rows = rows.clamp(1, MAX_ROWS);
        Self {
            rows: vec![[PatternCell::EMPTY; MAX_CHANNELS]; rows],
            marks: vec![false; rows],
        }
    }

    /// Empty pattern whose cells use `volume` as the empty volume column
    ///
    /// FastTracker-style songs mark an empty volume column with 0.
    pub fn with_empty_volume(rows: usize, volume: u8) -> Self {
        let mut pattern = Self::new(rows);
        for row in &mut pattern.rows {
            for cell in row.iter_mut() {
                cell.volume = volume;
            }
        }
        pattern
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &[PatternCell; MAX_CHANNELS] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[PatternCell; MAX_CHANNELS]> {
        self.rows.iter()
    }

    pub fn cell(&self, row: usize, channel: usize) -> &PatternCell {
        &self.rows[row][channel]
    }

    pub fn cell_mut(&mut self, row: usize, channel: usize) -> &mut PatternCell {
        &mut self.rows[row][channel]
    }

    /// Flag `row` as a jump target; rows past the end are ignored
    pub fn mark_row(&mut self, row: usize) {
        if let Some(mark) = self.marks.get_mut(row) {
            *mark = true;
        }
    }

    pub fn clear_marks(&mut self) {
        self.marks.fill(false);
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_empty_volume() {
        let pattern = Pattern::with_empty_volume(300, 0);
        assert_eq!(pattern.num_rows(), MAX_ROWS);
        assert!(pattern.rows().flatten().all(|cell| cell.is_empty(0)));
        assert!(!pattern.cell(0, 0).is_empty(VOLUME_EMPTY));
    }
}
