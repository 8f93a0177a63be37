//! In-place sample data operations
//!
//! All operations work on unsigned-origin PCM (silence = 128 / 32768) and
//! keep `loop_end == len` for looped samples.

use crate::{LoopKind, Sample, SampleData};

/// PCM word with an unsigned origin
pub(crate) trait Pcm: Copy {
    /// Value of silence
    const ORIGIN: i32;
    const MAX: i32;

    fn to_i32(self) -> i32;
    fn from_i32(v: i32) -> Self;

    fn silence() -> Self {
        Self::from_i32(Self::ORIGIN)
    }

    /// Value relative to the origin
    fn centered(self) -> i32 {
        self.to_i32() - Self::ORIGIN
    }

    /// Build from a centered value, saturating at full scale
    fn from_centered(v: i32) -> Self {
        Self::from_i32(v.clamp(-Self::ORIGIN, Self::ORIGIN - 1) + Self::ORIGIN)
    }

    /// Two's complement word for a centered value; the most negative value
    /// is clamped one step up
    fn signed(self) -> Self {
        let v = self.centered().max(1 - Self::ORIGIN);
        Self::from_i32(v & Self::MAX)
    }
}

impl Pcm for u8 {
    const ORIGIN: i32 = 128;
    const MAX: i32 = 0xFF;

    fn to_i32(self) -> i32 {
        self as i32
    }

    fn from_i32(v: i32) -> Self {
        v as u8
    }
}

impl Pcm for u16 {
    const ORIGIN: i32 = 32768;
    const MAX: i32 = 0xFFFF;

    fn to_i32(self) -> i32 {
        self as i32
    }

    fn from_i32(v: i32) -> Self {
        v as u16
    }
}

/// Rescale `value` by `new_len / old_len`, rounding half up
pub(crate) fn rescale(value: u32, new_len: u32, old_len: u32) -> u32 {
    if old_len == 0 {
        return value;
    }
    ((2 * value as u64 * new_len as u64 + old_len as u64) / (2 * old_len as u64)) as u32
}

// ========== Generic buffer operations ==========

fn append_loop<T: Pcm>(data: &mut Vec<T>, loop_start: usize, count: usize) {
    let region = data[loop_start..].to_vec();
    for _ in 0..count {
        data.extend_from_slice(&region);
    }
}

fn append_mirror<T: Pcm>(data: &mut Vec<T>, loop_start: usize) {
    let end = data.len().saturating_sub(1);
    if loop_start >= end {
        return;
    }
    let mirrored: Vec<T> = data[loop_start..end].iter().rev().copied().collect();
    data.extend_from_slice(&mirrored);
}

fn prepend_silence<T: Pcm>(data: &mut Vec<T>, count: usize) {
    data.splice(0..0, std::iter::repeat_n(T::silence(), count));
}

fn append_silence<T: Pcm>(data: &mut Vec<T>, count: usize) {
    data.extend(std::iter::repeat_n(T::silence(), count));
}

fn sign_in_place<T: Pcm>(data: &mut [T]) {
    for v in data {
        *v = v.signed();
    }
}

// ========== Sample operations ==========

/// Drop data past the loop end
pub(crate) fn truncate_to_loop(sample: &mut Sample) {
    let end = sample.loop_end as usize;
    match &mut sample.data {
        SampleData::Eight(data) => data.truncate(end),
        SampleData::Sixteen(data) => data.truncate(end),
        SampleData::Adpcm(_) => {}
    }
}

/// Repeat the loop region `count` more times
pub(crate) fn unroll_loop(sample: &mut Sample, count: u32) {
    let start = sample.loop_start as usize;
    match &mut sample.data {
        SampleData::Eight(data) => append_loop(data, start, count as usize),
        SampleData::Sixteen(data) => append_loop(data, start, count as usize),
        SampleData::Adpcm(_) => return,
    }
    sample.loop_end = sample.len();
}

/// Turn a ping-pong loop into a forward one
///
/// The loop region is appended in reverse without repeating the turnaround
/// frame, so a span of `n` frames becomes a forward loop of `2n - 1`.
pub(crate) fn unroll_ping_pong(sample: &mut Sample) {
    let start = sample.loop_start as usize;
    match &mut sample.data {
        SampleData::Eight(data) => append_mirror(data, start),
        SampleData::Sixteen(data) => append_mirror(data, start),
        SampleData::Adpcm(_) => return,
    }
    sample.loop_end = sample.len();
    sample.loop_kind = LoopKind::Forward;
}

/// Insert `count` frames of silence before the sample, shifting the loop
pub(crate) fn pad_start(sample: &mut Sample, count: u32) {
    if count == 0 {
        return;
    }
    match &mut sample.data {
        SampleData::Eight(data) => prepend_silence(data, count as usize),
        SampleData::Sixteen(data) => prepend_silence(data, count as usize),
        SampleData::Adpcm(_) => return,
    }
    sample.loop_start += count;
    sample.loop_end += count;
}

/// Append `count` frames of silence
pub(crate) fn pad_end(sample: &mut Sample, count: u32) {
    match &mut sample.data {
        SampleData::Eight(data) => append_silence(data, count as usize),
        SampleData::Sixteen(data) => append_silence(data, count as usize),
        SampleData::Adpcm(_) => {}
    }
}

/// Reduce 16-bit data to 8-bit by keeping the high byte
pub(crate) fn to_8bit(sample: &mut Sample) {
    if let SampleData::Sixteen(data) = &sample.data {
        sample.data = SampleData::Eight(data.iter().map(|&v| (v >> 8) as u8).collect());
    }
}

/// Convert unsigned-origin data to two's complement
pub(crate) fn sign(sample: &mut Sample) {
    if sample.signed {
        return;
    }
    match &mut sample.data {
        SampleData::Eight(data) => sign_in_place(data),
        SampleData::Sixteen(data) => sign_in_place(data),
        SampleData::Adpcm(_) => return,
    }
    sample.signed = true;
}

/// Replace signed PCM with an IMA-ADPCM stream
///
/// Loop points move to byte offsets inside the stream, past its header.
pub(crate) fn compress(sample: &mut Sample) {
    let pcm: Vec<i16> = match &sample.data {
        SampleData::Eight(data) => data.iter().map(|&v| ((v as i8) as i16) << 8).collect(),
        SampleData::Sixteen(data) => data.iter().map(|&v| v as i16).collect(),
        SampleData::Adpcm(_) => return,
    };

    sample.data = SampleData::Adpcm(mas_adpcm::encode_adpcm(&pcm));
    sample.loop_start = sample.loop_start / 2 + mas_adpcm::ADPCM_HEADER_SIZE as u32;
    sample.loop_end = sample.loop_end / 2 + mas_adpcm::ADPCM_HEADER_SIZE as u32;
}
