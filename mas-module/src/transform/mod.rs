//! Sample transform pipeline
//!
//! Reshapes loader output into something the target hardware can play:
//!
//! 1. Clamp loop points, drop data past the loop end
//! 2. Unroll ping-pong loops into forward loops
//! 3. Tile loops shorter than the target minimum
//! 4. Align the loop length (unroll, or resample when unrolling would bloat)
//! 5. Pad the start to align the loop start, pad the end to align the length
//! 6. Convert to signed data (NDS)
//! 7. Compress to IMA-ADPCM when requested (NDS)

mod ops;
mod resample;


use crate::{LoopKind, Module, Sample, SampleData, Target, TargetConfig};

/// Sample name flag requesting ADPCM compression
const FLAG_COMPRESS: &str = "%c";

/// Sample name flag requesting the loop be doubled and entered halfway
const FLAG_OFFSET_LOOP: &str = "%o";

/// Run every sample of `module` through [`fix_sample`]
pub fn prepare_module(module: &mut Module, config: &TargetConfig) {
    for sample in &mut module.samples {
        fix_sample(sample, config);
    }
}

/// Convert one sample in place for the configured target
pub fn fix_sample(sample: &mut Sample, config: &TargetConfig) {
    if matches!(sample.data, SampleData::Adpcm(_)) {
        return;
    }

    sample.loop_start = sample.loop_start.min(sample.len());
    sample.loop_end = sample.loop_end.min(sample.len());

    if sample.is_empty() {
        sample.loop_start = 0;
        sample.loop_end = 0;
        sample.loop_kind = LoopKind::None;
        match config.target {
            Target::Gba => ops::to_8bit(sample),
            Target::Nds => ops::sign(sample),
        }
        return;
    }

    if sample.is_looped() && sample.loop_start >= sample.loop_end {
        tracing::warn!("sample '{}' has an empty loop, disabling it", sample.name);
        sample.loop_kind = LoopKind::None;
    }

    if config.target == Target::Gba {
        ops::to_8bit(sample);
    }

    if sample.is_looped() {
        ops::truncate_to_loop(sample);
        if sample.loop_kind == LoopKind::PingPong {
            ops::unroll_ping_pong(sample);
        }
    }

    if config.target == Target::Nds && !config.ignore_sample_flags {
        apply_name_flags(sample);
    }

    if sample.is_looped() {
        if let Some(min_len) = config.target.min_loop_len() {
            enforce_min_loop(sample, min_len);
        }
        align_loop_length(sample, config);
    }

    let alignment = config.frame_alignment(sample.data.is_sixteen_bit(), sample.compress);
    if sample.is_looped() {
        ops::pad_start(sample, padding(sample.loop_start, alignment));
    }
    ops::pad_end(sample, padding(sample.len(), alignment));

    match config.target {
        Target::Nds => {
            ops::sign(sample);
            if sample.compress {
                ops::compress(sample);
            }
        }
        Target::Gba => {
            if sample.compress {
                tracing::debug!("sample '{}': GBA has no ADPCM, storing PCM", sample.name);
                sample.compress = false;
            }
        }
    }

    tracing::debug!(
        "sample '{}': {} frames, loop {}..{} ({:?}), {:?}",
        sample.name,
        sample.len(),
        sample.loop_start,
        sample.loop_end,
        sample.loop_kind,
        sample.format()
    );
}

fn apply_name_flags(sample: &mut Sample) {
    if sample.is_looped() && sample.has_name_flag(FLAG_OFFSET_LOOP) {
        ops::unroll_loop(sample, 1);
        sample.loop_start += sample.loop_len() / 2;
    }
    if sample.has_name_flag(FLAG_COMPRESS) {
        sample.compress = true;
    }
}

/// Frames needed to bring `value` up to a multiple of `alignment`
fn padding(value: u32, alignment: u32) -> u32 {
    (alignment - value % alignment) % alignment
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Tile the loop until it reaches `min_len` frames
fn enforce_min_loop(sample: &mut Sample, min_len: u32) {
    let loop_len = sample.loop_len();
    if loop_len < min_len {
        let copies = min_len.div_ceil(loop_len);
        tracing::debug!(
            "sample '{}': loop of {} frames tiled {} times",
            sample.name,
            loop_len,
            copies
        );
        ops::unroll_loop(sample, copies - 1);
    }
}

/// Make the loop length a multiple of the hardware alignment
fn align_loop_length(sample: &mut Sample, config: &TargetConfig) {
    let alignment = config.frame_alignment(sample.data.is_sixteen_bit(), sample.compress);
    let loop_len = sample.loop_len();
    if loop_len % alignment == 0 {
        return;
    }

    let extra_copies = alignment / gcd(loop_len, alignment) - 1;
    let addition = loop_len * extra_copies;

    if addition > TargetConfig::UNROLL_THRESHOLD {
        let target = loop_len + padding(loop_len, alignment);
        let new_len = resample::length_for_loop(sample.len(), sample.loop_start, target);
        tracing::debug!(
            "sample '{}': resampling {} -> {} frames to align loop",
            sample.name,
            sample.len(),
            new_len
        );
        resample::resample(sample, new_len);
    } else {
        ops::unroll_loop(sample, extra_copies);
    }
}
