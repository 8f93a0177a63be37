//! Cubic resampling for loop alignment

use crate::{Sample, SampleData};

use super::ops::{Pcm, rescale};

/// Resample `src` to `new_len` frames with 4-point cubic interpolation
///
/// Taps before the start read as silence. Taps past the end wrap into the
/// loop when `loop_start` is given, otherwise they read as silence.
fn resample_pcm<T: Pcm>(src: &[T], new_len: usize, loop_start: Option<usize>) -> Vec<T> {
    let old_len = src.len();
    if old_len == 0 || new_len == 0 {
        return Vec::new();
    }

    // Missing taps are centered silence, not a raw zero word
    let tap = |pos: isize| -> f64 {
        if pos < 0 {
            return 0.0;
        }
        let pos = pos as usize;
        let index = if pos < old_len {
            Some(pos)
        } else {
            loop_start
                .filter(|&start| start < old_len)
                .map(|start| start + (pos - old_len) % (old_len - start))
        };
        index.map_or(0.0, |i| src[i].centered() as f64)
    };

    let scale = old_len as f64 / new_len as f64;

    (0..new_len)
        .map(|i| {
            let pos = i as f64 * scale;
            let posi = pos.floor() as isize;
            let mu = pos - posi as f64;

            let s0 = tap(posi - 1);
            let s1 = tap(posi);
            let s2 = tap(posi + 1);
            let s3 = tap(posi + 2);

            let a0 = s3 - s2 - s0 + s1;
            let a1 = s0 - s1 - a0;
            let a2 = s2 - s0;
            let a3 = s1;

            let mu2 = mu * mu;
            let res = a0 * mu * mu2 + a1 * mu2 + a2 * mu + a3;
            T::from_centered((res + 0.5).floor() as i32)
        })
        .collect()
}

/// Resample a sample to `new_len` frames
///
/// The loop end moves to the new length; loop start and frequency scale by
/// the same ratio.
pub(crate) fn resample(sample: &mut Sample, new_len: u32) {
    let old_len = sample.len();
    let loop_start = sample.is_looped().then_some(sample.loop_start as usize);

    match &mut sample.data {
        SampleData::Eight(data) => *data = resample_pcm(data, new_len as usize, loop_start),
        SampleData::Sixteen(data) => *data = resample_pcm(data, new_len as usize, loop_start),
        SampleData::Adpcm(_) => return,
    }

    sample.loop_end = new_len;
    sample.loop_start = rescale(sample.loop_start, new_len, old_len);
    sample.frequency = rescale(sample.frequency, new_len, old_len);
}

/// Length that resamples the loop to exactly `target_loop` frames
///
/// Requires `loop_start < len` and `target_loop > 0`.
pub(crate) fn length_for_loop(len: u32, loop_start: u32, target_loop: u32) -> u32 {
    let loop_len = (len - loop_start) as u64;
    let rescaled_loop = |n: u32| n - rescale(loop_start, n, len);

    // The rescaled loop grows by at most one frame per added frame, so
    // counting up from just below the estimate always lands on the target
    let mut n = ((((target_loop - 1) as u64) * len as u64) / loop_len).max(1) as u32;
    while rescaled_loop(n) < target_loop {
        n += 1;
    }
    n
}
