//! Envelope delta encoding
//!
//! Each node is stored as the slope to the next node plus the segment length,
//! so the player can step envelopes without dividing:
//!
//! ```text
//! u16 delta              slope in 1/512 units per tick (i16)
//! u16 base | range << 7  base = node value (0-64), range = ticks to next node (0-511)
//! ```

use crate::{Envelope, EnvelopeNode, MasError, MAX_ENVELOPE_NODES};

use super::ByteWriter;

const MAX_RANGE: i32 = 511;
const MAX_VALUE: i32 = 64;

/// Delta-encode envelope nodes into `(delta, base | range << 7)` pairs
///
/// The slope is rounded to nearest and then nudged until the value at the
/// end of the segment stays within `0..=64`. The last node has zero range
/// and zero slope.
pub fn encode_envelope_nodes(nodes: &[EnvelopeNode]) -> Vec<(i16, u16)> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let base = node.value as i32;
            let Some(next) = nodes.get(i + 1) else {
                return (0, base as u16);
            };

            let range = (next.tick as i32 - node.tick as i32).clamp(1, MAX_RANGE);
            let mut delta = (((next.value as i32 - base) * 512 + range / 2) / range)
                .clamp(i16::MIN as i32, i16::MAX as i32);

            while base + ((delta * range) >> 9) > MAX_VALUE {
                delta -= 1;
            }
            while base + ((delta * range) >> 9) < 0 {
                delta += 1;
            }

            (delta as i16, (base | (range << 7)) as u16)
        })
        .collect()
}

/// Encoded size of an envelope record
pub(crate) fn envelope_size(env: &Envelope) -> usize {
    env.nodes.len() * 4 + 8
}

pub(crate) fn write_envelope(w: &mut ByteWriter, env: &Envelope) -> Result<(), MasError> {
    if env.nodes.len() > MAX_ENVELOPE_NODES {
        return Err(MasError::TooManyEnvelopeNodes(env.nodes.len()));
    }

    let (loop_start, loop_end) = env.loop_range.unwrap_or((255, 255));
    let (sustain_start, sustain_end) = env.sustain_range.unwrap_or((255, 255));

    w.write_u8(envelope_size(env) as u8);
    w.write_u8(loop_start);
    w.write_u8(loop_end);
    w.write_u8(sustain_start);
    w.write_u8(sustain_end);
    w.write_u8(env.nodes.len() as u8);
    w.write_u8(env.filter as u8);
    w.write_u8(crate::FILLER);

    for (delta, base_range) in encode_envelope_nodes(&env.nodes) {
        w.write_u16(delta as u16);
        w.write_u16(base_range);
    }

    Ok(())
}
