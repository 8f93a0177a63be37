//! IT compressed sample decoding
//!
//! Compressed samples are split into blocks (0x8000 frames for 8-bit data,
//! 0x4000 for 16-bit), each stored as a u16 byte length and a bitstream.
//! The bitstream holds delta values of varying width, read LSB-first.
//! Width changes are signalled in-band:
//!
//! - widths 1-6: the value `1 << (width - 1)` is followed by a 3 or 4 bit
//!   field holding the new width
//! - widths 7-nbits: values just above a border derived from the width
//!   encode the new width directly
//! - width nbits+1: bit nbits set means the low byte plus one is the new
//!   width
//!
//! Deltas are summed once (IT 2.14) or twice (IT 2.15) to give samples.
//! Output is unsigned, with origin 128 or 32768.

use crate::ItError;

/// Fixed parameters of one sample depth
struct Depth {
    nbits: u32,
    /// Width of the method 1 width-change field
    dsize: u32,
    /// Frames per block
    block: usize,
}

const DEPTH_8: Depth = Depth {
    nbits: 8,
    dsize: 3,
    block: 0x8000,
};

const DEPTH_16: Depth = Depth {
    nbits: 16,
    dsize: 4,
    block: 0x4000,
};

/// Decode an 8-bit compressed sample
///
/// Returns unsigned frames and the number of input bytes consumed.
pub fn decompress_8bit(
    data: &[u8],
    frames: usize,
    it215: bool,
) -> Result<(Vec<u8>, usize), ItError> {
    let (values, consumed) = decompress(data, frames, it215, &DEPTH_8)?;
    Ok((values.into_iter().map(|v| v as u8).collect(), consumed))
}

/// Decode a 16-bit compressed sample
///
/// Returns unsigned frames and the number of input bytes consumed.
pub fn decompress_16bit(
    data: &[u8],
    frames: usize,
    it215: bool,
) -> Result<(Vec<u16>, usize), ItError> {
    let (values, consumed) = decompress(data, frames, it215, &DEPTH_16)?;
    Ok((values.into_iter().map(|v| v as u16).collect(), consumed))
}

fn decompress(
    data: &[u8],
    frames: usize,
    it215: bool,
    depth: &Depth,
) -> Result<(Vec<u32>, usize), ItError> {
    let mut output = Vec::with_capacity(frames);
    let mut pos = 0;

    while output.len() < frames {
        let header = data.get(pos..pos + 2).ok_or(ItError::TruncatedBlock)?;
        let size = u16::from_le_bytes([header[0], header[1]]) as usize;
        pos += 2;

        let block = data.get(pos..pos + size).ok_or(ItError::TruncatedBlock)?;
        pos += size;

        let count = (frames - output.len()).min(depth.block);
        decompress_block(block, count, it215, depth, &mut output)?;
    }

    Ok((output, pos))
}

fn decompress_block(
    block: &[u8],
    count: usize,
    it215: bool,
    depth: &Depth,
    output: &mut Vec<u32>,
) -> Result<(), ItError> {
    let Depth { nbits, dsize, .. } = *depth;
    let full = (1u32 << nbits) - 1;
    let origin = 1i32 << (nbits - 1);

    let mut reader = BitReader::new(block);
    let mut width = nbits + 1;
    let mut d1 = 0i32;
    let mut d2 = 0i32;
    let mut emitted = 0;

    while emitted < count {
        if width == 0 || width > nbits + 1 {
            return Err(ItError::InvalidBitWidth(width as u8));
        }

        let value = reader.read_bits(width);

        if width < 7 {
            if value == 1 << (width - 1) {
                let new_width = reader.read_bits(dsize) + 1;
                width = if new_width < width {
                    new_width
                } else {
                    new_width + 1
                };
                continue;
            }
        } else if width <= nbits {
            let border = (full >> (nbits + 1 - width)) - nbits / 2;
            if value > border && value <= border + nbits {
                let new_width = value - border;
                width = if new_width < width {
                    new_width
                } else {
                    new_width + 1
                };
                continue;
            }
        } else if value & (1 << nbits) != 0 {
            width = (value + 1) & 0xFF;
            continue;
        }

        let delta = sign_extend(value, width.min(nbits));
        d1 = sign_extend((d1 + delta) as u32, nbits);
        d2 = sign_extend((d2 + d1) as u32, nbits);

        let sample = if it215 { d2 } else { d1 };
        output.push(((sample + origin) as u32) & full);
        emitted += 1;
    }

    Ok(())
}

/// Interpret the low `bits` bits of `value` as two's complement
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// LSB-first bit reader over one block; reads past the end yield zeros
struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    fn read_bits(&mut self, count: u32) -> u32 {
        let mut result = 0u32;
        let mut bits_read = 0;

        while bits_read < count {
            let current_byte = self.data.get(self.byte_pos).copied().unwrap_or(0) as u32;
            let bits_to_read = (count - bits_read).min(8 - self.bit_pos);
            let bits = (current_byte >> self.bit_pos) & ((1 << bits_to_read) - 1);

            result |= bits << bits_read;
            bits_read += bits_to_read;
            self.bit_pos += bits_to_read;

            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// LSB-first bit writer
    struct BitWriter {
        data: Vec<u8>,
        bit_count: usize,
    }

    impl BitWriter {
        fn new() -> Self {
            Self {
                data: Vec::new(),
                bit_count: 0,
            }
        }

        fn write_bits(&mut self, value: u32, count: u32) {
            for i in 0..count {
                if self.bit_count % 8 == 0 {
                    self.data.push(0);
                }
                if (value >> i) & 1 != 0 {
                    let last = self.data.len() - 1;
                    self.data[last] |= 1 << (self.bit_count % 8);
                }
                self.bit_count += 1;
            }
        }
    }

    fn border(depth: &Depth, width: u32) -> u32 {
        (((1u32 << depth.nbits) - 1) >> (depth.nbits + 1 - width)) - depth.nbits / 2
    }

    /// Whether `delta` can be stored at `width` without colliding with an escape
    fn representable(delta: i32, width: u32, depth: &Depth) -> bool {
        let nbits = depth.nbits;
        if width == nbits + 1 {
            return true;
        }
        let low = -(1i32 << (width - 1));
        let high = (1i32 << (width - 1)) - 1;
        if width < 7 {
            return delta > low && delta <= high;
        }
        if width < nbits && !(low..=high).contains(&delta) {
            return false;
        }
        let raw = (delta as u32) & ((1u64 << width) - 1) as u32;
        let border = border(depth, width);
        !(raw > border && raw <= border + nbits)
    }

    /// Reference encoder: picks the narrowest width for every delta, so
    /// all three width-change mechanisms get exercised
    fn compress(samples: &[i32], it215: bool, depth: &Depth) -> Vec<u8> {
        let nbits = depth.nbits;
        let mut out = Vec::new();

        for chunk in samples.chunks(depth.block) {
            let mut w = BitWriter::new();
            let mut width = nbits + 1;
            let (mut d1, mut d2) = (0i32, 0i32);

            for &sample in chunk {
                let delta = if it215 {
                    let next_d1 = sign_extend((sample - d2) as u32, nbits);
                    let delta = sign_extend((next_d1 - d1) as u32, nbits);
                    d1 = next_d1;
                    d2 = sample;
                    delta
                } else {
                    let delta = sign_extend((sample - d1) as u32, nbits);
                    d1 = sample;
                    delta
                };

                let new_width = (1..=nbits + 1)
                    .find(|&x| representable(delta, x, depth))
                    .unwrap();

                if new_width != width {
                    if width < 7 {
                        w.write_bits(1 << (width - 1), width);
                        let field = if new_width < width {
                            new_width - 1
                        } else {
                            new_width - 2
                        };
                        w.write_bits(field, depth.dsize);
                    } else if width <= nbits {
                        let step = if new_width < width {
                            new_width
                        } else {
                            new_width - 1
                        };
                        w.write_bits(border(depth, width) + step, width);
                    } else {
                        w.write_bits((new_width - 1) | (1 << nbits), width);
                    }
                    width = new_width;
                }

                let bits = width.min(nbits);
                w.write_bits((delta as u32) & ((1u64 << bits) - 1) as u32, width);
            }

            out.extend_from_slice(&(w.data.len() as u16).to_le_bytes());
            out.extend_from_slice(&w.data);
        }

        out
    }

    /// Mix of smooth ramps and noise so the encoder uses every width range
    fn signal(len: usize, nbits: u32) -> Vec<i32> {
        let scale = if nbits == 8 { 1 } else { 200 };
        let mut seed = 12345u32;
        (0..len)
            .map(|i| {
                if i % 1000 < 500 {
                    (((i * 7) % 200) as i32 - 100) * scale
                } else {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
                    sign_extend(seed >> 8, nbits)
                }
            })
            .collect()
    }

    fn check_roundtrip(len: usize, it215: bool, depth: &Depth) {
        let samples = signal(len, depth.nbits);
        let compressed = compress(&samples, it215, depth);
        let (decoded, consumed) = decompress(&compressed, len, it215, depth).unwrap();

        let origin = 1i32 << (depth.nbits - 1);
        let full = (1u32 << depth.nbits) - 1;
        let expected: Vec<u32> = samples
            .iter()
            .map(|&s| ((s + origin) as u32) & full)
            .collect();

        assert_eq!(decoded, expected, "len {len}, it215 {it215}");
        assert_eq!(consumed, compressed.len());
    }

    #[test]
    fn test_bit_reader_basic() {
        let data = [0b10101010, 0b11001100];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4), 0b1010);
        assert_eq!(reader.read_bits(4), 0b1010);
        assert_eq!(reader.read_bits(8), 0b11001100);
        assert_eq!(reader.read_bits(5), 0);
    }

    #[test]
    fn test_roundtrip_8bit_block_boundaries() {
        for it215 in [false, true] {
            for len in [1, 100, 0x7FFF, 0x8000, 0x8001] {
                check_roundtrip(len, it215, &DEPTH_8);
            }
        }
    }

    #[test]
    fn test_roundtrip_16bit_block_boundaries() {
        for it215 in [false, true] {
            for len in [1, 100, 0x3FFF, 0x4000, 0x4001] {
                check_roundtrip(len, it215, &DEPTH_16);
            }
        }
    }

    #[test]
    fn test_public_wrappers() {
        let compressed = compress(&[0, 1, -1, 127], false, &DEPTH_8);
        let (samples, consumed) = decompress_8bit(&compressed, 4, false).unwrap();
        assert_eq!(samples, vec![128, 129, 127, 255]);
        assert_eq!(consumed, compressed.len());

        let compressed = compress(&[-32768, 0], true, &DEPTH_16);
        let (samples, _) = decompress_16bit(&compressed, 2, true).unwrap();
        assert_eq!(samples, vec![0, 32768]);
    }

    #[test]
    fn test_width_zero_is_rejected() {
        // Width 9, escape value 0x1FF -> new width (0x1FF + 1) & 0xFF = 0
        let mut w = BitWriter::new();
        w.write_bits(0x1FF, 9);
        let mut data = (w.data.len() as u16).to_le_bytes().to_vec();
        data.extend_from_slice(&w.data);

        assert!(matches!(
            decompress_8bit(&data, 1, false),
            Err(ItError::InvalidBitWidth(0))
        ));
    }

    #[test]
    fn test_missing_block_is_truncated() {
        let data = [4, 0, 1];
        assert!(matches!(
            decompress_8bit(&data, 1, false),
            Err(ItError::TruncatedBlock)
        ));
        assert!(matches!(
            decompress_16bit(&[], 1, false),
            Err(ItError::TruncatedBlock)
        ));
    }

    #[test]
    fn test_zero_frames_reads_nothing() {
        let (samples, consumed) = decompress_8bit(&[], 0, true).unwrap();
        assert!(samples.is_empty());
        assert_eq!(consumed, 0);
    }
}
