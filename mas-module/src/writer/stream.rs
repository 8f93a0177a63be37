//! Growable little-endian output buffer with backpatching

use crate::FILLER;

/// Little-endian byte sink
///
/// Offsets are positions in this buffer; records that need a forward
/// reference reserve space and [`patch_u32`](Self::patch_u32) it later.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write position
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write `count` copies of `value`
    pub fn fill(&mut self, value: u8, count: usize) {
        self.buf.resize(self.buf.len() + count, value);
    }

    /// Pad with filler bytes up to a 32-bit boundary
    pub fn align32(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(FILLER);
        }
    }

    /// Overwrite a previously written u32
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
