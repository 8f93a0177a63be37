//! Helper functions for reading binary data

use std::io::{Cursor, Read};

use crate::error::ModError;

/// Read a single byte
pub(crate) fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, ModError> {
    let mut buf = [0u8; 1];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| ModError::UnexpectedEof)?;
    Ok(buf[0])
}

/// Read a 16-bit big-endian integer
pub(crate) fn read_u16_be(cursor: &mut Cursor<&[u8]>) -> Result<u16, ModError> {
    let mut buf = [0u8; 2];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| ModError::UnexpectedEof)?;
    Ok(u16::from_be_bytes(buf))
}

/// Read a fixed number of bytes
pub(crate) fn read_bytes<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N], ModError> {
    let mut buf = [0u8; N];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| ModError::UnexpectedEof)?;
    Ok(buf)
}

/// Read a null-terminated or fixed-length string
pub(crate) fn read_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len])
        .trim_end()
        .to_string()
}
