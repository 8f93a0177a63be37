//! Helper functions for reading binary data

use std::io::{Cursor, Read};

use crate::error::S3mError;

/// Read a single byte
pub(crate) fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, S3mError> {
    let mut buf = [0u8; 1];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| S3mError::UnexpectedEof)?;
    Ok(buf[0])
}

/// Read a 16-bit little-endian integer
pub(crate) fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, S3mError> {
    let mut buf = [0u8; 2];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| S3mError::UnexpectedEof)?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a 32-bit little-endian integer
pub(crate) fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, S3mError> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| S3mError::UnexpectedEof)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a fixed number of bytes
pub(crate) fn read_bytes<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N], S3mError> {
    let mut buf = [0u8; N];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| S3mError::UnexpectedEof)?;
    Ok(buf)
}

/// Skip `count` bytes, failing if that runs past the end
pub(crate) fn skip(cursor: &mut Cursor<&[u8]>, count: u64) -> Result<(), S3mError> {
    let target = cursor.position() + count;
    if target > cursor.get_ref().len() as u64 {
        return Err(S3mError::UnexpectedEof);
    }
    cursor.set_position(target);
    Ok(())
}

/// Read a null-terminated or fixed-length string
pub(crate) fn read_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len])
        .trim_end()
        .to_string()
}
