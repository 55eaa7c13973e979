//! ## vidlink-protocol::length
//! Length-field decoding for the frame prefixes.

use crate::error::{require, DecodeError};

/// Reads the leading two bytes as a big-endian `u16`, independent of host byte order.
pub fn decode_length(buffer: &[u8]) -> Result<u16, DecodeError> {
    require(buffer, 2)?;
    Ok(u16::from_be_bytes([buffer[0], buffer[1]]))
}

/// Reads the single-byte length used by the raw-transfer channel.
pub fn decode_short_length(buffer: &[u8]) -> Result<u8, DecodeError> {
    buffer
        .first()
        .copied()
        .ok_or(DecodeError::InvalidInput {
            needed: 1,
            available: 0,
        })
}
