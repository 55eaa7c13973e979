//! ## vidlink-protocol::checksum
//! XOR parity trailer used by the data, control and management channels.
//!
//! The check is deliberately weak: flipping the same bit in two bytes, or
//! swapping two bytes, leaves the running XOR unchanged. Peers compute the
//! trailer the same way, so this is the wire format and must stay as is.

use crate::error::{require, DecodeError};

/// XOR of every byte in `bytes`.
#[inline]
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Checks that `buffer[payload_size]` equals the XOR of `buffer[..payload_size]`.
pub fn verify(buffer: &[u8], payload_size: usize) -> Result<(), DecodeError> {
    require(buffer, payload_size.saturating_add(1))?;
    let computed = xor_checksum(&buffer[..payload_size]);
    let expected = buffer[payload_size];
    if computed != expected {
        return Err(DecodeError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}
