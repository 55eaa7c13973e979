//! ## vidlink-protocol::transfer
//! Raw addressed transfer packets.
//!
//! This channel uses a shorter frame: a one-byte length, then sequence,
//! source and destination addresses, the content up to `length`, and an
//! end-of-fragment flag at offset `length`. It has no checksum trailer.

use bytes::Bytes;
use tracing::trace;

use crate::error::{require, DecodeError};
use crate::length::decode_short_length;
use crate::packet::owned_copy;

/// Bytes before the content: length, sequence, source and destination.
pub const TRANSFER_HEADER_LEN: usize = 4;

/// A raw-transfer packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPacket {
    pub length: u8,
    pub sequence: u8,
    pub src_addr: u8,
    pub dest_addr: u8,
    pub content: Bytes,
    /// Non-zero on the last fragment of a transfer.
    pub end_flag: u8,
}

impl TransferPacket {
    pub fn is_last_fragment(&self) -> bool {
        self.end_flag != 0
    }

    pub fn frame_len(&self) -> usize {
        self.length as usize + 1
    }
}

/// Decodes a raw-transfer frame.
pub fn parse_transfer_packet(buffer: &[u8]) -> Result<TransferPacket, DecodeError> {
    let length = decode_short_length(buffer)?;
    require(buffer, TRANSFER_HEADER_LEN)?;

    let declared = length as usize;
    if declared < TRANSFER_HEADER_LEN || buffer.len() <= declared {
        return Err(DecodeError::InvalidLength {
            declared,
            available: buffer.len(),
        });
    }

    let packet = TransferPacket {
        length,
        sequence: buffer[1],
        src_addr: buffer[2],
        dest_addr: buffer[3],
        content: owned_copy(&buffer[TRANSFER_HEADER_LEN..declared])?,
        end_flag: buffer[declared],
    };
    trace!(
        sequence = packet.sequence,
        src = packet.src_addr,
        dest = packet.dest_addr,
        len = packet.content.len(),
        "Decoded transfer packet"
    );
    Ok(packet)
}
