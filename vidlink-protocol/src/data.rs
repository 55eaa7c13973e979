//! ## vidlink-protocol::data
//! Data-channel packets carrying H.264 elementary-stream fragments.
//!
//! Layout (offsets from the frame start):
//!
//! | Offset      | Field          |
//! |-------------|----------------|
//! | 0..2        | length (BE)    |
//! | 2           | sequence       |
//! | 3           | package type   |
//! | 4           | slice ident    |
//! | 5..length   | NAL data       |
//! | length      | XOR checksum   |

use bytes::Bytes;
use tracing::{trace, warn};

use crate::channel::Channel;
use crate::checksum::{verify, xor_checksum};
use crate::error::{require, DecodeError};
use crate::length::decode_length;
use crate::packet::owned_copy;
use crate::slice::SliceType;

/// The only package type accepted on the data channel.
pub const DATA_PACKAGE_TYPE: u8 = 0x01;

/// Bytes before the NAL payload: length, sequence, type and slice ident.
pub const DATA_HEADER_LEN: usize = 5;

/// A decoded data-channel packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// Declared length; the checksum sits at this offset.
    pub length: u16,
    pub sequence: u8,
    pub package_type: u8,
    /// Bit-packed identifier; the low two bits are the slice type.
    pub slice_ident: u8,
    /// The H.264 bytes carried by this fragment.
    pub nal_data: Bytes,
    /// Trailing XOR byte as received.
    pub checksum: u8,
}

impl DataPacket {
    pub fn slice_type(&self) -> SliceType {
        SliceType::from_ident(self.slice_ident)
    }

    /// Total bytes the frame occupied on the wire, trailer included.
    pub fn frame_len(&self) -> usize {
        self.length as usize + 1
    }

    /// Recomputes the XOR over the decoded fields and compares it with the trailer.
    pub fn is_intact(&self) -> bool {
        let [hi, lo] = self.length.to_be_bytes();
        let header = xor_checksum(&[hi, lo, self.sequence, self.package_type, self.slice_ident]);
        header ^ xor_checksum(&self.nal_data) == self.checksum
    }
}

/// Decodes a data-channel frame without checking its trailer.
pub fn parse_data_packet(buffer: &[u8]) -> Result<DataPacket, DecodeError> {
    let length = decode_length(buffer)?;
    require(buffer, 4)?;
    let sequence = buffer[2];
    let package_type = buffer[3];

    if package_type != DATA_PACKAGE_TYPE {
        warn!(
            sequence,
            package_type, "Unknown package type on the data channel"
        );
        return Err(DecodeError::UnsupportedType {
            channel: Channel::Data,
            package_type,
        });
    }

    require(buffer, DATA_HEADER_LEN)?;
    let slice_ident = buffer[4];

    let declared = length as usize;
    if declared < DATA_HEADER_LEN || buffer.len() <= declared {
        return Err(DecodeError::InvalidLength {
            declared,
            available: buffer.len(),
        });
    }

    let nal_data = owned_copy(&buffer[DATA_HEADER_LEN..declared])?;
    let checksum = buffer[declared];

    trace!(
        sequence,
        slice_ident,
        nal_len = nal_data.len(),
        "Decoded data packet"
    );

    Ok(DataPacket {
        length,
        sequence,
        package_type,
        slice_ident,
        nal_data,
        checksum,
    })
}

/// Decodes a data-channel frame and rejects it unless the trailer matches.
///
/// Use this before handing `nal_data` to the parameter-set extractor.
pub fn parse_verified_data_packet(buffer: &[u8]) -> Result<DataPacket, DecodeError> {
    let packet = parse_data_packet(buffer)?;
    verify(buffer, packet.length as usize)?;
    Ok(packet)
}
