//! ## vidlink-protocol::command
//! Control and management packets.
//!
//! Both channels share the data channel's prefix and trailer. Byte 4 packs a
//! 6-bit command in its low bits and a 2-bit acknowledgement in its high bits;
//! the rest up to `length` is an opaque argument (an object id for control,
//! parameters for management). What a command means is left to the dispatcher
//! that consumes these packets.

use bytes::Bytes;
use tracing::trace;

use crate::checksum::verify;
use crate::error::{require, DecodeError};
use crate::length::decode_length;
use crate::packet::owned_copy;

/// Bytes before the argument payload.
pub const COMMAND_HEADER_LEN: usize = 5;

const COMMAND_MASK: u8 = 0x3F;
const ACK_SHIFT: u8 = 6;

/// The packed command/acknowledgement byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandByte(pub u8);

impl CommandByte {
    /// The 6-bit command code.
    #[inline]
    pub fn command(self) -> u8 {
        self.0 & COMMAND_MASK
    }

    /// The 2-bit acknowledgement flag.
    #[inline]
    pub fn ack(self) -> u8 {
        self.0 >> ACK_SHIFT
    }
}

/// A control-channel packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPacket {
    pub length: u16,
    pub sequence: u8,
    pub package_type: u8,
    pub command_byte: CommandByte,
    /// Object identifier the command applies to.
    pub oid: Bytes,
    pub checksum: u8,
}

impl ControlPacket {
    pub fn command(&self) -> u8 {
        self.command_byte.command()
    }

    pub fn ack(&self) -> u8 {
        self.command_byte.ack()
    }
}

/// A management-channel packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagePacket {
    pub length: u16,
    pub sequence: u8,
    pub package_type: u8,
    pub command_byte: CommandByte,
    /// Command parameters.
    pub param: Bytes,
    pub checksum: u8,
}

impl ManagePacket {
    pub fn command(&self) -> u8 {
        self.command_byte.command()
    }

    pub fn ack(&self) -> u8 {
        self.command_byte.ack()
    }
}

/// Fields shared by both command-carrying channels.
struct CommandFrame {
    length: u16,
    sequence: u8,
    package_type: u8,
    command_byte: CommandByte,
    payload: Bytes,
    checksum: u8,
}

fn parse_command_frame(buffer: &[u8]) -> Result<CommandFrame, DecodeError> {
    let length = decode_length(buffer)?;
    require(buffer, COMMAND_HEADER_LEN)?;

    let declared = length as usize;
    if declared < COMMAND_HEADER_LEN || buffer.len() <= declared {
        return Err(DecodeError::InvalidLength {
            declared,
            available: buffer.len(),
        });
    }

    Ok(CommandFrame {
        length,
        sequence: buffer[2],
        package_type: buffer[3],
        command_byte: CommandByte(buffer[4]),
        payload: owned_copy(&buffer[COMMAND_HEADER_LEN..declared])?,
        checksum: buffer[declared],
    })
}

/// Decodes a control-channel frame without checking its trailer.
pub fn parse_control_packet(buffer: &[u8]) -> Result<ControlPacket, DecodeError> {
    let frame = parse_command_frame(buffer)?;
    trace!(
        sequence = frame.sequence,
        command = frame.command_byte.command(),
        ack = frame.command_byte.ack(),
        "Decoded control packet"
    );
    Ok(ControlPacket {
        length: frame.length,
        sequence: frame.sequence,
        package_type: frame.package_type,
        command_byte: frame.command_byte,
        oid: frame.payload,
        checksum: frame.checksum,
    })
}

/// Decodes a management-channel frame without checking its trailer.
pub fn parse_manage_packet(buffer: &[u8]) -> Result<ManagePacket, DecodeError> {
    let frame = parse_command_frame(buffer)?;
    trace!(
        sequence = frame.sequence,
        command = frame.command_byte.command(),
        ack = frame.command_byte.ack(),
        "Decoded management packet"
    );
    Ok(ManagePacket {
        length: frame.length,
        sequence: frame.sequence,
        package_type: frame.package_type,
        command_byte: frame.command_byte,
        param: frame.payload,
        checksum: frame.checksum,
    })
}

/// Verifies the trailer, then decodes a control frame.
pub fn parse_verified_control_packet(buffer: &[u8]) -> Result<ControlPacket, DecodeError> {
    let packet = parse_control_packet(buffer)?;
    verify(buffer, packet.length as usize)?;
    Ok(packet)
}

/// Verifies the trailer, then decodes a management frame.
pub fn parse_verified_manage_packet(buffer: &[u8]) -> Result<ManagePacket, DecodeError> {
    let packet = parse_manage_packet(buffer)?;
    verify(buffer, packet.length as usize)?;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::xor_checksum;

    fn build_frame(package_type: u8, command_byte: u8, payload: &[u8]) -> Vec<u8> {
        let length = (COMMAND_HEADER_LEN + payload.len()) as u16;
        let mut frame = length.to_be_bytes().to_vec();
        frame.extend_from_slice(&[0x2A, package_type, command_byte]);
        frame.extend_from_slice(payload);
        frame.push(xor_checksum(&frame));
        frame
    }

    #[test]
    fn test_command_byte_split() {
        let byte = CommandByte(0b10_000101);
        assert_eq!(byte.command(), 0b000101);
        assert_eq!(byte.ack(), 0b10);
        assert_eq!(CommandByte(0xFF).command(), 0x3F);
        assert_eq!(CommandByte(0xFF).ack(), 0x03);
        assert_eq!(CommandByte(0x3F).ack(), 0);
    }

    #[test]
    fn test_control_packet() {
        let buffer = build_frame(0x02, 0x41, b"cam0");
        let packet = parse_verified_control_packet(&buffer).unwrap();
        assert_eq!(packet.sequence, 0x2A);
        assert_eq!(packet.package_type, 0x02);
        assert_eq!(packet.command(), 0x01);
        assert_eq!(packet.ack(), 0x01);
        assert_eq!(&packet.oid[..], b"cam0");
    }

    #[test]
    fn test_manage_packet_without_param() {
        let buffer = build_frame(0x03, 0x07, &[]);
        let packet = parse_verified_manage_packet(&buffer).unwrap();
        assert_eq!(packet.command(), 0x07);
        assert_eq!(packet.ack(), 0);
        assert!(packet.param.is_empty());
    }

    #[test]
    fn test_corrupted_control_packet() {
        let mut buffer = build_frame(0x02, 0x01, b"x");
        buffer[5] ^= 0x80;
        assert!(parse_control_packet(&buffer).is_ok());
        assert!(matches!(
            parse_verified_control_packet(&buffer),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(matches!(
            parse_manage_packet(&[0x00, 0x20, 0x00, 0x03, 0x01, 0x00]),
            Err(DecodeError::InvalidLength { declared: 32, .. })
        ));
        assert!(matches!(
            parse_control_packet(&[0x00, 0x02, 0x00, 0x03, 0x01, 0x00]),
            Err(DecodeError::InvalidLength { declared: 2, .. })
        ));
        assert!(matches!(
            parse_control_packet(&[0x00, 0x05, 0x00]),
            Err(DecodeError::InvalidInput { .. })
        ));
    }
}
