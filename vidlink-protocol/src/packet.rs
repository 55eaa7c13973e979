//! ## vidlink-protocol::packet
//! Channel-level dispatch over the four packet kinds.

use bytes::Bytes;

use crate::channel::Channel;
use crate::command::{
    parse_control_packet, parse_manage_packet, parse_verified_control_packet,
    parse_verified_manage_packet, ControlPacket, ManagePacket,
};
use crate::data::{parse_data_packet, parse_verified_data_packet, DataPacket};
use crate::error::DecodeError;
use crate::transfer::{parse_transfer_packet, TransferPacket};

/// Any decoded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Data(DataPacket),
    Control(ControlPacket),
    Manage(ManagePacket),
    Transfer(TransferPacket),
}

impl Packet {
    pub fn channel(&self) -> Channel {
        match self {
            Packet::Data(_) => Channel::Data,
            Packet::Control(_) => Channel::Control,
            Packet::Manage(_) => Channel::Manage,
            Packet::Transfer(_) => Channel::Transfer,
        }
    }

    pub fn sequence(&self) -> u8 {
        match self {
            Packet::Data(p) => p.sequence,
            Packet::Control(p) => p.sequence,
            Packet::Manage(p) => p.sequence,
            Packet::Transfer(p) => p.sequence,
        }
    }

    /// The opaque payload carried by the packet.
    pub fn payload(&self) -> &Bytes {
        match self {
            Packet::Data(p) => &p.nal_data,
            Packet::Control(p) => &p.oid,
            Packet::Manage(p) => &p.param,
            Packet::Transfer(p) => &p.content,
        }
    }

    /// Total bytes the frame occupied on the wire.
    pub fn frame_len(&self) -> usize {
        match self {
            Packet::Data(p) => p.frame_len(),
            Packet::Control(p) => p.length as usize + 1,
            Packet::Manage(p) => p.length as usize + 1,
            Packet::Transfer(p) => p.frame_len(),
        }
    }
}

/// Decodes a frame received on `channel` without checking its trailer.
pub fn decode(channel: Channel, buffer: &[u8]) -> Result<Packet, DecodeError> {
    match channel {
        Channel::Data => parse_data_packet(buffer).map(Packet::Data),
        Channel::Control => parse_control_packet(buffer).map(Packet::Control),
        Channel::Manage => parse_manage_packet(buffer).map(Packet::Manage),
        Channel::Transfer => parse_transfer_packet(buffer).map(Packet::Transfer),
    }
}

/// Decodes a frame received on `channel` and checks its XOR trailer.
///
/// Raw-transfer frames carry no trailer and decode as with [`decode`].
pub fn decode_verified(channel: Channel, buffer: &[u8]) -> Result<Packet, DecodeError> {
    match channel {
        Channel::Data => parse_verified_data_packet(buffer).map(Packet::Data),
        Channel::Control => parse_verified_control_packet(buffer).map(Packet::Control),
        Channel::Manage => parse_verified_manage_packet(buffer).map(Packet::Manage),
        Channel::Transfer => parse_transfer_packet(buffer).map(Packet::Transfer),
    }
}

/// Copies `src` into a freshly allocated buffer, reporting allocation failure
/// instead of aborting.
pub(crate) fn owned_copy(src: &[u8]) -> Result<Bytes, DecodeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| DecodeError::ResourceExhausted {
            requested: src.len(),
        })?;
    buf.extend_from_slice(src);
    Ok(Bytes::from(buf))
}
