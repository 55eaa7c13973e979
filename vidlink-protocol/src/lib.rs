//! # vidlink Protocol Decoders
//!
//! Receive-side decoding for the four-channel video transfer protocol: frame
//! prefixes, the XOR trailer, typed packets per channel, slice classification
//! and SPS/PPS extraction from the data channel's H.264 payload.
//!
//! Every decoder is a pure function over a caller-supplied buffer and returns
//! an exclusively owned result, so decoders can run on any number of threads.

pub mod channel;
pub mod checksum;
pub mod command;
pub mod data;
pub mod error;
pub mod framing;
pub mod length;
pub mod packet;
pub mod parameter_sets;
pub mod slice;
pub mod transfer;

pub use channel::Channel;
pub use checksum::{verify, xor_checksum};
pub use command::{
    parse_control_packet, parse_manage_packet, parse_verified_control_packet,
    parse_verified_manage_packet, CommandByte, ControlPacket, ManagePacket,
};
pub use data::{parse_data_packet, parse_verified_data_packet, DataPacket};
pub use error::{DecodeError, ExtractionError};
pub use framing::{frame_len, FrameSplitter};
pub use length::{decode_length, decode_short_length};
pub use packet::{decode, decode_verified, Packet};
pub use parameter_sets::{extract_parameter_sets, ParameterSets};
pub use slice::{classify, SliceType};
pub use transfer::{parse_transfer_packet, TransferPacket};
