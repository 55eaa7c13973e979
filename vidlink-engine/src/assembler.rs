//! Reassembles pictures from slice fragments.
//!
//! A picture is either one `None` packet or a `First` packet followed by any
//! number of `Inter` packets and a closing `Last`, with consecutive sequence
//! numbers. Anything else abandons the partial picture.

use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::debug;
use vidlink_protocol::{DataPacket, SliceType};

/// A complete picture's NAL data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFrame {
    pub first_sequence: u8,
    pub last_sequence: u8,
    pub fragments: usize,
    pub data: Bytes,
}

/// Why a partial picture, or a fragment, was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// A fragment arrived out of order or after a lost packet.
    SequenceGap { expected: u8, received: u8 },
    /// An `Inter` or `Last` fragment arrived with no picture open.
    Orphan(SliceType),
    /// A new picture started before the open one was closed.
    Interrupted,
    /// The picture grew past the configured limit.
    Oversize { limit: usize },
}

impl Discard {
    pub fn reason(&self) -> &'static str {
        match self {
            Discard::SequenceGap { .. } => "sequence_gap",
            Discard::Orphan(_) => "orphan_fragment",
            Discard::Interrupted => "interrupted_frame",
            Discard::Oversize { .. } => "oversize_frame",
        }
    }
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discard::SequenceGap { expected, received } => {
                write!(f, "expected sequence {expected}, received {received}")
            }
            Discard::Orphan(slice) => write!(f, "{slice} fragment without an open picture"),
            Discard::Interrupted => f.write_str("picture interrupted by a new one"),
            Discard::Oversize { limit } => write!(f, "picture larger than {limit} bytes"),
        }
    }
}

/// Outcome of feeding one packet to the assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub frame: Option<AssembledFrame>,
    pub discarded: Option<Discard>,
}

#[derive(Debug)]
struct Partial {
    first_sequence: u8,
    last_sequence: u8,
    fragments: usize,
    data: BytesMut,
}

impl Partial {
    fn start(packet: &DataPacket) -> Self {
        Self {
            first_sequence: packet.sequence,
            last_sequence: packet.sequence,
            fragments: 1,
            data: BytesMut::from(&packet.nal_data[..]),
        }
    }

    fn finish(self) -> AssembledFrame {
        AssembledFrame {
            first_sequence: self.first_sequence,
            last_sequence: self.last_sequence,
            fragments: self.fragments,
            data: self.data.freeze(),
        }
    }
}

#[derive(Debug)]
pub struct FrameAssembler {
    max_frame_size: usize,
    partial: Option<Partial>,
}

impl FrameAssembler {
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            partial: None,
        }
    }

    /// Whether a picture is currently open.
    pub fn in_progress(&self) -> bool {
        self.partial.is_some()
    }

    /// Drops any open picture, e.g. after the connection was reset.
    pub fn reset(&mut self) {
        self.partial = None;
    }

    pub fn push(&mut self, packet: &DataPacket) -> Assembly {
        let slice = packet.slice_type();
        let mut assembly = Assembly::default();

        if slice.starts_frame() && self.partial.take().is_some() {
            assembly.discarded = Some(Discard::Interrupted);
        }

        match slice {
            SliceType::None | SliceType::First => {
                if packet.nal_data.len() > self.max_frame_size {
                    assembly.discarded = Some(Discard::Oversize {
                        limit: self.max_frame_size,
                    });
                } else if slice == SliceType::None {
                    assembly.frame = Some(Partial::start(packet).finish());
                } else {
                    self.partial = Some(Partial::start(packet));
                }
            }
            SliceType::Inter | SliceType::Last => match self.partial.take() {
                None => assembly.discarded = Some(Discard::Orphan(slice)),
                Some(partial) => {
                    let expected = partial.last_sequence.wrapping_add(1);
                    if packet.sequence != expected {
                        assembly.discarded = Some(Discard::SequenceGap {
                            expected,
                            received: packet.sequence,
                        });
                    } else if partial.data.len() + packet.nal_data.len() > self.max_frame_size {
                        assembly.discarded = Some(Discard::Oversize {
                            limit: self.max_frame_size,
                        });
                    } else {
                        let mut partial = partial;
                        partial.data.extend_from_slice(&packet.nal_data);
                        partial.last_sequence = packet.sequence;
                        partial.fragments += 1;
                        if slice == SliceType::Last {
                            assembly.frame = Some(partial.finish());
                        } else {
                            self.partial = Some(partial);
                        }
                    }
                }
            },
        }

        if let Some(discard) = &assembly.discarded {
            debug!(sequence = packet.sequence, reason = discard.reason(), %discard, "Discarded picture data");
        }
        assembly
    }
}
