//! ## vidlink-protocol::framing
//! Cuts back-to-back frames out of a byte stream.
//!
//! Every frame declares where its trailer sits, so a frame is always
//! `length + 1` bytes long. Stream transports and capture files deliver frames
//! back to back and need this to find the boundaries.

use crate::channel::Channel;
use crate::command::COMMAND_HEADER_LEN;
use crate::data::DATA_HEADER_LEN;
use crate::error::DecodeError;
use crate::transfer::TRANSFER_HEADER_LEN;

/// Total size of the frame at the start of `buffer`.
///
/// Returns `Ok(None)` while the length prefix itself is incomplete. The
/// returned size may exceed `buffer.len()`; the caller then waits for more.
pub fn frame_len(channel: Channel, buffer: &[u8]) -> Result<Option<usize>, DecodeError> {
    let (declared, header_len) = match channel {
        Channel::Transfer => match buffer.first() {
            Some(&len) => (len as usize, TRANSFER_HEADER_LEN),
            None => return Ok(None),
        },
        Channel::Data | Channel::Control | Channel::Manage => match buffer {
            [hi, lo, ..] => {
                let header_len = if channel == Channel::Data {
                    DATA_HEADER_LEN
                } else {
                    COMMAND_HEADER_LEN
                };
                (u16::from_be_bytes([*hi, *lo]) as usize, header_len)
            }
            _ => return Ok(None),
        },
    };

    if declared < header_len {
        return Err(DecodeError::InvalidLength {
            declared,
            available: buffer.len(),
        });
    }
    Ok(Some(declared + 1))
}

/// Iterates over the complete frames of a buffer.
///
/// Iteration stops at the first incomplete frame, which stays available via
/// [`FrameSplitter::remainder`], or after yielding the first framing error.
#[derive(Debug, Clone)]
pub struct FrameSplitter<'a> {
    channel: Channel,
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> FrameSplitter<'a> {
    pub fn new(channel: Channel, buffer: &'a [u8]) -> Self {
        Self {
            channel,
            buffer,
            offset: 0,
            failed: false,
        }
    }

    /// Bytes not yet handed out as a frame.
    pub fn remainder(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }

    /// Offset of the next frame within the original buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for FrameSplitter<'a> {
    type Item = Result<&'a [u8], DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let rest = self.remainder();
        match frame_len(self.channel, rest) {
            Ok(Some(total)) if total <= rest.len() => {
                self.offset += total;
                Some(Ok(&rest[..total]))
            }
            Ok(_) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
