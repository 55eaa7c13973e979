//! ## vidlink-protocol::error
//! Error types shared by every channel decoder.

use thiserror::Error;

use crate::channel::Channel;

/// Errors raised while decoding a frame.
///
/// None of these are fatal to the receiver: the offending frame is dropped and
/// the next one is decoded independently.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ends before a fixed-position field.
    #[error("Insufficient data: need {needed} bytes, got {available}")]
    InvalidInput { needed: usize, available: usize },

    /// The declared length disagrees with the header layout or the bytes received.
    #[error("Invalid declared length {declared} for a {available}-byte buffer")]
    InvalidLength { declared: usize, available: usize },

    /// The package type is not accepted on this channel.
    #[error("Unsupported package type 0x{package_type:02x} on the {channel} channel")]
    UnsupportedType { channel: Channel, package_type: u8 },

    /// The trailing XOR byte does not match the frame contents.
    #[error("Checksum mismatch: trailer 0x{expected:02x}, computed 0x{computed:02x}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    /// A payload buffer could not be allocated.
    #[error("Unable to allocate {requested} bytes for the packet payload")]
    ResourceExhausted { requested: usize },
}

impl DecodeError {
    /// Short, stable label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::InvalidInput { .. } => "invalid_input",
            DecodeError::InvalidLength { .. } => "invalid_length",
            DecodeError::UnsupportedType { .. } => "unsupported_type",
            DecodeError::ChecksumMismatch { .. } => "checksum_mismatch",
            DecodeError::ResourceExhausted { .. } => "resource_exhausted",
        }
    }
}

/// Errors raised by the parameter-set extractor.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// No complete SPS followed by a PPS was found.
    #[error("No SPS/PPS pair found in NAL data")]
    NotFound,

    /// A parameter-set buffer could not be allocated.
    #[error("Unable to allocate {requested} bytes for a parameter set")]
    ResourceExhausted { requested: usize },
}

impl ExtractionError {
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::NotFound => "not_found",
            ExtractionError::ResourceExhausted { .. } => "resource_exhausted",
        }
    }
}

/// Ensures `buffer` holds at least `needed` bytes.
pub(crate) fn require(buffer: &[u8], needed: usize) -> Result<(), DecodeError> {
    if buffer.len() < needed {
        return Err(DecodeError::InvalidInput {
            needed,
            available: buffer.len(),
        });
    }
    Ok(())
}
