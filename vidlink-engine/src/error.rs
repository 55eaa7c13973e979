//! Errors raised by the receive engine.

use thiserror::Error;
use vidlink_protocol::DecodeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Frame of {size} bytes exceeds the {limit}-byte limit")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Stream ended inside a frame ({remaining} bytes left over)")]
    TruncatedStream { remaining: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
