//! # vidlink-engine
//!
//! Receive-side plumbing around the protocol decoders: per-channel decoding
//! with the configured verification policy, picture reassembly from slice
//! fragments, parameter-set tracking and frame extraction from byte streams.

pub mod assembler;
pub mod data_channel;
pub mod decoder;
pub mod error;
pub mod reader;

pub use assembler::{AssembledFrame, Assembly, Discard, FrameAssembler};
pub use data_channel::{DataChannel, Ingest};
pub use decoder::ChannelDecoder;
pub use error::EngineError;
pub use reader::FrameReader;
