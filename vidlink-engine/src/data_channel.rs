//! The data-channel receive pipeline.
//!
//! Decodes each frame, reassembles pictures and keeps the most recent
//! parameter sets so a video decoder can be (re)configured when they change.

use tracing::{instrument, trace};
use vidlink_config::DecoderConfig;
use vidlink_protocol::{
    extract_parameter_sets, Channel, DataPacket, DecodeError, ExtractionError, ParameterSets,
    SliceType,
};
use vidlink_telemetry::{DecodeLogger, DecodeMetrics};

use crate::assembler::{AssembledFrame, Discard, FrameAssembler};
use crate::decoder::ChannelDecoder;

/// What a single data frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingest {
    pub sequence: u8,
    pub slice_type: SliceType,
    /// Set when this frame carried parameter sets that differ from the last ones seen.
    pub parameter_sets: Option<ParameterSets>,
    /// Set when this frame completed a picture.
    pub frame: Option<AssembledFrame>,
    /// Set when this frame caused picture data to be dropped.
    pub discarded: Option<Discard>,
}

/// Per-connection state for the data channel.
#[derive(Debug)]
pub struct DataChannel {
    decoder: ChannelDecoder,
    assembler: FrameAssembler,
    extract_parameter_sets: bool,
    parameter_sets: Option<ParameterSets>,
}

impl DataChannel {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            decoder: ChannelDecoder::new(Channel::Data, config),
            assembler: FrameAssembler::new(config.max_frame_size),
            extract_parameter_sets: config.extract_parameter_sets,
            parameter_sets: None,
        }
    }

    pub fn with_metrics(mut self, metrics: DecodeMetrics) -> Self {
        self.decoder = self.decoder.with_metrics(metrics);
        self
    }

    /// The latest parameter sets seen on this channel.
    pub fn parameter_sets(&self) -> Option<&ParameterSets> {
        self.parameter_sets.as_ref()
    }

    /// Decodes one frame and advances the pipeline.
    ///
    /// A frame that fails to decode is dropped without touching the open picture.
    #[instrument(level = "trace", skip_all, fields(len = buffer.len()))]
    pub fn ingest(&mut self, buffer: &[u8]) -> Result<Ingest, DecodeError> {
        let packet = self.decoder.decode_data(buffer)?;
        let parameter_sets = self.update_parameter_sets(&packet);

        let assembly = self.assembler.push(&packet);
        if let Some(metrics) = self.decoder.metrics() {
            if let Some(frame) = &assembly.frame {
                metrics.record_frame(frame.data.len());
            }
            if let Some(discard) = &assembly.discarded {
                metrics.record_discarded(discard.reason());
            }
        }
        if let Some(frame) = &assembly.frame {
            DecodeLogger::log_frame(frame.last_sequence, frame.data.len());
        }

        Ok(Ingest {
            sequence: packet.sequence,
            slice_type: packet.slice_type(),
            parameter_sets,
            frame: assembly.frame,
            discarded: assembly.discarded,
        })
    }

    fn update_parameter_sets(&mut self, packet: &DataPacket) -> Option<ParameterSets> {
        if !self.extract_parameter_sets {
            return None;
        }
        // Corrupted payloads must never configure the decoder.
        if !self.decoder.verifies_checksum() && !packet.is_intact() {
            trace!(sequence = packet.sequence, "Skipping extraction on unverified packet");
            return None;
        }

        let extracted = extract_parameter_sets(&packet.nal_data);
        let sets = self.settle_extraction(packet.sequence, extracted)?;
        if self.parameter_sets.as_ref() == Some(&sets) {
            return None;
        }

        DecodeLogger::log_parameter_sets(&sets);
        if let Some(metrics) = self.decoder.metrics() {
            metrics.parameter_sets.inc();
        }
        self.parameter_sets = Some(sets.clone());
        Some(sets)
    }

    /// Absent parameter sets are routine; any other failure is logged and counted.
    fn settle_extraction(
        &self,
        sequence: u8,
        result: Result<ParameterSets, ExtractionError>,
    ) -> Option<ParameterSets> {
        match result {
            Ok(sets) => Some(sets),
            Err(ExtractionError::NotFound) => None,
            Err(failure) => {
                DecodeLogger::log_extraction_failure(sequence, &failure);
                if let Some(metrics) = self.decoder.metrics() {
                    metrics.record_extraction_failure(&failure);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use vidlink_protocol::xor_checksum;

    const SPS_PPS: &[u8] = &[
        0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E, //
        0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, //
        0x00, 0x00, 0x00, 0x01, 0x65, 0x88,
    ];

    fn frame(sequence: u8, slice: SliceType, nal: &[u8]) -> Vec<u8> {
        let length = (5 + nal.len()) as u16;
        let mut frame = length.to_be_bytes().to_vec();
        frame.extend_from_slice(&[sequence, 0x01, slice.code()]);
        frame.extend_from_slice(nal);
        frame.push(xor_checksum(&frame));
        frame
    }

    #[test]
    fn test_parameter_sets_reported_once() {
        let mut channel = DataChannel::new(&DecoderConfig::default());

        let first = channel.ingest(&frame(1, SliceType::None, SPS_PPS)).unwrap();
        let sets = first.parameter_sets.unwrap();
        assert_eq!(&sets.sps[..], &[0x42, 0xC0, 0x1E]);
        assert_eq!(&sets.pps[..], &[0xCE, 0x3C, 0x80]);
        assert_eq!(&first.frame.unwrap().data[..], SPS_PPS);

        let repeat = channel.ingest(&frame(2, SliceType::None, SPS_PPS)).unwrap();
        assert!(repeat.parameter_sets.is_none());
        assert_eq!(channel.parameter_sets(), Some(&sets));
    }

    #[test]
    fn test_fragments_through_pipeline() {
        let mut channel = DataChannel::new(&DecoderConfig::default());
        let a = channel.ingest(&frame(7, SliceType::First, &[0x01, 0x02])).unwrap();
        assert_eq!(a.slice_type, SliceType::First);
        assert!(a.frame.is_none());
        let b = channel.ingest(&frame(8, SliceType::Last, &[0x03])).unwrap();
        assert_eq!(&b.frame.unwrap().data[..], &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_bad_frame_leaves_picture_open() {
        let mut channel = DataChannel::new(&DecoderConfig::default());
        channel.ingest(&frame(1, SliceType::First, &[0xAA])).unwrap();

        let mut corrupt = frame(2, SliceType::Inter, &[0xBB]);
        corrupt[5] ^= 0xFF;
        assert!(matches!(
            channel.ingest(&corrupt),
            Err(DecodeError::ChecksumMismatch { .. })
        ));

        let done = channel.ingest(&frame(2, SliceType::Last, &[0xCC])).unwrap();
        assert_eq!(&done.frame.unwrap().data[..], &[0xAA, 0xCC]);
    }

    #[test]
    fn test_unverified_mode_skips_corrupt_parameter_sets() {
        let config = DecoderConfig {
            verify_checksum: false,
            ..DecoderConfig::default()
        };
        let mut channel = DataChannel::new(&config);
        let mut corrupt = frame(1, SliceType::None, SPS_PPS);
        corrupt[10] ^= 0x01;
        let ingest = channel.ingest(&corrupt).unwrap();
        assert!(ingest.parameter_sets.is_none());
        assert!(ingest.frame.is_some());
        assert!(channel.parameter_sets().is_none());
    }

    #[test]
    fn test_extraction_disabled() {
        let config = DecoderConfig {
            extract_parameter_sets: false,
            ..DecoderConfig::default()
        };
        let mut channel = DataChannel::new(&config);
        let ingest = channel.ingest(&frame(1, SliceType::None, SPS_PPS)).unwrap();
        assert!(ingest.parameter_sets.is_none());
    }

    #[test]
    fn test_metrics_follow_pipeline() {
        let metrics = DecodeMetrics::new().unwrap();
        let mut channel = DataChannel::new(&DecoderConfig::default()).with_metrics(metrics.clone());
        channel.ingest(&frame(1, SliceType::None, SPS_PPS)).unwrap();
        channel.ingest(&frame(9, SliceType::Last, &[0x00])).unwrap();

        assert_eq!(metrics.parameter_sets.get(), 1);
        assert_eq!(metrics.frames_assembled.get(), 1);
        assert_eq!(
            metrics
                .pictures_discarded
                .with_label_values(&["orphan_fragment"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .frames_dropped
                .with_label_values(&["orphan_fragment"])
                .get(),
            0
        );
    }

    #[traced_test]
    #[test]
    fn test_allocation_failure_is_reported() {
        let metrics = DecodeMetrics::new().unwrap();
        let channel = DataChannel::new(&DecoderConfig::default()).with_metrics(metrics.clone());

        let failed = channel.settle_extraction(
            4,
            Err(ExtractionError::ResourceExhausted { requested: 4096 }),
        );
        assert!(failed.is_none());
        assert!(logs_contain("Parameter-set extraction failed"));
        assert_eq!(
            metrics
                .extraction_failures
                .with_label_values(&["resource_exhausted"])
                .get(),
            1
        );
    }

    #[test]
    fn test_missing_parameter_sets_are_not_a_failure() {
        let metrics = DecodeMetrics::new().unwrap();
        let channel = DataChannel::new(&DecoderConfig::default()).with_metrics(metrics.clone());

        assert!(channel
            .settle_extraction(5, Err(ExtractionError::NotFound))
            .is_none());
        assert_eq!(
            metrics
                .extraction_failures
                .with_label_values(&["not_found"])
                .get(),
            0
        );
    }
}
