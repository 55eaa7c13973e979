//! Per-channel decoding under the configured verification policy.

use tracing::instrument;
use vidlink_config::DecoderConfig;
use vidlink_protocol::{
    decode, decode_verified, parse_data_packet, parse_verified_data_packet, Channel, DataPacket,
    DecodeError, Packet,
};
use vidlink_telemetry::{DecodeLogger, DecodeMetrics};

/// Decodes the frames of one channel, logging and counting every outcome.
#[derive(Debug, Clone)]
pub struct ChannelDecoder {
    channel: Channel,
    verify_checksum: bool,
    metrics: Option<DecodeMetrics>,
}

impl ChannelDecoder {
    pub fn new(channel: Channel, config: &DecoderConfig) -> Self {
        Self {
            channel,
            verify_checksum: config.verify_checksum,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: DecodeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn verifies_checksum(&self) -> bool {
        self.verify_checksum
    }

    pub(crate) fn metrics(&self) -> Option<&DecodeMetrics> {
        self.metrics.as_ref()
    }

    /// Decodes one frame received on this channel.
    #[instrument(level = "trace", skip_all, fields(channel = %self.channel, len = buffer.len()))]
    pub fn decode(&self, buffer: &[u8]) -> Result<Packet, DecodeError> {
        let result = if self.verify_checksum {
            decode_verified(self.channel, buffer)
        } else {
            decode(self.channel, buffer)
        };
        self.observe(buffer, result)
    }

    /// Decodes a data-channel frame straight into a [`DataPacket`].
    pub fn decode_data(&self, buffer: &[u8]) -> Result<DataPacket, DecodeError> {
        let result = if self.verify_checksum {
            parse_verified_data_packet(buffer)
        } else {
            parse_data_packet(buffer)
        };
        self.observe(buffer, result)
    }

    fn observe<T>(&self, buffer: &[u8], result: Result<T, DecodeError>) -> Result<T, DecodeError> {
        match &result {
            Ok(_) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_decoded(self.channel);
                }
            }
            Err(error) => {
                DecodeLogger::log_drop(self.channel, self.sequence_hint(buffer), error);
                if let Some(metrics) = &self.metrics {
                    metrics.record_dropped(error);
                }
            }
        }
        result
    }

    /// Sequence byte of a frame that failed to decode, if the buffer reaches it.
    fn sequence_hint(&self, buffer: &[u8]) -> Option<u8> {
        let offset = match self.channel {
            Channel::Transfer => 1,
            Channel::Data | Channel::Control | Channel::Manage => 2,
        };
        buffer.get(offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const VALID: [u8; 6] = [0x00, 0x05, 0x04, 0x01, 0x03, 0x03];
    const CORRUPT: [u8; 6] = [0x00, 0x05, 0x04, 0x01, 0x03, 0x00];

    #[test]
    fn test_verification_policy() {
        let strict = ChannelDecoder::new(Channel::Data, &DecoderConfig::default());
        assert!(strict.decode(&VALID).is_ok());
        assert!(matches!(
            strict.decode(&CORRUPT),
            Err(DecodeError::ChecksumMismatch { .. })
        ));

        let lenient = ChannelDecoder::new(
            Channel::Data,
            &DecoderConfig {
                verify_checksum: false,
                ..DecoderConfig::default()
            },
        );
        assert!(!lenient.verifies_checksum());
        let packet = lenient.decode_data(&CORRUPT).unwrap();
        assert!(!packet.is_intact());
    }

    #[traced_test]
    #[test]
    fn test_drops_are_logged_and_counted() {
        let metrics = DecodeMetrics::new().unwrap();
        let decoder = ChannelDecoder::new(Channel::Data, &DecoderConfig::default())
            .with_metrics(metrics.clone());

        assert!(decoder.decode(&VALID).is_ok());
        assert!(decoder.decode(&[0x00, 0x05, 0x04, 0x07, 0x03, 0x00]).is_err());

        assert!(logs_contain("Dropped frame"));
        assert!(logs_contain("unsupported_type"));
        assert_eq!(metrics.frames_decoded.with_label_values(&["data"]).get(), 1);
        assert_eq!(
            metrics
                .frames_dropped
                .with_label_values(&["unsupported_type"])
                .get(),
            1
        );
    }

    #[test]
    fn test_control_channel() {
        let decoder = ChannelDecoder::new(Channel::Control, &DecoderConfig::default());
        let frame = [0x00, 0x06, 0x01, 0x02, 0x45, 0x09, 0x00 ^ 0x06 ^ 0x01 ^ 0x02 ^ 0x45 ^ 0x09];
        match decoder.decode(&frame).unwrap() {
            Packet::Control(packet) => {
                assert_eq!(packet.command(), 0x05);
                assert_eq!(packet.ack(), 0x01);
                assert_eq!(&packet.oid[..], &[0x09]);
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }
}
