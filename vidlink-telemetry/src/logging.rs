//! ## vidlink-telemetry::logging
//! Structured logging with `tracing`.
//!
//! `RUST_LOG` takes precedence over the configured default level.

use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};
use vidlink_protocol::{Channel, DecodeError, ExtractionError, ParameterSets};

#[derive(Clone, Copy, Debug)]
pub struct DecodeLogger;

impl DecodeLogger {
    /// Installs the global subscriber. Later calls are no-ops.
    pub fn init(default_level: &str) {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Reports a frame that was rejected and dropped.
    pub fn log_drop(channel: Channel, sequence: Option<u8>, error: &DecodeError) {
        warn!(
            channel = %channel,
            sequence = ?sequence,
            reason = error.reason(),
            error = %error,
            "Dropped frame"
        );
    }

    /// Reports newly seen parameter sets.
    pub fn log_parameter_sets(sets: &ParameterSets) {
        info!(
            sps_len = sets.sps.len(),
            pps_len = sets.pps.len(),
            "Parameter sets updated"
        );
    }

    /// Reports an extraction that failed for a reason other than absent parameter sets.
    pub fn log_extraction_failure(sequence: u8, failure: &ExtractionError) {
        error!(
            sequence,
            reason = failure.reason(),
            error = %failure,
            "Parameter-set extraction failed"
        );
    }

    /// Reports a completed picture.
    pub fn log_frame(sequence: u8, len: usize) {
        debug!(sequence, len, "Frame assembled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_log_drop() {
        DecodeLogger::log_drop(
            Channel::Data,
            Some(7),
            &DecodeError::ChecksumMismatch {
                expected: 0x01,
                computed: 0x02,
            },
        );
        assert!(logs_contain("Dropped frame"));
        assert!(logs_contain("checksum_mismatch"));
    }

    #[traced_test]
    #[test]
    fn test_log_extraction_failure() {
        DecodeLogger::log_extraction_failure(
            3,
            &ExtractionError::ResourceExhausted { requested: 128 },
        );
        assert!(logs_contain("Parameter-set extraction failed"));
        assert!(logs_contain("resource_exhausted"));
    }
}
