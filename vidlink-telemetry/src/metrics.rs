//! ## vidlink-telemetry::metrics
//! **Prometheus counters for the receive path**

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use vidlink_protocol::{Channel, DecodeError, ExtractionError};

#[derive(Clone)]
pub struct DecodeMetrics {
    pub registry: Registry,
    pub frames_decoded: IntCounterVec,
    pub frames_dropped: IntCounterVec,
    pub pictures_discarded: IntCounterVec,
    pub extraction_failures: IntCounterVec,
    pub parameter_sets: IntCounter,
    pub frames_assembled: IntCounter,
    pub frame_size: Histogram,
}

impl std::fmt::Debug for DecodeMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeMetrics").finish_non_exhaustive()
    }
}

impl DecodeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let frames_decoded = IntCounterVec::new(
            Opts::new("vidlink_frames_decoded_total", "Frames decoded per channel"),
            &["channel"],
        )?;
        let frames_dropped = IntCounterVec::new(
            Opts::new("vidlink_frames_dropped_total", "Frames dropped by reason"),
            &["reason"],
        )?;
        let pictures_discarded = IntCounterVec::new(
            Opts::new(
                "vidlink_pictures_discarded_total",
                "Partial pictures abandoned by the assembler, by reason",
            ),
            &["reason"],
        )?;
        let extraction_failures = IntCounterVec::new(
            Opts::new(
                "vidlink_extraction_failures_total",
                "Parameter-set extractions that failed for a reason other than absence",
            ),
            &["reason"],
        )?;
        let parameter_sets = IntCounter::new(
            "vidlink_parameter_sets_total",
            "SPS/PPS pairs extracted from the data channel",
        )?;
        let frames_assembled = IntCounter::new(
            "vidlink_frames_assembled_total",
            "Pictures reassembled from slice fragments",
        )?;
        let frame_size = Histogram::with_opts(
            HistogramOpts::new("vidlink_frame_size_bytes", "Reassembled picture size")
                .buckets(vec![1_024.0, 8_192.0, 65_536.0, 262_144.0, 1_048_576.0]),
        )?;

        registry.register(Box::new(frames_decoded.clone()))?;
        registry.register(Box::new(frames_dropped.clone()))?;
        registry.register(Box::new(pictures_discarded.clone()))?;
        registry.register(Box::new(extraction_failures.clone()))?;
        registry.register(Box::new(parameter_sets.clone()))?;
        registry.register(Box::new(frames_assembled.clone()))?;
        registry.register(Box::new(frame_size.clone()))?;

        Ok(Self {
            registry,
            frames_decoded,
            frames_dropped,
            pictures_discarded,
            extraction_failures,
            parameter_sets,
            frames_assembled,
            frame_size,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_decoded(&self, channel: Channel) {
        self.frames_decoded
            .with_label_values(&[channel.name()])
            .inc();
    }

    pub fn record_dropped(&self, error: &DecodeError) {
        self.frames_dropped
            .with_label_values(&[error.reason()])
            .inc();
    }

    /// Records a dropped partial picture, labelled with why it was abandoned.
    pub fn record_discarded(&self, reason: &str) {
        self.pictures_discarded.with_label_values(&[reason]).inc();
    }

    pub fn record_extraction_failure(&self, error: &ExtractionError) {
        self.extraction_failures
            .with_label_values(&[error.reason()])
            .inc();
    }

    pub fn record_frame(&self, len: usize) {
        self.frames_assembled.inc();
        self.frame_size.observe(len as f64);
    }
}
