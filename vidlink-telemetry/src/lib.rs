//! # vidlink Telemetry
//!
//! Crate for logging and decode metrics.

pub mod logging;
pub mod metrics;

pub use logging::DecodeLogger;
pub use metrics::DecodeMetrics;
