//! # Klocka Telemetry
//!
//! Logging setup and Prometheus metrics for virtual clocks.

pub mod logging;
pub mod metrics;

pub use logging::ClockLogger;
pub use metrics::MetricsRecorder;

pub use prometheus::Error as MetricsError;
