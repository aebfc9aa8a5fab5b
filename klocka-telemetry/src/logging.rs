//! ## klocka-telemetry::logging
//! **`tracing` subscriber setup**
//!
//! `RUST_LOG` always wins. Without it the configured level (or `info`)
//! applies to every target.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct ClockLogger;

impl ClockLogger {
    pub fn init() {
        Self::init_with_level("info")
    }

    /// Installs the global subscriber with `level` as the fallback filter.
    /// Does nothing if a subscriber is already installed.
    pub fn init_with_level(level: &str) {
        let installed = fmt()
            .with_env_filter(Self::filter(level))
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .try_init()
            .is_ok();
        if !installed {
            tracing::debug!("global subscriber already installed, keeping it");
        }
    }

    fn filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}
