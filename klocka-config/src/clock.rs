//! Mock clock construction parameters.

use chrono::{DateTime, Utc};
use klocka_core::MockClockBuilder;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// How a mock clock starts out.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ClockConfig {
    /// Initial virtual time (RFC 3339). Defaults to the real time at
    /// construction.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,

    /// Start frozen.
    #[serde(default)]
    pub frozen: bool,
}

impl ClockConfig {
    /// Builder primed with these settings; attach an observer before
    /// building if needed.
    pub fn builder(&self) -> MockClockBuilder {
        let builder = MockClockBuilder::default().frozen(self.frozen);
        match self.start {
            Some(start) => builder.start(start),
            None => builder,
        }
    }
}
